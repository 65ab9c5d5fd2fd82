//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Database operations, service commands and queries, background tasks and
/// client transports are all expressed as [`Handler`]s of different
/// arguments.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
