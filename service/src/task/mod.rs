//! Background [`Task`]s definitions.

mod background;
pub mod clean_expired_otps;

pub use common::Handler as Task;

pub use self::{background::Background, clean_expired_otps::CleanExpiredOtps};
