//! [`Command`] for requesting a new [`Otp`].

use common::{operations::Insert, DateTime};
use tracerr::Traced;

use crate::{
    domain::{otp, Otp},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for issuing a new [`Otp`] for the provided [`otp::Email`].
///
/// Previously issued [`Otp`]s are superseded, because only the latest one is
/// ever verified.
#[derive(Clone, Debug)]
pub struct RequestOtp {
    /// [`otp::Email`] to issue a new [`Otp`] for.
    pub email: otp::Email,
}

impl<Db> Command<RequestOtp> for Service<Db>
where
    Db: Database<Insert<Otp>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Otp;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RequestOtp) -> Result<Self::Ok, Self::Err> {
        let RequestOtp { email } = cmd;

        let now = DateTime::now();
        let otp = Otp {
            id: otp::Id::new(),
            email,
            code: otp::Code::generate(),
            expires_at: (now + self.config().otp.ttl).coerce(),
            used: false,
            attempts: 0,
            created_at: now.coerce(),
        };

        self.database()
            .execute(Insert(otp.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(otp)
    }
}

/// Error of [`RequestOtp`] [`Command`] execution.
pub type ExecutionError = database::Error;
