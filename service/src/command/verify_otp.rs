//! [`Command`] for verifying an [`Otp`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        otp::{self, VerificationError},
        Otp,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for verifying the latest [`Otp`] issued for an
/// [`otp::Email`].
#[derive(Clone, Debug)]
pub struct VerifyOtp {
    /// [`otp::Email`] the [`Otp`] was issued for.
    pub email: otp::Email,

    /// [`otp::Code`] to verify.
    pub code: otp::Code,
}

impl<Db> Command<VerifyOtp> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Otp, otp::Email>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Otp>, otp::Email>>,
            Ok = Option<Otp>,
            Err = Traced<database::Error>,
        > + Database<Update<Otp>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VerifyOtp) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VerifyOtp { email, code } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent verification attempts bypassing the counter.
        tx.execute(Lock(By::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut otp = tx
            .execute(Select(By::<Option<Otp>, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotRequested(email))
            .map_err(tracerr::wrap!())?;

        let max_attempts = self.config().otp.max_attempts;
        let result = otp.verify(&code, DateTime::now().coerce(), max_attempts);
        if result != Err(VerificationError::TooManyAttempts) {
            tx.execute(Update(otp))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        result.map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`VerifyOtp`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No [`Otp`] has been issued for the [`otp::Email`].
    #[display("No `Otp` has been requested for `{_0}`")]
    #[from(ignore)]
    NotRequested(#[error(not(source))] otp::Email),

    /// [`Otp`] verification failed.
    #[display("`Otp` verification failed: {_0}")]
    Verification(VerificationError),
}
