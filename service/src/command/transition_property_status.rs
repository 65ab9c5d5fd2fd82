//! [`Command`] for changing a [`Status`] of a [`Property`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, RejectionReason, Status, TransitionError},
        Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for changing a [`Status`] of a [`Property`].
#[derive(Clone, Debug)]
pub struct TransitionPropertyStatus {
    /// ID of the [`Property`] to change the [`Status`] of.
    pub id: property::Id,

    /// Requested [`Transition`].
    pub transition: Transition,
}

/// Requested change of a [`Property`] [`Status`].
#[derive(Clone, Debug)]
pub enum Transition {
    /// Approve the [`Property`] listing.
    Approve,

    /// Reject the [`Property`] listing for the provided [`RejectionReason`].
    Reject(RejectionReason),

    /// Set the provided [`Status`].
    Set(Status),
}

impl Transition {
    /// Returns the [`Status`] requested by this [`Transition`].
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Approve => Status::Approved,
            Self::Reject(_) => Status::Rejected,
            Self::Set(s) => *s,
        }
    }
}

impl<Db> Command<TransitionPropertyStatus> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TransitionPropertyStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TransitionPropertyStatus { id, transition } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Property`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;

        let changed = match transition {
            Transition::Approve => property.transition(Status::Approved),
            Transition::Reject(reason) => property.reject(reason),
            Transition::Set(status) => property.transition(status),
        };
        changed.map_err(tracerr::from_and_wrap!(=> E))?;
        property.updated_at = DateTime::now().coerce();

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`TransitionPropertyStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Status`] cannot be changed as requested.
    #[display("{_0}")]
    Transition(TransitionError),
}

#[cfg(test)]
mod spec {
    use common::Status;

    use crate::domain::property::RejectionReason;

    use super::Transition;

    #[test]
    fn requests_expected_status() {
        assert_eq!(Transition::Approve.status(), Status::Approved);
        assert_eq!(
            Transition::Reject(RejectionReason::new("Blurry photos").unwrap())
                .status(),
            Status::Rejected,
        );
        assert_eq!(Transition::Set(Status::Sold).status(), Status::Sold);
    }
}
