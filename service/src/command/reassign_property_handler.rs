//! [`Command`] for reassigning an [`Agent`] handling a [`Property`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, property, Agent, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reassigning an [`Agent`] handling a [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct ReassignPropertyHandler {
    /// ID of the [`Property`] to reassign.
    pub id: property::Id,

    /// ID of the new handling [`Agent`].
    ///
    /// [`None`] leaves the [`Property`] unassigned.
    pub agent_id: Option<agent::Id>,
}

impl<Db> Command<ReassignPropertyHandler> for Service<Db>
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
        > + Database<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReassignPropertyHandler,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReassignPropertyHandler { id, agent_id } = cmd;

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
        if property.agent_id == agent_id {
            return Ok(property);
        }

        if let Some(agent_id) = agent_id {
            tx.execute(Select(By::<Option<Agent>, _>::new(agent_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AgentNotExists(agent_id))
                .map_err(tracerr::wrap!())?;
        }

        property.agent_id = agent_id;
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

/// Error of [`ReassignPropertyHandler`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Agent`] doesn't exist.
    #[display("`Agent(id: {_0})` does not exist")]
    #[from(ignore)]
    AgentNotExists(#[error(not(source))] agent::Id),
}
