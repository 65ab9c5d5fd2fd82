//! [`Command`] for updating an existing [`Property`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        property::{self, media, Status, TransitionError},
        Agent, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Property`].
///
/// Provided media are appended to the already attached ones.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to update.
    pub id: property::Id,

    /// New [`property::Details`] of the [`Property`].
    pub details: property::Details,

    /// New [`Status`] of the [`Property`], if it should be changed.
    pub status: Option<Status>,

    /// [`media::NewImage`]s to attach to the [`Property`].
    pub images: Vec<media::NewImage>,

    /// [`media::NewVideo`]s to attach to the [`Property`].
    pub videos: Vec<media::NewVideo>,
}

impl<Db> Command<UpdateProperty> for Service<Db>
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
        + Database<
            Insert<(property::Id, media::NewImage)>,
            Ok = property::Image,
            Err = Traced<database::Error>,
        > + Database<
            Insert<(property::Id, media::NewVideo)>,
            Ok = property::Video,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            id,
            details,
            status,
            images,
            videos,
        } = cmd;

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

        if let Some(agent_id) = details.agent_id {
            if property.agent_id != Some(agent_id) {
                tx.execute(Select(By::<Option<Agent>, _>::new(agent_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::AgentNotExists(agent_id))
                    .map_err(tracerr::wrap!())?;
            }
        }

        if let Some(status) = status {
            property
                .transition(status)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }
        property.apply(details);
        property.updated_at = DateTime::now().coerce();

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        for image in images {
            property.images.push(
                tx.execute(Insert((id, image)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            );
        }
        for video in videos {
            property.videos.push(
                tx.execute(Insert((id, video)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            );
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
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

    /// [`Status`] cannot be changed as requested.
    #[display("{_0}")]
    Transition(TransitionError),
}
