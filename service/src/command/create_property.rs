//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        property::{self, media, Status},
        Agent, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Property`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`property::Details`] of a new [`Property`].
    pub details: property::Details,

    /// Initial [`Status`] of a new [`Property`].
    ///
    /// [`Status::Draft`] is used if [`None`].
    pub status: Option<Status>,

    /// [`media::NewImage`]s to attach to a new [`Property`].
    pub images: Vec<media::NewImage>,

    /// [`media::NewVideo`]s to attach to a new [`Property`].
    pub videos: Vec<media::NewVideo>,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<property::New>,
            Ok = Property,
            Err = Traced<database::Error>,
        > + Database<
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
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            details,
            status,
            images,
            videos,
        } = cmd;

        let status = status.unwrap_or(Status::Draft);
        if !status.is_initial() {
            return Err(tracerr::new!(E::InvalidInitialStatus(status)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(agent_id) = details.agent_id {
            tx.execute(Select(By::<Option<Agent>, _>::new(agent_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AgentNotExists(agent_id))
                .map_err(tracerr::wrap!())?;
        }

        let mut property = tx
            .execute(Insert(property::New {
                details,
                status,
                created_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        for image in images {
            property.images.push(
                tx.execute(Insert((property.id, image)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            );
        }
        for video in videos {
            property.videos.push(
                tx.execute(Insert((property.id, video)))
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

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Agent`] doesn't exist.
    #[display("`Agent(id: {_0})` does not exist")]
    #[from(ignore)]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// [`Property`] cannot be created with the provided [`Status`].
    #[display("`Property` cannot be created in `{_0}` status")]
    #[from(ignore)]
    InvalidInitialStatus(#[error(not(source))] Status),
}
