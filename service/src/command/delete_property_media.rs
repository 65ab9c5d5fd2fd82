//! [`Command`] for deleting an [`Image`] or a [`Video`] of a [`Property`].
//!
//! [`Property`]: crate::domain::Property

use std::{any, marker::PhantomData};

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::property::{media, Image, Video},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting all the `M`edia served by the provided
/// [`media::Url`].
///
/// Returns the deleted `M`edia.
#[derive(Debug)]
pub struct DeletePropertyMedia<M> {
    /// [`media::Url`] of the `M`edia to delete.
    pub url: media::Url,

    /// Type of the `M`edia to delete.
    _media: PhantomData<M>,
}

impl<M> DeletePropertyMedia<M> {
    /// Creates a new [`DeletePropertyMedia`] [`Command`] for the provided
    /// [`media::Url`].
    #[must_use]
    pub const fn new(url: media::Url) -> Self {
        Self {
            url,
            _media: PhantomData,
        }
    }
}

impl<M> Clone for DeletePropertyMedia<M> {
    fn clone(&self) -> Self {
        Self::new(self.url.clone())
    }
}

/// [`Command`] for deleting an [`Image`] by its [`media::Url`].
pub type DeletePropertyImage = DeletePropertyMedia<Image>;

/// [`Command`] for deleting a [`Video`] by its [`media::Url`].
pub type DeletePropertyVideo = DeletePropertyMedia<Video>;

impl<Db, M> Command<DeletePropertyMedia<M>> for Service<Db>
where
    Db: Database<
        Delete<By<Vec<M>, media::Url>>,
        Ok = Vec<M>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<M>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeletePropertyMedia<M>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeletePropertyMedia { url, .. } = cmd;

        let deleted = self
            .database()
            .execute(Delete(By::new(url.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if deleted.is_empty() {
            return Err(tracerr::new!(E::MediaNotExists {
                kind: media_kind::<M>(),
                url,
            }));
        }

        Ok(deleted)
    }
}

/// Returns a human-readable name of the `M`edia type.
fn media_kind<M>() -> &'static str {
    let name = any::type_name::<M>();
    name.rsplit("::").next().unwrap_or(name)
}

/// Error of [`DeletePropertyMedia`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No media is served by the [`media::Url`].
    #[display("`{kind}(url: {url})` does not exist")]
    #[from(ignore)]
    MediaNotExists {
        /// Kind of the media.
        #[error(not(source))]
        kind: &'static str,

        /// [`media::Url`] of the media.
        #[error(not(source))]
        url: media::Url,
    },
}

#[cfg(test)]
mod spec {
    use crate::domain::property::{Image, Video};

    use super::media_kind;

    #[test]
    fn names_media_kind() {
        assert_eq!(media_kind::<Image>(), "Image");
        assert_eq!(media_kind::<Video>(), "Video");
    }
}
