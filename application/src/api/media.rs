//! Media upload and removal endpoints.

use axum::{
    extract::{multipart::Field, rejection::PathRejection, Multipart, Path},
    Json,
};
use common::wire::Envelope;
use serde::de::DeserializeOwned;
use service::{
    command::{
        delete_property_media, Command as _, DeletePropertyImage,
        DeletePropertyVideo,
    },
    domain::property::media,
    query, Query as _,
};

use crate::{
    api::{self, MediaError},
    storage::{MediaKind, StoreError, Stored, Upload},
    AsError, Context, Error,
};

/// Name of the multipart field carrying the JSON-encoded property data.
const DATA_FIELD: &str = "propertyData";

/// Name of the multipart fields carrying images.
const IMAGES_FIELD: &str = "images";

/// Name of the multipart fields carrying videos.
const VIDEOS_FIELD: &str = "videos";

/// Multipart property form.
#[derive(Debug)]
pub(crate) struct Form<T> {
    /// Property data.
    pub(crate) data: T,

    /// Uploaded images.
    pub(crate) images: Vec<Upload>,

    /// Uploaded videos.
    pub(crate) videos: Vec<Upload>,
}

impl<T: DeserializeOwned> Form<T> {
    /// Reads a [`Form`] out of the provided [`Multipart`] request body.
    ///
    /// # Errors
    ///
    /// If the body is malformed or misses the property data.
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut data = None;
        let (mut images, mut videos) = (vec![], vec![]);

        while let Some(field) =
            multipart.next_field().await.map_err(AsError::into_error)?
        {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                DATA_FIELD => {
                    let text =
                        field.text().await.map_err(AsError::into_error)?;
                    data = Some(serde_json::from_str(&text).map_err(|e| {
                        Error::invalid_field(DATA_FIELD, &e)
                    })?);
                }
                IMAGES_FIELD => images.push(upload(field).await?),
                VIDEOS_FIELD => videos.push(upload(field).await?),
                _ => {}
            }
        }

        let data = data.ok_or_else(|| {
            Error::invalid_field(DATA_FIELD, &"Property data is required")
        })?;
        Ok(Self {
            data,
            images,
            videos,
        })
    }
}

/// Reads the provided [`Field`] as an [`Upload`].
async fn upload(field: Field<'_>) -> Result<Upload, Error> {
    let file_name = field.file_name().map(ToOwned::to_owned);
    let content_type = field.content_type().map(ToOwned::to_owned);
    let bytes = field.bytes().await.map_err(AsError::into_error)?;
    Ok(Upload {
        file_name,
        content_type,
        bytes,
    })
}

/// Reads all the files of the provided multipart `field` name.
async fn files(
    mut multipart: Multipart,
    field: &str,
) -> Result<Vec<Upload>, Error> {
    let mut files = vec![];
    while let Some(f) =
        multipart.next_field().await.map_err(AsError::into_error)?
    {
        if f.name() == Some(field) {
            files.push(upload(f).await?);
        }
    }
    if files.is_empty() {
        return Err(Error::invalid_field(field, &"No files uploaded"));
    }
    Ok(files)
}

/// Puts all the provided [`Upload`]s into the [`Storage`].
///
/// Nothing is stored unless every [`Upload`] is acceptable.
///
/// [`Storage`]: crate::Storage
pub(crate) async fn store(
    ctx: &Context,
    kind: MediaKind,
    uploads: &[Upload],
) -> Result<Vec<Stored>, Error> {
    for u in uploads {
        ctx.storage()
            .check(kind, u)
            .map_err(AsError::into_error)?;
    }
    let mut stored = Vec::with_capacity(uploads.len());
    for u in uploads {
        stored.push(
            ctx.storage()
                .store(kind, u)
                .await
                .map_err(AsError::into_error)?,
        );
    }
    Ok(stored)
}

/// Converts the provided [`Stored`] images into [`media::NewImage`]s.
pub(crate) fn new_images(stored: &[Stored]) -> Vec<media::NewImage> {
    stored
        .iter()
        .filter_map(|s| media::Url::new(s.url.clone()))
        .map(|url| media::NewImage { url })
        .collect()
}

/// Converts the provided [`Stored`] videos into [`media::NewVideo`]s.
pub(crate) fn new_videos(stored: &[Stored]) -> Vec<media::NewVideo> {
    stored
        .iter()
        .filter_map(|s| {
            Some(media::NewVideo {
                url: media::Url::new(s.url.clone())?,
                file_size: s.size,
                name: media::FileName::new(s.name.trim().to_owned())
                    .or_else(|| media::FileName::new("video"))?,
            })
        })
        .collect()
}

/// Removes the files of the provided `urls`, which aren't referenced by any
/// media anymore.
///
/// Failures are logged and don't interrupt the removal.
pub(crate) async fn cleanup(
    ctx: &Context,
    urls: impl IntoIterator<Item = String>,
) {
    for url in urls {
        let Some(media_url) = media::Url::new(url.clone()) else {
            continue;
        };
        match ctx
            .service()
            .execute(query::media::IsReferenced::by(media_url))
            .await
        {
            Ok(referenced) if *referenced => {}
            Ok(_) => {
                if let Err(e) = ctx.storage().remove(&url).await {
                    tracing::warn!("failed to remove `{url}` file: {e}");
                }
            }
            Err(e) => {
                tracing::warn!("failed to check `{url}` references: {e}");
            }
        }
    }
}

/// Uploads images and returns their URLs.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - no images, or an image is too large or not an
///                        image at all.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "uploadImages",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn upload_images(
    ctx: Context,
    multipart: Multipart,
) -> Result<Json<Envelope>, Error> {
    let files = files(multipart, IMAGES_FIELD).await?;
    let stored = store(&ctx, MediaKind::Image, &files).await?;
    Ok(Json(urls(stored)))
}

/// Uploads videos and returns their URLs.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - no videos, or a video is too large or not a video
///                        at all.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "uploadVideos",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn upload_videos(
    ctx: Context,
    multipart: Multipart,
) -> Result<Json<Envelope>, Error> {
    let files = files(multipart, VIDEOS_FIELD).await?;
    let stored = store(&ctx, MediaKind::Video, &files).await?;
    Ok(Json(urls(stored)))
}

/// Creates an [`Envelope`] with the URLs of the provided [`Stored`] files.
fn urls(stored: Vec<Stored>) -> Envelope {
    Envelope {
        success: true,
        urls: Some(stored.into_iter().map(|s| s.url).collect()),
        ..Envelope::default()
    }
}

/// Deletes an image by its URL.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - no image is served by the URL.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "deleteImage",
        otel.name = api::SPAN_NAME,
        url = tracing::field::Empty,
    ),
)]
pub async fn delete_image(
    ctx: Context,
    url: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope>, Error> {
    let url = media_url(url)?;
    let deleted = ctx
        .service()
        .execute(DeletePropertyImage::new(url))
        .await
        .map_err(AsError::into_error)?;
    cleanup(&ctx, deleted.into_iter().map(|i| i.url.to_string())).await;

    Ok(Json(Envelope::ok("Image deleted")))
}

/// Deletes a video by its URL.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - no video is served by the URL.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "deleteVideo",
        otel.name = api::SPAN_NAME,
        url = tracing::field::Empty,
    ),
)]
pub async fn delete_video(
    ctx: Context,
    url: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope>, Error> {
    let url = media_url(url)?;
    let deleted = ctx
        .service()
        .execute(DeletePropertyVideo::new(url))
        .await
        .map_err(AsError::into_error)?;
    cleanup(&ctx, deleted.into_iter().map(|v| v.url.to_string())).await;

    Ok(Json(Envelope::ok("Video deleted")))
}

/// Extracts a [`media::Url`] out of the provided path.
fn media_url(
    path: Result<Path<String>, PathRejection>,
) -> Result<media::Url, Error> {
    let Path(url) = path.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("url", url.as_str());
    media::Url::new(url.trim().to_owned())
        .ok_or_else(|| MediaError::NotExists.into())
}

impl AsError for StoreError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::TooLarge { kind, .. }
            | Self::UnsupportedType { kind, .. } => {
                Some(Error::invalid_field(&format!("{kind}s"), &self))
            }
            Self::Io(_) => None,
        }
    }
}

impl AsError for delete_property_media::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MediaNotExists { .. } => Some(MediaError::NotExists.into()),
        }
    }
}
