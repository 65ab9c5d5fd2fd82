//! [`Image`] and [`Video`] definitions of a [`Property`].

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use super::Property;
use super::Id as PropertyId;

/// Image attached to a [`Property`].
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// ID of this [`Image`].
    pub id: Id,

    /// ID of the [`Property`] this [`Image`] belongs to.
    pub property_id: PropertyId,

    /// [`Url`] this [`Image`] is served by.
    pub url: Url,

    /// [`DateTime`] when this [`Image`] was attached.
    pub created_at: ImageCreationDateTime,
}

/// Video attached to a [`Property`].
#[derive(Clone, Debug, PartialEq)]
pub struct Video {
    /// ID of this [`Video`].
    pub id: Id,

    /// ID of the [`Property`] this [`Video`] belongs to.
    pub property_id: PropertyId,

    /// [`Url`] this [`Video`] is served by.
    pub url: Url,

    /// [`Url`] of a thumbnail of this [`Video`], if any.
    pub thumbnail_url: Option<Url>,

    /// Duration of this [`Video`] in seconds.
    pub duration: f64,

    /// Size of this [`Video`] file in bytes.
    pub file_size: u64,

    /// Original [`FileName`] of this [`Video`].
    pub name: FileName,

    /// [`DateTime`] when this [`Video`] was attached.
    pub created_at: VideoCreationDateTime,
}

/// [`Image`] to be attached to a [`Property`].
#[derive(Clone, Debug)]
pub struct NewImage {
    /// [`Url`] the stored [`Image`] is served by.
    pub url: Url,
}

/// [`Video`] to be attached to a [`Property`].
#[derive(Clone, Debug)]
pub struct NewVideo {
    /// [`Url`] the stored [`Video`] is served by.
    pub url: Url,

    /// Size of the stored file in bytes.
    pub file_size: u64,

    /// Original [`FileName`] of the [`Video`].
    pub name: FileName,
}

/// ID of an [`Image`] or a [`Video`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

define_text! {
    #[doc = "URL an [`Image`] or a [`Video`] is served by."]
    Url(max = 2048)
}

define_text! {
    #[doc = "Original file name of an uploaded [`Video`]."]
    FileName(max = 255)
}

/// [`DateTime`] when an [`Image`] was attached.
pub type ImageCreationDateTime = DateTimeOf<(Image, unit::Creation)>;

/// [`DateTime`] when a [`Video`] was attached.
pub type VideoCreationDateTime = DateTimeOf<(Video, unit::Creation)>;
