//! [`Agent`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Real estate agent handling [`Property`] listings.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// ID of this [`Agent`].
    pub id: Id,

    /// First [`Name`] of this [`Agent`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Agent`].
    pub last_name: Name,

    /// [`Email`] of this [`Agent`], if any.
    pub email: Option<Email>,

    /// [`Phone`] of this [`Agent`], if any.
    pub phone: Option<Phone>,

    /// [`LicenseNumber`] of this [`Agent`], if any.
    pub license_number: Option<LicenseNumber>,

    /// [`PictureUrl`] of this [`Agent`] profile, if any.
    pub profile_picture_url: Option<PictureUrl>,
}

impl Agent {
    /// Returns the full name of this [`Agent`].
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// ID of an [`Agent`].
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
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

define_text! {
    #[doc = "Name of an [`Agent`]."]
    Name(max = 128)
}

define_text! {
    #[doc = "Contact email of an [`Agent`]."]
    Email(max = 254)
}

define_text! {
    #[doc = "Contact phone of an [`Agent`]."]
    Phone(max = 32)
}

define_text! {
    #[doc = "Real estate license number of an [`Agent`]."]
    LicenseNumber(max = 64)
}

define_text! {
    #[doc = "URL of an [`Agent`] profile picture."]
    PictureUrl(max = 2048)
}
