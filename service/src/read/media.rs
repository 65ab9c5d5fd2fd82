//! [`Image`] and [`Video`] read model definitions.
//!
//! [`Image`]: crate::domain::property::Image
//! [`Video`]: crate::domain::property::Video

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::property::media::Url;

/// Indicator whether a [`Url`] is still referenced by any stored media.
///
/// Files of unreferenced [`Url`]s may be removed from a media storage.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsReferenced(pub bool);

impl PartialEq<bool> for IsReferenced {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
