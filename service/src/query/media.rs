//! [`Query`] collection related to [`Image`]s and [`Video`]s.
//!
//! [`Image`]: crate::domain::property::Image
//! [`Video`]: crate::domain::property::Video

use common::operations::By;

use crate::{domain::property::media, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries whether a [`media::Url`] is still referenced by any stored media.
pub type IsReferenced =
    DatabaseQuery<By<read::media::IsReferenced, media::Url>>;
