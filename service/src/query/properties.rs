//! [`Query`] collection related to the multiple [`Property`] listings.

use common::operations::By;

use crate::{domain::Property, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Property`] listings.
pub type List =
    DatabaseQuery<By<Vec<Property>, read::property::list::Selector>>;
