//! [`Query`] collection related to the multiple [`Agent`]s.

use common::operations::By;

use crate::domain::{agent, Agent};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Agent`]s ordered by their names.
pub type List = DatabaseQuery<By<Vec<Agent>, ()>>;

/// Queries the [`Agent`]s with the provided [`agent::Id`]s.
///
/// Unknown [`agent::Id`]s are skipped.
pub type ByIds = DatabaseQuery<By<Vec<Agent>, Vec<agent::Id>>>;
