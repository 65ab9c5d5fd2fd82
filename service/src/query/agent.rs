//! [`Query`] collection related to a single [`Agent`].

use common::operations::By;

use crate::domain::{agent, Agent};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Agent`] by its [`agent::Id`].
pub type ById = DatabaseQuery<By<Option<Agent>, agent::Id>>;
