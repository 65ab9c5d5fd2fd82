//! Agent endpoints.

use axum::{
    extract::{rejection::PathRejection, Path},
    Json,
};
use common::wire::Envelope;
use service::{domain::agent, query, Query as _};

use crate::{
    api::{self, property::output, AgentError},
    AsError, Context, Error,
};

/// Returns all the agents ordered by their names.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "agents",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn list(ctx: Context) -> Result<Json<Envelope>, Error> {
    let agents = ctx
        .service()
        .execute(query::agents::List::all())
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Envelope {
        success: true,
        agents: Some(agents.iter().map(output::agent).collect()),
        ..Envelope::default()
    }))
}

/// Returns the agent with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - the agent doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "agent",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn get(
    ctx: Context,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope>, Error> {
    let Path(id) = path.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("id", id);

    let agent = ctx
        .service()
        .execute(query::agent::ById::by(agent::Id::from(id)))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(AgentError::NotExists))?;

    Ok(Json(Envelope {
        success: true,
        agent: Some(output::agent(&agent)),
        ..Envelope::default()
    }))
}
