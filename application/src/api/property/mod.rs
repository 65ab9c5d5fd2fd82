//! Property listing endpoints.

mod input;
pub(crate) mod output;

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query,
    },
    http::StatusCode,
    Json,
};
use common::wire::{self, Envelope};
use itertools::Itertools as _;
use serde::Deserialize;
use service::{
    command::{
        self, create_property, delete_property, reassign_property_handler,
        transition_property_status, update_property, Command as _,
        Transition,
    },
    domain::{agent, property, Property},
    query,
    read::property::list::{SearchTerm, Selector},
    Query as _,
};

use crate::{
    api::{
        self,
        media::{self, Form},
        AgentError, PropertyError,
    },
    storage::{MediaKind, Stored, Upload},
    AsError, Context, Error,
};

/// JSON request body.
type Body<T> = Result<Json<T>, JsonRejection>;

/// ID of a property in a request path.
type IdPath = Result<Path<i64>, PathRejection>;

/// Extracts a [`property::Id`] out of the provided path.
fn id(path: IdPath) -> Result<property::Id, Error> {
    let Path(id) = path.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("id", id);
    Ok(id.into())
}

/// Extracts the value of the provided JSON request [`Body`].
fn body<T>(body: Body<T>) -> Result<T, Error> {
    body.map(|Json(v)| v).map_err(AsError::into_error)
}

/// Converts the provided [`Property`] into a [`wire::PropertyRecord`] along
/// with its handling agent.
async fn record(
    ctx: &Context,
    property: Property,
) -> Result<wire::PropertyRecord, Error> {
    let agent = match property.agent_id {
        Some(id) => ctx
            .service()
            .execute(query::agent::ById::by(id))
            .await
            .map_err(AsError::into_error)?,
        None => None,
    };
    Ok(output::property(property, agent.as_ref()))
}

/// Converts the provided [`Property`] listings into [`wire::PropertyRecord`]s
/// along with their handling agents, fetched at once.
async fn records(
    ctx: &Context,
    properties: Vec<Property>,
) -> Result<Vec<wire::PropertyRecord>, Error> {
    let ids = properties
        .iter()
        .filter_map(|p| p.agent_id)
        .unique()
        .collect::<Vec<_>>();
    let agents = if ids.is_empty() {
        HashMap::new()
    } else {
        ctx.service()
            .execute(query::agents::ByIds::by(ids))
            .await
            .map_err(AsError::into_error)?
            .into_iter()
            .map(|a| (a.id, a))
            .collect::<HashMap<_, _>>()
    };

    Ok(properties
        .into_iter()
        .map(|p| {
            let agent = p.agent_id.and_then(|id| agents.get(&id));
            output::property(p, agent)
        })
        .collect())
}

/// Selects the [`Property`] listings with the provided [`Selector`].
async fn select(
    ctx: &Context,
    selector: Selector,
) -> Result<Json<Envelope>, Error> {
    let properties = ctx
        .service()
        .execute(query::properties::List::by(selector))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(Envelope::properties(records(ctx, properties).await?)))
}

/// Puts the uploaded images and videos of a property form into the
/// [`Storage`].
///
/// Nothing stays stored on failure.
///
/// [`Storage`]: crate::Storage
async fn store_form(
    ctx: &Context,
    images: &[Upload],
    videos: &[Upload],
) -> Result<(Vec<Stored>, Vec<Stored>), Error> {
    let images = media::store(ctx, MediaKind::Image, images).await?;
    match media::store(ctx, MediaKind::Video, videos).await {
        Ok(videos) => Ok((images, videos)),
        Err(e) => {
            media::cleanup(ctx, images.into_iter().map(|s| s.url)).await;
            Err(e)
        }
    }
}

/// Creates a new property listing.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the provided data is invalid, the agent doesn't
///                        exist, or the status is not an initial one.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "createProperty",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn create(
    ctx: Context,
    req: Body<wire::CreateRequest>,
) -> Result<(StatusCode, Json<Envelope>), Error> {
    let (details, status) = input::details(&body(req)?)?;

    let property = ctx
        .service()
        .execute(command::CreateProperty {
            details,
            status,
            images: vec![],
            videos: vec![],
        })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("created `Property(id: {})`", property.id);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::property(record(&ctx, property).await?)),
    ))
}

/// Creates a new property listing along with its images and videos.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the provided data or files are invalid, the agent
///                        doesn't exist, or the status is not an initial
///                        one.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "createPropertyWithMedia",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn create_with_media(
    ctx: Context,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope>), Error> {
    let Form {
        data,
        images,
        videos,
    } = Form::<wire::CreateRequest>::read(multipart).await?;
    let (details, status) = input::details(&data)?;
    let (images, videos) = store_form(&ctx, &images, &videos).await?;

    let res = ctx
        .service()
        .execute(command::CreateProperty {
            details,
            status,
            images: media::new_images(&images),
            videos: media::new_videos(&videos),
        })
        .await;
    let property = match res {
        Ok(p) => p,
        Err(e) => {
            let urls = images.into_iter().chain(videos).map(|s| s.url);
            media::cleanup(&ctx, urls).await;
            return Err(e.into_error());
        }
    };
    tracing::info!(
        "created `Property(id: {})` with {} images and {} videos",
        property.id,
        property.images.len(),
        property.videos.len(),
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::property(record(&ctx, property).await?)),
    ))
}

/// Returns all the property listings.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "properties",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn list(ctx: Context) -> Result<Json<Envelope>, Error> {
    select(&ctx, Selector::All).await
}

/// Returns the property listings awaiting an approval.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "pendingProperties",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn pending(ctx: Context) -> Result<Json<Envelope>, Error> {
    select(&ctx, Selector::Status(property::Status::Pending)).await
}

/// Returns the property listings in the provided status.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the status is unknown.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "propertiesByStatus",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn by_status(
    ctx: Context,
    status: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope>, Error> {
    let Path(status) = status.map_err(AsError::into_error)?;
    let status = status.parse::<property::Status>().map_err(|_| {
        Error::invalid_field("status", &format!("Unknown status `{status}`"))
    })?;
    select(&ctx, Selector::Status(status)).await
}

/// Returns the property listings of the provided owner.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "propertiesByOwner",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn by_owner(
    ctx: Context,
    owner_id: IdPath,
) -> Result<Json<Envelope>, Error> {
    let Path(owner_id) = owner_id.map_err(AsError::into_error)?;
    select(&ctx, Selector::Owner(owner_id.into())).await
}

/// Returns the property listings handled by the provided agent.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "propertiesByAgent",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn by_agent(
    ctx: Context,
    agent_id: IdPath,
) -> Result<Json<Envelope>, Error> {
    let Path(agent_id) = agent_id.map_err(AsError::into_error)?;
    select(&ctx, Selector::Agent(agent::Id::from(agent_id))).await
}

/// Query parameters of a property search.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free-text search term.
    pub term: String,
}

/// Returns the property listings fuzzy matching the provided term, or all the
/// listings if the term is blank.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "searchProperties",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn search(
    ctx: Context,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Envelope>, Error> {
    let Query(SearchQuery { term }) = query.map_err(AsError::into_error)?;
    let selector =
        SearchTerm::new(term).map_or(Selector::All, Selector::Search);
    select(&ctx, selector).await
}

/// Returns the property listings matching all the provided criteria.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the criteria are invalid.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "searchPropertiesAdvanced",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn search_advanced(
    ctx: Context,
    req: Body<wire::SearchCriteria>,
) -> Result<Json<Envelope>, Error> {
    let criteria = input::criteria(&body(req)?)?;
    select(&ctx, Selector::Criteria(criteria)).await
}

/// Returns the property listing with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - the property doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "property",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn get(ctx: Context, path: IdPath) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let property = ctx
        .service()
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(PropertyError::NotExists))?;
    Ok(Json(Envelope::property(record(&ctx, property).await?)))
}

/// Checks whether the ID of an update request matches the path one.
///
/// Absent (zero) request ID matches any path one.
fn check_update_id(req: i64, path: property::Id) -> Result<(), Error> {
    if req == 0 || req == i64::from(path) {
        Ok(())
    } else {
        Err(Error::invalid_field("id", &"ID does not match the path"))
    }
}

/// Updates the property listing with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the provided data is invalid, the agent doesn't
///                        exist, or `rejected` status is requested;
/// - `NOT_FOUND_ERROR` - the property doesn't exist;
/// - `CONFLICT_ERROR` - the requested status is not reachable.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "updateProperty",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn update(
    ctx: Context,
    path: IdPath,
    req: Body<wire::UpdateRequest>,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let wire::UpdateRequest { id: req_id, fields } = body(req)?;
    check_update_id(req_id, id)?;
    let (details, status) = input::details(&fields)?;

    let property = ctx
        .service()
        .execute(command::UpdateProperty {
            id,
            details,
            status,
            images: vec![],
            videos: vec![],
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Envelope::property(record(&ctx, property).await?)))
}

/// Updates the property listing with the provided ID, attaching new images
/// and videos to it.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the provided data or files are invalid, the agent
///                        doesn't exist, or `rejected` status is requested;
/// - `NOT_FOUND_ERROR` - the property doesn't exist;
/// - `CONFLICT_ERROR` - the requested status is not reachable.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "updatePropertyWithMedia",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn update_with_media(
    ctx: Context,
    path: IdPath,
    multipart: Multipart,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let Form {
        data: wire::UpdateRequest { id: req_id, fields },
        images,
        videos,
    } = Form::read(multipart).await?;
    check_update_id(req_id, id)?;
    let (details, status) = input::details(&fields)?;
    let (images, videos) = store_form(&ctx, &images, &videos).await?;

    let res = ctx
        .service()
        .execute(command::UpdateProperty {
            id,
            details,
            status,
            images: media::new_images(&images),
            videos: media::new_videos(&videos),
        })
        .await;
    let property = match res {
        Ok(p) => p,
        Err(e) => {
            let urls = images.into_iter().chain(videos).map(|s| s.url);
            media::cleanup(&ctx, urls).await;
            return Err(e.into_error());
        }
    };

    Ok(Json(Envelope::property(record(&ctx, property).await?)))
}

/// Deletes the property listing with the provided ID along with its images
/// and videos.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - the property doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "deleteProperty",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn delete(
    ctx: Context,
    path: IdPath,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let property = ctx
        .service()
        .execute(command::DeleteProperty { id })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("deleted `Property(id: {id})`");

    let urls = property
        .images
        .iter()
        .map(|i| i.url.to_string())
        .chain(property.videos.iter().map(|v| v.url.to_string()))
        .collect::<Vec<_>>();
    media::cleanup(&ctx, urls).await;

    Ok(Json(Envelope::ok("Property deleted")))
}

/// Changes the status of the property listing with the provided ID.
async fn transition(
    ctx: &Context,
    id: property::Id,
    transition: Transition,
) -> Result<Json<Envelope>, Error> {
    let property = ctx
        .service()
        .execute(command::TransitionPropertyStatus { id, transition })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!(
        "`Property(id: {id})` status changed to `{}`",
        property.status,
    );
    Ok(Json(Envelope::property(record(ctx, property).await?)))
}

/// Approves the property listing with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_FOUND_ERROR` - the property doesn't exist;
/// - `CONFLICT_ERROR` - the property is not pending.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "approveProperty",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn approve(
    ctx: Context,
    path: IdPath,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    transition(&ctx, id, Transition::Approve).await
}

/// Rejects the property listing with the provided ID for the provided
/// reason.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the reason is blank;
/// - `NOT_FOUND_ERROR` - the property doesn't exist;
/// - `CONFLICT_ERROR` - the property is not pending.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "rejectProperty",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn reject(
    ctx: Context,
    path: IdPath,
    req: Body<wire::RejectPatch>,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let reason = input::rejection_reason(&body(req)?)?;
    transition(&ctx, id, Transition::Reject(reason)).await
}

/// Sets the status of the property listing with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - `rejected` is requested, which needs a reason;
/// - `NOT_FOUND_ERROR` - the property doesn't exist;
/// - `CONFLICT_ERROR` - the status is not reachable from the current one.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "setPropertyStatus",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn set_status(
    ctx: Context,
    path: IdPath,
    req: Body<wire::StatusPatch>,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let wire::StatusPatch { status } = body(req)?;
    transition(&ctx, id, Transition::Set(status)).await
}

/// Reassigns the agent handling the property listing with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the agent doesn't exist;
/// - `NOT_FOUND_ERROR` - the property doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "reassignPropertyHandler",
        id = tracing::field::Empty,
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn reassign(
    ctx: Context,
    path: IdPath,
    req: Body<wire::HandlerPatch>,
) -> Result<Json<Envelope>, Error> {
    let id = id(path)?;
    let wire::HandlerPatch { agent_id } = body(req)?;

    let property = ctx
        .service()
        .execute(command::ReassignPropertyHandler {
            id,
            agent_id: agent_id.map(agent::Id::from),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Envelope::property(record(&ctx, property).await?)))
}

/// Creates an [`Error`] of a non-existent agent referenced by a request.
fn agent_not_exists() -> Error {
    Error::invalid_field("agentId", &AgentError::NotExists)
}

/// Creates an [`Error`] of an impossible listing status change.
fn transition_failed(e: property::TransitionError) -> Error {
    match e {
        property::TransitionError::Invalid(e) => Error::conflict(&e),
        property::TransitionError::ReasonRequired => Error::invalid_field(
            "reason",
            &"Rejecting a listing requires a reason, use the reject action",
        ),
    }
}

impl AsError for create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AgentNotExists(_) => Some(agent_not_exists()),
            Self::InvalidInitialStatus(s) => Some(Error::invalid_field(
                "status",
                &format!("Property cannot be created as `{s}`"),
            )),
        }
    }
}

impl AsError for update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::AgentNotExists(_) => Some(agent_not_exists()),
            Self::Transition(e) => Some(transition_failed(*e)),
        }
    }
}

impl AsError for transition_property_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::Transition(e) => Some(transition_failed(*e)),
        }
    }
}

impl AsError for reassign_property_handler::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
            Self::AgentNotExists(_) => Some(agent_not_exists()),
        }
    }
}

impl AsError for delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Status;
    use service::{
        command::{transition_property_status, update_property},
        domain::{
            agent,
            property::{self, InvalidTransition, TransitionError},
        },
    };

    use crate::AsError as _;

    use super::check_update_id;

    #[test]
    fn maps_command_errors() {
        let err = update_property::ExecutionError::Transition(
            TransitionError::Invalid(InvalidTransition {
                from: Status::Draft,
                to: Status::Sold,
            }),
        )
        .as_error();
        assert_eq!(err.code, "CONFLICT_ERROR");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        for err in [
            update_property::ExecutionError::Transition(
                TransitionError::ReasonRequired,
            )
            .as_error(),
            transition_property_status::ExecutionError::Transition(
                TransitionError::ReasonRequired,
            )
            .as_error(),
        ] {
            assert_eq!(err.code, "VALIDATION_ERROR");
            assert_eq!(
                err.status_code,
                http::StatusCode::UNPROCESSABLE_ENTITY,
            );
            assert!(err.errors.contains_key("reason"));
        }

        let err = update_property::ExecutionError::AgentNotExists(
            agent::Id::from(9),
        )
        .as_error();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.errors["agentId"], "Agent does not exist");

        let err = transition_property_status::ExecutionError::PropertyNotExists(
            property::Id::from(4),
        )
        .as_error();
        assert_eq!(err.code, "NOT_FOUND_ERROR");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn update_id_must_match_path() {
        let path = property::Id::from(5);

        assert!(check_update_id(0, path).is_ok());
        assert!(check_update_id(5, path).is_ok());
        assert_eq!(
            check_update_id(6, path).unwrap_err().errors["id"],
            "ID does not match the path",
        );
    }
}
