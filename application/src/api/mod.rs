//! REST API definitions.

pub mod agent;
pub mod media;
pub mod otp;
pub mod property;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::define_error;

/// Name of the [`tracing::Span`] for the REST API handlers.
const SPAN_NAME: &str = "REST handler";

/// Root path of the property listing resources.
pub const PROPERTIES: &str = "/CreationProperty";

/// Creates a new [`Router`] of the whole REST API.
///
/// Handlers expect the [`Service`] and the [`Storage`] to be provided as
/// request extensions.
///
/// [`Service`]: crate::Service
/// [`Storage`]: crate::Storage
#[must_use]
pub fn router() -> Router {
    let properties = Router::new()
        .route("/", get(property::list).post(property::create))
        .route("/with-media", post(property::create_with_media))
        .route("/pending", get(property::pending))
        .route("/status/:status", get(property::by_status))
        .route("/owner/:owner_id", get(property::by_owner))
        .route("/agent/:agent_id", get(property::by_agent))
        .route("/search", get(property::search))
        .route("/search/advanced", post(property::search_advanced))
        .route("/upload/images", post(media::upload_images))
        .route("/upload/videos", post(media::upload_videos))
        .route("/images/*url", delete(media::delete_image))
        .route("/videos/*url", delete(media::delete_video))
        .route(
            "/:id",
            get(property::get)
                .put(property::update)
                .delete(property::delete),
        )
        .route("/:id/with-media", put(property::update_with_media))
        .route("/:id/approve", patch(property::approve))
        .route("/:id/reject", patch(property::reject))
        .route("/:id/status", patch(property::set_status))
        .route("/:id/handler", patch(property::reassign));

    Router::new()
        .nest(PROPERTIES, properties)
        .route("/agents", get(agent::list))
        .route("/agents/:id", get(agent::get))
        .route("/otp/request", post(otp::request))
        .route("/otp/verify", post(otp::verify))
}

define_error! {
    enum PropertyError {
        #[code = "NOT_FOUND_ERROR"]
        #[status = NOT_FOUND]
        #[message = "Property does not exist"]
        NotExists,
    }
}

define_error! {
    enum AgentError {
        #[code = "NOT_FOUND_ERROR"]
        #[status = NOT_FOUND]
        #[message = "Agent does not exist"]
        NotExists,
    }
}

define_error! {
    enum MediaError {
        #[code = "NOT_FOUND_ERROR"]
        #[status = NOT_FOUND]
        #[message = "Media does not exist"]
        NotExists,
    }
}
