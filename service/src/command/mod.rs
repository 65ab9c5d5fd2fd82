//! [`Command`] definition.

pub mod create_property;
pub mod delete_property;
pub mod delete_property_media;
pub mod reassign_property_handler;
pub mod request_otp;
pub mod transition_property_status;
pub mod update_property;
pub mod verify_otp;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_property::CreateProperty,
    delete_property::DeleteProperty,
    delete_property_media::{
        DeletePropertyImage, DeletePropertyMedia, DeletePropertyVideo,
    },
    reassign_property_handler::ReassignPropertyHandler,
    request_otp::RequestOtp,
    transition_property_status::{Transition, TransitionPropertyStatus},
    update_property::UpdateProperty,
    verify_otp::VerifyOtp,
};
