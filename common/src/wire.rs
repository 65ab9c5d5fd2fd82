//! Wire representations exchanged over the REST API.
//!
//! All the records use `camelCase` field names. Timestamps travel as
//! [RFC 3339] strings and amenities as a JSON-encoded array of strings.
//!
//! [RFC 3339]: https://tools.ietf.org/html/rfc3339

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Status;

/// Response envelope of every REST API endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Envelope {
    /// Indicator whether the request succeeded.
    pub success: bool,

    /// Human-readable message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine-readable error code, if the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Single [`PropertyRecord`] the request resulted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyRecord>,

    /// List of [`PropertyRecord`]s the request resulted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyRecord>>,

    /// Single [`AgentRecord`] the request resulted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentRecord>,

    /// List of [`AgentRecord`]s the request resulted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentRecord>>,

    /// URLs of uploaded media files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,

    /// Expiration time of an issued one-time password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    /// Per-field error messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl Envelope {
    /// Creates a successful [`Envelope`] with the provided `message`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Creates a successful [`Envelope`] carrying a single `property`.
    #[must_use]
    pub fn property(property: PropertyRecord) -> Self {
        Self {
            success: true,
            property: Some(property),
            ..Self::default()
        }
    }

    /// Creates a successful [`Envelope`] carrying the provided `properties`.
    #[must_use]
    pub fn properties(properties: Vec<PropertyRecord>) -> Self {
        Self {
            success: true,
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// Creates a failed [`Envelope`].
    #[must_use]
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        errors: BTreeMap<String, String>,
    ) -> Self {
        Self {
            success: false,
            code: Some(code.into()),
            message: Some(message.into()),
            errors: (!errors.is_empty()).then_some(errors),
            ..Self::default()
        }
    }
}

/// Persisted property listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyRecord {
    /// ID assigned by the storage.
    pub id: i64,

    /// Human-readable number assigned by the storage.
    pub property_number: Option<String>,

    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Property type (open-ended, see the property-type taxonomy).
    #[serde(rename = "type")]
    pub kind: String,

    /// Listing [`Status`].
    pub status: Option<Status>,

    /// Reason of the last rejection, if the listing is rejected.
    pub rejection_reason: Option<String>,

    /// Asking price.
    pub price: f64,

    /// [RFC 3339] date and time the property was listed at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub listed_date: String,

    /// Street address.
    pub address: String,

    /// City or municipality.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Zip or postal code.
    pub zip_code: String,

    /// Country.
    pub country: String,

    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of bathrooms (half bathrooms allowed).
    pub bathrooms: f64,

    /// Number of kitchens.
    pub kitchens: u16,

    /// Number of garages.
    pub garages: u16,

    /// Floor area in square meters.
    pub area_sqm: f64,

    /// Age of the property in years.
    pub property_age: u16,

    /// Floor number.
    pub floor_number: u16,

    /// JSON-encoded array of amenity labels.
    pub amenities: String,

    /// ID of the agent handling the listing.
    pub agent_id: Option<i64>,

    /// ID of the property owner.
    pub owner_id: Option<i64>,

    /// Embedded agent handling the listing.
    pub agent: Option<AgentRecord>,

    /// Images of the property.
    pub property_images: Vec<ImageRecord>,

    /// Videos of the property.
    pub property_videos: Vec<VideoRecord>,

    /// [RFC 3339] date and time the listing was created at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] date and time the listing was last modified at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub updated_at: String,
}

/// Image of a property.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRecord {
    /// ID of the image.
    pub id: i64,

    /// ID of the owning property.
    pub property_id: i64,

    /// URL of the image.
    pub image_url: String,

    /// [RFC 3339] date and time the image was attached at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

/// Video of a property.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoRecord {
    /// ID of the video.
    pub id: i64,

    /// ID of the owning property.
    pub property_id: i64,

    /// URL of the video.
    pub video_url: String,

    /// URL of the video thumbnail, if any.
    pub thumbnail_url: Option<String>,

    /// Duration in seconds.
    pub duration: f64,

    /// Size of the video file in bytes.
    pub file_size: u64,

    /// Display name.
    pub name: String,

    /// [RFC 3339] date and time the video was attached at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

/// Agent handling property listings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentRecord {
    /// ID of the agent.
    pub id: i64,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// E-mail address.
    pub email: String,

    /// Phone number.
    pub phone: String,

    /// Real-estate license number.
    pub license_number: String,

    /// URL of the profile picture.
    pub profile_picture_url: String,
}

/// Request to create a new property listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRequest {
    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Property type.
    #[serde(rename = "type")]
    pub kind: String,

    /// Requested [`Status`]. Defaults to [`Status::Draft`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Asking price.
    pub price: f64,

    /// [RFC 3339] date and time the property is listed at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub listed_date: String,

    /// Street address.
    pub address: String,

    /// City or municipality.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Zip or postal code.
    pub zip_code: String,

    /// Country.
    pub country: String,

    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of bathrooms.
    pub bathrooms: f64,

    /// Number of kitchens.
    pub kitchens: u16,

    /// Number of garages.
    pub garages: u16,

    /// Floor area in square meters.
    pub area_sqm: f64,

    /// Age of the property in years.
    pub property_age: u16,

    /// Floor number.
    pub floor_number: u16,

    /// JSON-encoded array of amenity labels.
    pub amenities: String,

    /// ID of the agent handling the listing.
    pub agent_id: Option<i64>,

    /// ID of the property owner.
    pub owner_id: Option<i64>,
}

/// Request to update an existing property listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRequest {
    /// ID of the listing to update.
    pub id: i64,

    /// New values of the listing fields.
    #[serde(flatten)]
    pub fields: CreateRequest,
}

/// Body of a status change request.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct StatusPatch {
    /// Requested [`Status`].
    pub status: Status,
}

/// Body of a handler reassignment request.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandlerPatch {
    /// ID of the new agent, or `null` to unassign.
    pub agent_id: Option<i64>,
}

/// Body of a rejection request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RejectPatch {
    /// Reason of the rejection.
    pub reason: String,
}

/// Criteria of an advanced property search.
///
/// Absent criteria don't restrict the search.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Free-text term matched against title, description and location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,

    /// Required [`Status`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Required property type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Required city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Lowest acceptable price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,

    /// Highest acceptable price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,

    /// Lowest acceptable number of bedrooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u16>,

    /// Lowest acceptable number of bathrooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_bathrooms: Option<f64>,

    /// Required handling agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,

    /// Required owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
}

/// Request to issue a one-time password.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OtpRequest {
    /// E-mail address the password is issued for.
    pub email: String,
}

/// Request to verify a one-time password.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OtpVerification {
    /// E-mail address the password was issued for.
    pub email: String,

    /// Code of the password.
    pub code: String,
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::{CreateRequest, Envelope, UpdateRequest};
    use crate::Status;

    #[test]
    fn update_request_is_flat() {
        let req = UpdateRequest {
            id: 7,
            fields: CreateRequest {
                title: "Villa".into(),
                kind: "House".into(),
                status: Some(Status::Pending),
                ..CreateRequest::default()
            },
        };

        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["id"], json!(7));
        assert_eq!(json["title"], json!("Villa"));
        assert_eq!(json["type"], json!("House"));
        assert_eq!(json["status"], json!("pending"));
        assert_eq!(json["zipCode"], json!(""));
    }

    #[test]
    fn missing_fields_default() {
        let req: CreateRequest =
            serde_json::from_value(json!({"title": "Lot"})).unwrap();

        assert_eq!(req.title, "Lot");
        assert_eq!(req.status, None);
        assert_eq!(req.bedrooms, 0);
    }

    #[test]
    fn error_envelope_omits_empty_parts() {
        let json = serde_json::to_value(Envelope::error(
            "NOT_FOUND_ERROR",
            "missing",
            BTreeMap::new(),
        ))
        .unwrap();

        assert_eq!(
            json,
            json!({
                "success": false,
                "code": "NOT_FOUND_ERROR",
                "message": "missing",
            }),
        );
    }
}
