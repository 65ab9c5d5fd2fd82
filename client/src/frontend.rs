//! Typed frontend representation of property listings.

use common::{Area, Status};

/// Property listing as presented to a user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Property {
    /// ID assigned by the storage.
    pub id: i64,

    /// Human-readable number assigned by the storage.
    pub property_number: String,

    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Property type.
    pub kind: String,

    /// Listing [`Status`], if known.
    pub status: Option<Status>,

    /// Reason of the last rejection.
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

    /// Number of bathrooms.
    pub bathrooms: f64,

    /// Number of kitchens.
    pub kitchens: u16,

    /// Number of garages.
    pub garages: u16,

    /// Floor [`Area`] in the display unit.
    pub area: Area,

    /// Age of the property in years.
    pub property_age: u16,

    /// Floor number.
    pub floor_number: u16,

    /// Amenity labels, without duplicates.
    pub amenities: Vec<String>,

    /// ID of the agent handling the listing.
    pub agent_id: Option<i64>,

    /// ID of the property owner.
    pub owner_id: Option<i64>,

    /// [`Agent`] handling the listing.
    pub agent: Option<Agent>,

    /// [`Image`]s of the property.
    pub images: Vec<Image>,

    /// [`Video`]s of the property.
    pub videos: Vec<Video>,

    /// URLs of the [`Image`]s.
    pub image_urls: Vec<String>,

    /// URLs of the [`Video`]s.
    pub video_urls: Vec<String>,

    /// URL of the first [`Image`], or an empty string.
    pub main_image: String,

    /// URL of the first [`Video`], or an empty string.
    pub main_video: String,

    /// [RFC 3339] date and time the listing was created at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] date and time the listing was last modified at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub updated_at: String,
}

impl Property {
    /// Returns a label of the bedrooms count, like `2 bedrooms`.
    #[must_use]
    pub fn bedrooms_label(&self) -> String {
        match self.bedrooms {
            0 => "Studio".to_owned(),
            1 => "1 bedroom".to_owned(),
            n => format!("{n} bedrooms"),
        }
    }

    /// Returns a label of the bathrooms count, like `1.5 bathrooms`.
    #[expect(
        clippy::float_cmp,
        reason = "exactly one bathroom is spelled in singular"
    )]
    #[must_use]
    pub fn bathrooms_label(&self) -> String {
        if self.bathrooms == 1.0 {
            "1 bathroom".to_owned()
        } else {
            format!("{} bathrooms", self.bathrooms)
        }
    }

    /// Returns a label of the floor [`Area`], like `120 sqm`.
    #[must_use]
    pub fn area_label(&self) -> String {
        self.area.to_string()
    }

    /// Indicates whether this [`Property`] may transition into the provided
    /// [`Status`].
    #[must_use]
    pub fn can_transition(&self, to: Status) -> bool {
        self.status.is_some_and(|s| s.transition(to).is_ok())
    }
}

/// Agent handling property listings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Agent {
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

impl Agent {
    /// Creates a placeholder [`Agent`] standing for the one with the provided
    /// `id`, whose details are unknown.
    #[must_use]
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            first_name: "Unknown".to_owned(),
            last_name: "Agent".to_owned(),
            ..Self::default()
        }
    }

    /// Returns the full name of this [`Agent`].
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// Image of a property.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Image {
    /// ID of the image.
    pub id: i64,

    /// URL of the image.
    pub url: String,

    /// [RFC 3339] date and time the image was attached at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

/// Video of a property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Video {
    /// ID of the video.
    pub id: i64,

    /// URL of the video.
    pub url: String,

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

#[cfg(test)]
mod spec {
    use common::{Area, Status};
    use rust_decimal::Decimal;

    use super::{Agent, Property};

    #[test]
    fn labels() {
        let p = Property {
            bedrooms: 3,
            bathrooms: 1.5,
            area: Area::sqm(Decimal::new(1205, 1)),
            ..Property::default()
        };
        assert_eq!(p.bedrooms_label(), "3 bedrooms");
        assert_eq!(p.bathrooms_label(), "1.5 bathrooms");
        assert_eq!(p.area_label(), "120.5 sqm");

        let p = Property {
            bedrooms: 1,
            bathrooms: 1.0,
            ..Property::default()
        };
        assert_eq!(p.bedrooms_label(), "1 bedroom");
        assert_eq!(p.bathrooms_label(), "1 bathroom");
        assert_eq!(Property::default().bedrooms_label(), "Studio");
    }

    #[test]
    fn checks_transitions() {
        let p = Property {
            status: Some(Status::Pending),
            ..Property::default()
        };
        assert!(p.can_transition(Status::Approved));
        assert!(!p.can_transition(Status::Sold));
        assert!(!Property::default().can_transition(Status::Draft));
    }

    #[test]
    fn placeholder_agent() {
        let a = Agent::placeholder(7);
        assert_eq!(a.id, 7);
        assert_eq!(a.full_name(), "Unknown Agent");
    }
}
