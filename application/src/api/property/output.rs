//! Conversion of domain values into [`wire`] records.

use common::wire;
use rust_decimal::{prelude::ToPrimitive as _, Decimal};
use service::domain::{
    property::{Image, Video},
    Agent, Property,
};

/// Converts the provided [`Decimal`] into a floating point number.
fn float(d: impl Into<Decimal>) -> f64 {
    d.into().to_f64().unwrap_or_default()
}

/// Converts the provided [`Property`] into a [`wire::PropertyRecord`],
/// embedding its handling [`Agent`], if known.
pub(crate) fn property(
    p: Property,
    agent: Option<&Agent>,
) -> wire::PropertyRecord {
    let Property {
        id,
        number,
        title,
        description,
        kind,
        status,
        rejection_reason,
        price,
        listed_at,
        location,
        layout,
        amenities,
        agent_id,
        owner_id,
        images,
        videos,
        created_at,
        updated_at,
    } = p;

    wire::PropertyRecord {
        id: id.into(),
        property_number: Some(number.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        kind: kind.to_string(),
        status: Some(status),
        rejection_reason: rejection_reason.map(|r| r.to_string()),
        price: float(price),
        listed_date: listed_at.to_rfc3339(),
        address: location.address.to_string(),
        city: location.city.to_string(),
        state: location.state.to_string(),
        zip_code: location.zip_code.to_string(),
        country: location.country.to_string(),
        latitude: location.latitude.map(Into::into),
        longitude: location.longitude.map(Into::into),
        bedrooms: layout.bedrooms,
        bathrooms: float(layout.bathrooms),
        kitchens: layout.kitchens,
        garages: layout.garages,
        area_sqm: float(layout.area.in_sqm()),
        property_age: layout.age,
        floor_number: layout.floor,
        amenities: amenities.to_json(),
        agent_id: agent_id.map(Into::into),
        owner_id: owner_id.map(Into::into),
        agent: agent
            .filter(|a| Some(a.id) == agent_id)
            .map(self::agent),
        property_images: images.into_iter().map(image).collect(),
        property_videos: videos.into_iter().map(video).collect(),
        created_at: created_at.to_rfc3339(),
        updated_at: updated_at.to_rfc3339(),
    }
}

/// Converts the provided [`Image`] into a [`wire::ImageRecord`].
fn image(i: Image) -> wire::ImageRecord {
    wire::ImageRecord {
        id: i.id.into(),
        property_id: i.property_id.into(),
        image_url: i.url.to_string(),
        created_at: i.created_at.to_rfc3339(),
    }
}

/// Converts the provided [`Video`] into a [`wire::VideoRecord`].
fn video(v: Video) -> wire::VideoRecord {
    wire::VideoRecord {
        id: v.id.into(),
        property_id: v.property_id.into(),
        video_url: v.url.to_string(),
        thumbnail_url: v.thumbnail_url.map(|u| u.to_string()),
        duration: v.duration,
        file_size: v.file_size,
        name: v.name.to_string(),
        created_at: v.created_at.to_rfc3339(),
    }
}

/// Converts the provided [`Agent`] into a [`wire::AgentRecord`].
pub(crate) fn agent(a: &Agent) -> wire::AgentRecord {
    wire::AgentRecord {
        id: a.id.into(),
        first_name: a.first_name.to_string(),
        last_name: a.last_name.to_string(),
        email: a.email.as_ref().map(ToString::to_string).unwrap_or_default(),
        phone: a.phone.as_ref().map(ToString::to_string).unwrap_or_default(),
        license_number: a
            .license_number
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        profile_picture_url: a
            .profile_picture_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}
