//! Conversion of [`wire`] requests into domain values.
//!
//! Every violation is accumulated, so a client receives all of them at once.

use std::{collections::BTreeMap, str::FromStr};

use common::{wire, Area, DateTime};
use rust_decimal::Decimal;
use service::{
    domain::{
        agent,
        property::{
            self, Amenities, Bathrooms, Latitude, Layout, Location,
            Longitude, Price,
        },
    },
    read::property::list,
};

use crate::Error;

/// Per-field violations of a request, keyed by the wire field name.
#[derive(Debug, Default)]
struct Violations(BTreeMap<String, String>);

impl Violations {
    /// Records the provided violation of the `field`.
    ///
    /// Only the first violation of a field is kept.
    fn add(&mut self, field: &str, msg: impl Into<String>) {
        _ = self.0.entry(field.to_owned()).or_insert_with(|| msg.into());
    }

    /// Records a violation of the `field` if the `value` is [`None`].
    fn check<T>(
        &mut self,
        field: &str,
        value: Option<T>,
        msg: &str,
    ) -> Option<T> {
        if value.is_none() {
            self.add(field, msg);
        }
        value
    }

    /// Parses a required text `field`.
    fn text<T: FromStr>(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
    ) -> Option<T> {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, format!("{label} is required"));
            return None;
        }
        let parsed = value.parse().ok();
        self.check(field, parsed, &format!("{label} is too long"))
    }

    /// Parses an optional text `field`, treating blank values as absent.
    ///
    /// Outer [`None`] means the value is invalid.
    fn optional_text<T: FromStr>(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
    ) -> Option<Option<T>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Some(None),
            Some(v) => self.text(field, label, v).map(Some),
        }
    }

    /// Converts an optional `value` of the `field` with the provided `f`.
    ///
    /// Outer [`None`] means the value is invalid.
    fn optional<V, T>(
        &mut self,
        field: &str,
        value: Option<V>,
        f: impl FnOnce(V) -> Option<T>,
        msg: &str,
    ) -> Option<Option<T>> {
        match value {
            None => Some(None),
            Some(v) => self.check(field, f(v), msg).map(Some),
        }
    }

    /// Finishes the validation.
    fn finish(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Converts these [`Violations`] into an [`Error`].
    fn into_error(self) -> Error {
        Error::validation(self.0)
    }
}

/// Converts the provided `amount` into a [`Decimal`], if it's finite.
fn decimal(amount: f64) -> Option<Decimal> {
    Decimal::try_from(amount).ok().map(|d| d.normalize())
}

/// Parses a listed date, defaulting to the current moment if it's blank.
///
/// Accepts [RFC 3339] date-times and `YYYY-MM-DD` dates.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
fn listed_at(value: &str) -> Option<property::ListingDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return Some(DateTime::now().coerce());
    }
    if let Ok(dt) = DateTime::from_rfc3339(value) {
        return Some(dt.coerce());
    }

    let mut parts = value.splitn(3, '-');
    let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
    DateTime::from_calendar_date(
        y.parse().ok()?,
        m.parse().ok()?,
        d.parse().ok()?,
    )
    .map(DateTime::coerce)
}

/// Converts the provided [`wire::CreateRequest`] into [`property::Details`]
/// and an optionally requested [`property::Status`].
///
/// # Errors
///
/// With all the violations, if the request is invalid.
pub(crate) fn details(
    req: &wire::CreateRequest,
) -> Result<(property::Details, Option<property::Status>), Error> {
    let mut v = Violations::default();

    let title = v.text("title", "Title", &req.title);
    let description =
        v.text("description", "Description", &req.description);
    let kind = v.text("type", "Property type", &req.kind);
    let price = v.check(
        "price",
        decimal(req.price).and_then(Price::new),
        "Price must be a non-negative number",
    );
    let listed_at = v.check(
        "listedDate",
        listed_at(&req.listed_date),
        "Listed date must be an RFC 3339 date-time",
    );

    let address = v.text("address", "Address", &req.address);
    let city = v.text("city", "City", &req.city);
    let state = v.text("state", "State", &req.state);
    let zip_code = v.text("zipCode", "Zip code", &req.zip_code);
    let country = v.text("country", "Country", &req.country);
    let latitude = v.optional(
        "latitude",
        req.latitude,
        Latitude::new,
        "Latitude must be between -90 and 90",
    );
    let longitude = v.optional(
        "longitude",
        req.longitude,
        Longitude::new,
        "Longitude must be between -180 and 180",
    );

    let bathrooms = v.check(
        "bathrooms",
        decimal(req.bathrooms).and_then(Bathrooms::new),
        "Bathrooms must be a non-negative multiple of 0.5",
    );
    let area = v.check(
        "areaSqm",
        decimal(req.area_sqm)
            .filter(|a| !a.is_sign_negative())
            .map(Area::sqm),
        "Area must be a non-negative number",
    );
    let amenities = v.check(
        "amenities",
        Amenities::from_json(&req.amenities).ok(),
        "Amenities must be a JSON array of strings",
    );

    let (
        Some(title),
        Some(description),
        Some(kind),
        Some(price),
        Some(listed_at),
        Some(address),
        Some(city),
        Some(state),
        Some(zip_code),
        Some(country),
        Some(latitude),
        Some(longitude),
        Some(bathrooms),
        Some(area),
        Some(amenities),
    ) = (
        title,
        description,
        kind,
        price,
        listed_at,
        address,
        city,
        state,
        zip_code,
        country,
        latitude,
        longitude,
        bathrooms,
        area,
        amenities,
    )
    else {
        return Err(v.into_error());
    };
    v.finish()?;

    let details = property::Details {
        title,
        description,
        kind,
        price,
        listed_at,
        location: Location {
            address,
            city,
            state,
            zip_code,
            country,
            latitude,
            longitude,
        },
        layout: Layout {
            bedrooms: req.bedrooms,
            bathrooms,
            kitchens: req.kitchens,
            garages: req.garages,
            area,
            age: req.property_age,
            floor: req.floor_number,
        },
        amenities,
        agent_id: req.agent_id.map(agent::Id::from),
        owner_id: req.owner_id.map(property::OwnerId::from),
    };
    Ok((details, req.status))
}

/// Converts the provided [`wire::RejectPatch`] into a
/// [`property::RejectionReason`].
///
/// # Errors
///
/// If the reason is blank or too long.
pub(crate) fn rejection_reason(
    req: &wire::RejectPatch,
) -> Result<property::RejectionReason, Error> {
    let mut v = Violations::default();
    let reason = v.text("reason", "Rejection reason", &req.reason);
    reason.ok_or_else(|| v.into_error())
}

/// Converts the provided [`wire::SearchCriteria`] into [`list::Criteria`].
///
/// Blank text criteria are ignored.
///
/// # Errors
///
/// With all the violations, if the criteria are invalid.
pub(crate) fn criteria(
    req: &wire::SearchCriteria,
) -> Result<list::Criteria, Error> {
    let mut v = Violations::default();

    let term = req.term.as_deref().and_then(list::SearchTerm::new);
    let kind = v.optional_text("type", "Property type", req.kind.as_deref());
    let city = v.optional_text("city", "City", req.city.as_deref());
    let min_price = v.optional(
        "minPrice",
        req.min_price,
        |p| decimal(p).and_then(Price::new),
        "Minimal price must be a non-negative number",
    );
    let max_price = v.optional(
        "maxPrice",
        req.max_price,
        |p| decimal(p).and_then(Price::new),
        "Maximal price must be a non-negative number",
    );
    let min_bathrooms = v.optional(
        "minBathrooms",
        req.min_bathrooms,
        |b| decimal(b).and_then(Bathrooms::new),
        "Minimal bathrooms must be a non-negative multiple of 0.5",
    );

    let (
        Some(kind),
        Some(city),
        Some(min_price),
        Some(max_price),
        Some(min_bathrooms),
    ) = (kind, city, min_price, max_price, min_bathrooms)
    else {
        return Err(v.into_error());
    };
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            v.add("maxPrice", "Maximal price must not be below minimal one");
        }
    }
    v.finish()?;

    Ok(list::Criteria {
        term,
        status: req.status,
        kind,
        city,
        min_price,
        max_price,
        min_bedrooms: req.min_bedrooms,
        min_bathrooms,
        agent_id: req.agent_id.map(agent::Id::from),
        owner_id: req.owner_id.map(property::OwnerId::from),
    })
}

#[cfg(test)]
mod spec {
    use common::{wire, Status};
    use rust_decimal::Decimal;

    use super::{criteria, details, listed_at, rejection_reason};

    fn valid() -> wire::CreateRequest {
        wire::CreateRequest {
            title: "Seaside Villa".into(),
            description: "Four bedrooms by the sea".into(),
            kind: "House".into(),
            price: 12_500_000.0,
            address: "12 Coastal Rd".into(),
            city: "Lapu-Lapu City".into(),
            state: "Cebu".into(),
            zip_code: "6015".into(),
            country: "Philippines".into(),
            latitude: Some(10.31),
            bathrooms: 2.5,
            area_sqm: 180.0,
            amenities: r#"["Pool","Garden","Pool"]"#.into(),
            agent_id: Some(3),
            ..wire::CreateRequest::default()
        }
    }

    #[test]
    fn converts_valid_request() {
        let mut req = valid();
        req.status = Some(Status::Available);

        let (details, status) = details(&req).unwrap();

        assert_eq!(status, Some(Status::Available));
        assert_eq!(AsRef::<str>::as_ref(&details.title), "Seaside Villa");
        assert_eq!(
            details.layout.bathrooms,
            service::domain::property::Bathrooms::new(Decimal::new(25, 1))
                .unwrap(),
        );
        assert_eq!(details.layout.area.in_sqm(), Decimal::from(180));
        assert_eq!(details.amenities.iter().count(), 2);
        assert!(details.location.latitude.is_some());
        assert!(details.location.longitude.is_none());
        assert_eq!(details.agent_id.map(i64::from), Some(3));
    }

    #[test]
    fn accumulates_all_violations() {
        let req = wire::CreateRequest {
            title: "  ".into(),
            price: -1.0,
            latitude: Some(91.0),
            bathrooms: 1.3,
            amenities: "not json".into(),
            ..valid()
        };

        let err = details(&req).unwrap_err();

        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.status_code, http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.errors.keys().map(String::as_str).collect::<Vec<_>>(),
            ["amenities", "bathrooms", "latitude", "price", "title"],
        );
        assert_eq!(err.errors["title"], "Title is required");
    }

    #[test]
    fn parses_listed_dates() {
        assert!(listed_at("").is_some());
        assert!(listed_at("2024-03-01T10:00:00Z").is_some());
        assert_eq!(
            listed_at("2024-03-01").map(|d| d.unix_timestamp()),
            Some(1_709_251_200),
        );
        assert!(listed_at("yesterday").is_none());
        assert!(listed_at("2024-13-01").is_none());
    }

    #[test]
    fn requires_rejection_reason() {
        let err = rejection_reason(&wire::RejectPatch {
            reason: " ".into(),
        })
        .unwrap_err();
        assert_eq!(err.errors["reason"], "Rejection reason is required");

        let reason = rejection_reason(&wire::RejectPatch {
            reason: " Missing papers ".into(),
        })
        .unwrap();
        assert_eq!(AsRef::<str>::as_ref(&reason), "Missing papers");
    }

    #[test]
    fn converts_criteria() {
        let c = criteria(&wire::SearchCriteria {
            term: Some("  ".into()),
            city: Some("Cebu City".into()),
            min_price: Some(100.0),
            min_bedrooms: Some(2),
            ..wire::SearchCriteria::default()
        })
        .unwrap();
        assert!(c.term.is_none());
        assert_eq!(AsRef::<str>::as_ref(&c.city.unwrap()), "Cebu City");
        assert_eq!(c.min_bedrooms, Some(2));

        let err = criteria(&wire::SearchCriteria {
            min_price: Some(500.0),
            max_price: Some(100.0),
            ..wire::SearchCriteria::default()
        })
        .unwrap_err();
        assert!(err.errors.contains_key("maxPrice"));
    }
}
