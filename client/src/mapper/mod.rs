//! Two-way mapping between loosely-typed forms, [`wire`] records and the
//! typed [`frontend`] representation.
//!
//! [`frontend`]: crate::frontend

pub(crate) mod amenities;
mod coerce;
mod listed_date;

use std::sync::LazyLock;

use common::{wire, Area, AreaUnit, DateTime};
use derive_more::{Display, Error};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};
use serde_json::{Map, Value};

use crate::frontend::{Agent, Image, Property, Video};

use self::coerce::Fields;

/// Country assumed when a form doesn't specify any.
pub const DEFAULT_COUNTRY: &str = "Philippines";

/// Policy of coercing malformed numeric form input.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CoercionPolicy {
    /// Malformed input is replaced with a default value.
    #[default]
    Lenient,

    /// Malformed input fails the mapping with a [`MappingError`] naming the
    /// field.
    Strict,
}

/// Error of mapping a value.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum MappingError {
    /// Value is not a JSON object.
    #[display("expected a JSON object, found {found}")]
    NotObject {
        /// JSON type of the value.
        found: &'static str,
    },

    /// Field is not a valid number.
    #[display("`{field}` is not a valid number")]
    InvalidNumber {
        /// Name of the field.
        field: String,
    },

    /// Field is not a valid date.
    #[display("`{field}` is not a valid date")]
    InvalidDate {
        /// Name of the field.
        field: String,
    },

    /// Field is not a known listing status.
    #[display("`{field}` is not a valid status")]
    InvalidStatus {
        /// Name of the field.
        field: String,
    },
}

impl MappingError {
    /// Returns the name of the field this [`MappingError`] relates to, if
    /// any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotObject { .. } => None,
            Self::InvalidNumber { field }
            | Self::InvalidDate { field }
            | Self::InvalidStatus { field } => Some(field),
        }
    }
}

/// Mapper of property listings.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mapper {
    /// [`CoercionPolicy`] of form input.
    pub policy: CoercionPolicy,

    /// [`AreaUnit`] the frontend displays and forms enter areas in.
    pub area_unit: AreaUnit,
}

impl Mapper {
    /// Creates a new [`Mapper`].
    #[must_use]
    pub const fn new(policy: CoercionPolicy, area_unit: AreaUnit) -> Self {
        Self { policy, area_unit }
    }

    /// Maps the provided form into a [`wire::CreateRequest`].
    ///
    /// # Errors
    ///
    /// If the form is not a JSON object, or contains malformed input under
    /// [`CoercionPolicy::Strict`].
    pub fn to_create_request(
        &self,
        form: &Value,
    ) -> Result<wire::CreateRequest, MappingError> {
        self.request(&Fields::new(form, self.policy)?, 1)
    }

    /// Maps the provided form into a [`wire::UpdateRequest`].
    ///
    /// Absent or malformed `id` becomes `0`, which callers must reject.
    ///
    /// # Errors
    ///
    /// If the form is not a JSON object, or contains malformed input under
    /// [`CoercionPolicy::Strict`].
    pub fn to_update_request(
        &self,
        form: &Value,
    ) -> Result<wire::UpdateRequest, MappingError> {
        let fields = Fields::new(form, self.policy)?;
        let id = Fields::new(form, CoercionPolicy::Lenient)?
            .id("id")?
            .unwrap_or_default();
        Ok(wire::UpdateRequest {
            id,
            fields: self.request(&fields, 0)?,
        })
    }

    /// Maps the provided form [`Fields`] into a [`wire::CreateRequest`],
    /// using the provided `floor` number by default.
    fn request(
        &self,
        f: &Fields<'_>,
        floor: u16,
    ) -> Result<wire::CreateRequest, MappingError> {
        Ok(wire::CreateRequest {
            title: f.text("title"),
            description: f.text("description"),
            kind: f.text("type"),
            status: f.status("status")?,
            price: f.float("price", 0.0)?,
            listed_date: listed_date::normalize(
                f.get("listedDate"),
                self.policy,
                DateTime::now(),
            )?,
            address: f.text("address"),
            city: f.text("city"),
            state: f.text("state"),
            zip_code: f.text("zipCode"),
            country: f
                .optional_text("country")
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
            latitude: f.optional_float("latitude")?,
            longitude: f.optional_float("longitude")?,
            bedrooms: f.count("bedrooms", 0)?,
            bathrooms: f.float("bathrooms", 0.0)?.max(0.0),
            kitchens: f.count("kitchens", 0)?,
            garages: f.count("garages", 0)?,
            area_sqm: float(self.form_area(f)?.in_sqm()),
            property_age: f.count("propertyAge", 0)?,
            floor_number: f.count("floorNumber", floor)?,
            amenities: amenities::encode(&amenities::normalize(
                f.get("amenities"),
            )),
            agent_id: f.id("agentId")?,
            owner_id: f.id("ownerId")?,
        })
    }

    /// Reads the floor [`Area`] of a form.
    ///
    /// `areaSqm` takes precedence over `area` (in the display unit), which
    /// takes precedence over the legacy `areaSqft`.
    fn form_area(&self, f: &Fields<'_>) -> Result<Area, MappingError> {
        for (key, unit) in [
            ("areaSqm", AreaUnit::SquareMeters),
            ("area", self.area_unit),
            ("areaSqft", AreaUnit::SquareFeet),
        ] {
            if let Some(amount) = f.optional_float(key)? {
                return Ok(Area {
                    amount: decimal(amount.max(0.0)),
                    unit,
                });
            }
        }
        Ok(Area::ZERO)
    }

    /// Maps the provided wire record into a frontend [`Property`].
    ///
    /// Falsy values (`null`, `false`, `0`, `""`) map into [`None`].
    ///
    /// # Errors
    ///
    /// If the value is neither falsy nor a JSON object.
    pub fn to_frontend(
        &self,
        value: &Value,
    ) -> Result<Option<Property>, MappingError> {
        if is_falsy(value) {
            return Ok(None);
        }
        let f = Fields::new(value, CoercionPolicy::Lenient)?;

        let images = media(f.get("propertyImages"), "imageUrl")
            .into_iter()
            .map(|(url, i)| {
                Ok(Image {
                    id: i.id("id")?.unwrap_or_default(),
                    url,
                    created_at: i.text("createdAt"),
                })
            })
            .collect::<Result<Vec<_>, MappingError>>()?;
        let videos = media(f.get("propertyVideos"), "videoUrl")
            .into_iter()
            .map(|(url, v)| {
                Ok(Video {
                    id: v.id("id")?.unwrap_or_default(),
                    url,
                    thumbnail_url: v.optional_text("thumbnailUrl"),
                    duration: v.float("duration", 0.0)?,
                    file_size: v.size("fileSize")?,
                    name: v.text("name"),
                    created_at: v.text("createdAt"),
                })
            })
            .collect::<Result<Vec<_>, MappingError>>()?;

        let agent_id = f.id("agentId")?;
        let agent = match f.get("agent").and_then(Value::as_object) {
            Some(a) if !a.is_empty() => {
                Some(agent(&Fields::lenient(a), agent_id)?)
            }
            Some(_) | None => agent_id.map(Agent::placeholder),
        };

        let image_urls =
            images.iter().map(|i| i.url.clone()).collect::<Vec<_>>();
        let video_urls =
            videos.iter().map(|v| v.url.clone()).collect::<Vec<_>>();

        Ok(Some(Property {
            id: f.id("id")?.unwrap_or_default(),
            property_number: f.text("propertyNumber"),
            title: f.text("title"),
            description: f.text("description"),
            kind: f.text("type"),
            status: f.status("status")?,
            rejection_reason: f.optional_text("rejectionReason"),
            price: f.float("price", 0.0)?,
            listed_date: f.text("listedDate"),
            address: f.text("address"),
            city: f.text("city"),
            state: f.text("state"),
            zip_code: f.text("zipCode"),
            country: f.text("country"),
            latitude: f.optional_float("latitude")?,
            longitude: f.optional_float("longitude")?,
            bedrooms: f.count("bedrooms", 0)?,
            bathrooms: f.float("bathrooms", 0.0)?,
            kitchens: f.count("kitchens", 0)?,
            garages: f.count("garages", 0)?,
            area: self.record_area(&f)?,
            property_age: f.count("propertyAge", 0)?,
            floor_number: f.count("floorNumber", 0)?,
            amenities: amenities::decode(f.get("amenities")),
            agent_id,
            owner_id: f.id("ownerId")?,
            agent,
            main_image: image_urls.first().cloned().unwrap_or_default(),
            main_video: video_urls.first().cloned().unwrap_or_default(),
            images,
            videos,
            image_urls,
            video_urls,
            created_at: f.text("createdAt"),
            updated_at: f.text("updatedAt"),
        }))
    }

    /// Reads the floor [`Area`] of a wire record in the display unit.
    ///
    /// Legacy records carry `areaSqft` instead of `areaSqm`.
    fn record_area(&self, f: &Fields<'_>) -> Result<Area, MappingError> {
        let area = if let Some(sqm) = f.optional_float("areaSqm")? {
            Area::sqm(decimal(sqm))
        } else if let Some(sqft) = f.optional_float("areaSqft")? {
            Area::sqft(decimal(sqft))
        } else {
            Area::ZERO
        };
        Ok(area.to(self.area_unit))
    }

    /// Maps the provided wire records into frontend [`Property`] listings.
    ///
    /// Accepts a bare array, or a `properties`/`property` envelope. Records
    /// failing to map are logged and dropped.
    #[must_use]
    pub fn to_frontend_list(&self, value: &Value) -> Vec<Property> {
        entries(value)
            .into_iter()
            .enumerate()
            .filter_map(|(n, v)| match self.to_frontend(v) {
                Ok(Some(p)) => Some(p),
                Ok(None) => {
                    tracing::warn!("dropped empty property record #{n}");
                    None
                }
                Err(e) => {
                    tracing::warn!("dropped property record #{n}: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Resolves a single wire record out of the provided response body.
///
/// Accepts a `property` envelope or a bare record. An envelope without any
/// record resolves into `null`.
pub(crate) fn single(value: &Value) -> &Value {
    static NULL: Value = Value::Null;

    if let Some(p) = value.get("property") {
        p
    } else if value.get("success").is_some() {
        &NULL
    } else {
        value
    }
}

/// Resolves the list of wire records out of the provided response body.
fn entries(value: &Value) -> Vec<&Value> {
    if let Some(list) = value.as_array() {
        list.iter().collect()
    } else if let Some(list) = value.get("properties") {
        list.as_array().map(|l| l.iter().collect()).unwrap_or_default()
    } else {
        let one = single(value);
        if one.is_object() {
            vec![one]
        } else {
            vec![]
        }
    }
}

/// Indicates whether the provided [`Value`] is falsy.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Normalizes the provided media collection of a wire record into URLs and
/// the [`Fields`] of their entries.
///
/// The collection may be an array, a single object, or bare URL strings.
/// Entries with empty URLs are filtered out.
fn media<'a>(
    value: Option<&'a Value>,
    url_key: &str,
) -> Vec<(String, Fields<'a>)> {
    static EMPTY: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

    let items = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v @ (Value::Object(_) | Value::String(_))) => vec![v],
        Some(Value::Null | Value::Bool(_) | Value::Number(_)) | None => {
            vec![]
        }
    };

    items
        .into_iter()
        .filter_map(|item| {
            let (url, fields) = if let Some(s) = item.as_str() {
                (s.trim().to_owned(), Fields::lenient(&EMPTY))
            } else {
                let fields = Fields::lenient(item.as_object()?);
                let url = fields
                    .optional_text(url_key)
                    .or_else(|| fields.optional_text("url"))?;
                (url, fields)
            };
            (!url.is_empty()).then_some((url, fields))
        })
        .collect()
}

/// Maps the provided embedded agent [`Fields`] into an [`Agent`] verbatim.
fn agent(a: &Fields<'_>, agent_id: Option<i64>) -> Result<Agent, MappingError> {
    Ok(Agent {
        id: a.id("id")?.or(agent_id).unwrap_or_default(),
        first_name: a.text("firstName"),
        last_name: a.text("lastName"),
        email: a.text("email"),
        phone: a.text("phone"),
        license_number: a.text("licenseNumber"),
        profile_picture_url: a.text("profilePictureUrl"),
    })
}

/// Converts the provided floating point number into a [`Decimal`].
fn decimal(n: f64) -> Decimal {
    Decimal::try_from(n).unwrap_or_default().normalize()
}

/// Converts the provided [`Decimal`] into a floating point number.
fn float(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod spec {
    use common::{AreaUnit, Status};
    use serde_json::{json, Value};

    use super::{CoercionPolicy, Mapper, MappingError, DEFAULT_COUNTRY};

    fn form() -> Value {
        json!({
            "title": "  Seaside Villa ",
            "description": "Four bedrooms by the sea",
            "type": "Villa",
            "status": "available",
            "price": "12,500,000",
            "listedDate": "2024-03-01",
            "address": "1 Coast Rd",
            "city": "Lapu-Lapu City",
            "state": "Cebu",
            "zipCode": 6015,
            "latitude": 10.31,
            "longitude": "",
            "bedrooms": 4,
            "bathrooms": "3.5",
            "areaSqm": 250,
            "amenities": "Pool, Garden, Pool",
            "agentId": 3,
        })
    }

    #[test]
    fn maps_create_request() {
        let req = Mapper::default().to_create_request(&form()).unwrap();

        assert_eq!(req.title, "Seaside Villa");
        assert_eq!(req.kind, "Villa");
        assert_eq!(req.status, Some(Status::Available));
        assert_eq!(req.price, 12_500_000.0);
        assert!(req.listed_date.starts_with("2024-03-01T00:00:00"));
        assert_eq!(req.zip_code, "6015");
        assert_eq!(req.country, DEFAULT_COUNTRY);
        assert_eq!(req.latitude, Some(10.31));
        assert_eq!(req.longitude, None);
        assert_eq!(req.bathrooms, 3.5);
        assert_eq!(req.area_sqm, 250.0);
        assert_eq!(req.floor_number, 1);
        assert_eq!(req.amenities, r#"["Pool","Garden"]"#);
        assert_eq!(req.agent_id, Some(3));
        assert_eq!(req.owner_id, None);
    }

    #[test]
    fn converts_display_area_unit() {
        let mapper =
            Mapper::new(CoercionPolicy::Lenient, AreaUnit::SquareFeet);

        let req = mapper
            .to_create_request(&json!({"area": "1076.39104"}))
            .unwrap();
        assert_eq!(req.area_sqm, 100.0);

        let req = Mapper::default()
            .to_create_request(&json!({"areaSqft": 1076.39104}))
            .unwrap();
        assert_eq!(req.area_sqm, 100.0);

        let p = mapper
            .to_frontend(&json!({"id": 1, "areaSqm": 100}))
            .unwrap()
            .unwrap();
        assert_eq!(p.area_label(), "1076.39 sqft");
    }

    #[test]
    fn maps_update_request() {
        let mapper = Mapper::default();

        let mut form = form();
        form["id"] = json!("42");
        assert_eq!(mapper.to_update_request(&form).unwrap().id, 42);

        form["id"] = json!("forty-two");
        let req = mapper.to_update_request(&form).unwrap();
        assert_eq!(req.id, 0);
        assert_eq!(req.fields.floor_number, 0);
    }

    #[test]
    fn strict_policy_rejects_malformed_numbers() {
        let mapper = Mapper::new(CoercionPolicy::Strict, AreaUnit::default());

        let mut form = form();
        form["price"] = json!("a lot");
        let err = mapper.to_create_request(&form).unwrap_err();

        assert_eq!(
            err,
            MappingError::InvalidNumber {
                field: "price".into(),
            },
        );
        assert_eq!(err.field(), Some("price"));
    }

    #[test]
    fn out_of_range_listed_date_is_malformed() {
        let mut form = form();
        form["listedDate"] = json!(-100_000_000_000_000_i64);

        let req = Mapper::default().to_create_request(&form).unwrap();
        assert!(!req.listed_date.starts_with('-'), "{}", req.listed_date);

        let strict = Mapper::new(CoercionPolicy::Strict, AreaUnit::default());
        let form = json!({
            "id": 7,
            "title": "A",
            "listedDate": -100_000_000_000_000_i64,
        });
        assert_eq!(
            strict.to_update_request(&form).unwrap_err(),
            MappingError::InvalidDate {
                field: "listedDate".into(),
            },
        );
    }

    #[test]
    fn rejects_non_object_forms() {
        assert_eq!(
            Mapper::default()
                .to_create_request(&json!("title"))
                .unwrap_err(),
            MappingError::NotObject { found: "string" },
        );
    }

    #[test]
    fn falsy_record_maps_into_none() {
        let mapper = Mapper::default();

        for v in [json!(null), json!(false), json!(0), json!("")] {
            assert_eq!(mapper.to_frontend(&v).unwrap(), None, "{v}");
        }
        assert!(mapper.to_frontend(&json!([1])).is_err());
    }

    #[test]
    fn filters_empty_media() {
        let record = json!({
            "id": 5,
            "propertyImages": [
                {"id": 1, "imageUrl": ""},
                {"id": 2, "imageUrl": "/media/images/b.png"},
            ],
            "propertyVideos": {"id": 9, "videoUrl": "/media/videos/v.mp4"},
        });

        let p = Mapper::default().to_frontend(&record).unwrap().unwrap();

        assert_eq!(p.image_urls, ["/media/images/b.png"]);
        assert_eq!(p.images.len(), 1);
        assert_eq!(p.images[0].id, 2);
        assert_eq!(p.main_image, "/media/images/b.png");
        assert_eq!(p.main_video, "/media/videos/v.mp4");

        let p = Mapper::default()
            .to_frontend(&json!({"propertyImages": ["", " /a.png "]}))
            .unwrap()
            .unwrap();
        assert_eq!(p.image_urls, ["/a.png"]);

        let p = Mapper::default().to_frontend(&json!({"id": 1})).unwrap();
        assert_eq!(p.unwrap().main_image, "");
    }

    #[test]
    fn agent_placeholder_and_embedded() {
        let mapper = Mapper::default();

        let p = mapper
            .to_frontend(&json!({"id": 1, "agentId": 7}))
            .unwrap()
            .unwrap();
        let agent = p.agent.unwrap();
        assert_eq!(agent.id, 7);
        assert_eq!(agent.first_name, "Unknown");
        assert_eq!(agent.last_name, "Agent");

        let p = mapper
            .to_frontend(&json!({
                "id": 1,
                "agentId": 7,
                "agent": {
                    "id": 7,
                    "firstName": "Maria",
                    "lastName": "Santos",
                    "email": "maria@example.com",
                    "phone": "+63 917 000 0000",
                    "licenseNumber": "PRC-1234",
                    "profilePictureUrl": "/media/images/maria.png",
                },
            }))
            .unwrap()
            .unwrap();
        let agent = p.agent.unwrap();
        assert_eq!(agent.first_name, "Maria");
        assert_eq!(agent.last_name, "Santos");
        assert_eq!(agent.email, "maria@example.com");
        assert_eq!(agent.license_number, "PRC-1234");

        let p = mapper.to_frontend(&json!({"id": 1})).unwrap().unwrap();
        assert_eq!(p.agent, None);
    }

    #[test]
    fn list_drops_failed_entries() {
        let mapper = Mapper::default();

        let list = mapper.to_frontend_list(&json!([
            {"id": 1, "title": "A"},
            null,
            "garbage",
            {"id": 2, "title": "B"},
        ]));
        assert_eq!(list.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 2]);

        let list = mapper.to_frontend_list(&json!({
            "success": true,
            "properties": [{"id": 3}],
        }));
        assert_eq!(list.len(), 1);

        let list = mapper.to_frontend_list(&json!({
            "success": true,
            "property": {"id": 4},
        }));
        assert_eq!(list[0].id, 4);

        assert!(mapper.to_frontend_list(&json!({"success": true})).is_empty());
    }
}
