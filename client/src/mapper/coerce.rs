//! Coercion of loosely-typed JSON fields.

use std::str::FromStr as _;

use common::Status;
use serde_json::{Map, Value};

use super::{CoercionPolicy, MappingError};

/// Returns the name of the JSON type of the provided [`Value`].
pub(super) const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fields of a JSON object, read according to a [`CoercionPolicy`].
#[derive(Clone, Copy, Debug)]
pub(super) struct Fields<'a> {
    /// Underlying JSON object.
    map: &'a Map<String, Value>,

    /// [`CoercionPolicy`] of malformed values.
    policy: CoercionPolicy,
}

impl<'a> Fields<'a> {
    /// Wraps the provided JSON `value`, which must be an object.
    pub(super) fn new(
        value: &'a Value,
        policy: CoercionPolicy,
    ) -> Result<Self, MappingError> {
        let map = value.as_object().ok_or(MappingError::NotObject {
            found: type_name(value),
        })?;
        Ok(Self { map, policy })
    }

    /// Wraps the provided JSON object with [`CoercionPolicy::Lenient`].
    pub(super) const fn lenient(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            policy: CoercionPolicy::Lenient,
        }
    }

    /// Returns the value of the provided `key`, unless it's absent, `null` or
    /// a blank string.
    pub(super) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Bool(_)
            | Value::Number(_)
            | Value::Array(_)
            | Value::Object(_) => true,
        })
    }

    /// Applies the [`CoercionPolicy`] to a malformed value of the provided
    /// `key`.
    fn malformed<T>(
        &self,
        key: &str,
        default: T,
        err: impl FnOnce(String) -> MappingError,
    ) -> Result<T, MappingError> {
        match self.policy {
            CoercionPolicy::Lenient => {
                tracing::debug!("malformed `{key}` field is defaulted");
                Ok(default)
            }
            CoercionPolicy::Strict => Err(err(key.to_owned())),
        }
    }

    /// Returns the trimmed text of the provided `key`, or an empty string.
    pub(super) fn text(&self, key: &str) -> String {
        self.optional_text(key).unwrap_or_default()
    }

    /// Returns the trimmed text of the provided `key`, if any.
    pub(super) fn optional_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.trim().to_owned()),
            v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the number of the provided `key`, or the `default` one if
    /// it's absent.
    pub(super) fn float(
        &self,
        key: &str,
        default: f64,
    ) -> Result<f64, MappingError> {
        Ok(self.optional_float(key)?.unwrap_or(default))
    }

    /// Returns the number of the provided `key`, if any.
    pub(super) fn optional_float(
        &self,
        key: &str,
    ) -> Result<Option<f64>, MappingError> {
        let Some(v) = self.get(key) else {
            return Ok(None);
        };
        match parse_float(v) {
            Some(n) => Ok(Some(n)),
            None => self.malformed(key, None, |field| {
                MappingError::InvalidNumber { field }
            }),
        }
    }

    /// Returns the non-negative count of the provided `key`, or the `default`
    /// one if it's absent.
    ///
    /// Fractional counts are truncated.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "bounds are checked"
    )]
    pub(super) fn count(
        &self,
        key: &str,
        default: u16,
    ) -> Result<u16, MappingError> {
        let Some(v) = self.get(key) else {
            return Ok(default);
        };
        let bounds = 0.0..=f64::from(u16::MAX);
        match parse_float(v).filter(|n| bounds.contains(n)) {
            Some(n) => Ok(n.trunc() as u16),
            None => self.malformed(key, default, |field| {
                MappingError::InvalidNumber { field }
            }),
        }
    }

    /// Returns the non-negative size of the provided `key`, or zero.
    pub(super) fn size(&self, key: &str) -> Result<u64, MappingError> {
        let Some(v) = self.get(key) else {
            return Ok(0);
        };
        match v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()) {
            Some(n) => Ok(n),
            None => self.malformed(key, 0, |field| {
                MappingError::InvalidNumber { field }
            }),
        }
    }

    /// Returns the integer ID of the provided `key`, if any.
    pub(super) fn id(&self, key: &str) -> Result<Option<i64>, MappingError> {
        let Some(v) = self.get(key) else {
            return Ok(None);
        };
        match v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()) {
            Some(id) => Ok(Some(id)),
            None => self.malformed(key, None, |field| {
                MappingError::InvalidNumber { field }
            }),
        }
    }

    /// Returns the [`Status`] of the provided `key`, if any.
    pub(super) fn status(
        &self,
        key: &str,
    ) -> Result<Option<Status>, MappingError> {
        let Some(text) = self.optional_text(key) else {
            return Ok(None);
        };
        match Status::from_str(&text.to_lowercase()) {
            Ok(s) => Ok(Some(s)),
            Err(_) => self.malformed(key, None, |field| {
                MappingError::InvalidStatus { field }
            }),
        }
    }
}

/// Parses the provided [`Value`] as a finite number.
///
/// Strings may contain thousands separators.
fn parse_float(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return None;
        }
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod spec {
    use common::Status;
    use serde_json::json;

    use super::{CoercionPolicy, Fields, MappingError};

    #[test]
    fn lenient_substitutes_defaults() {
        let form = json!({
            "price": "1,250,000.50",
            "bedrooms": "abc",
            "bathrooms": "",
            "garages": -1,
            "kitchens": 2.7,
            "status": "Pending",
            "agentId": "12",
            "zipCode": 6000,
        });
        let f = Fields::new(&form, CoercionPolicy::Lenient).unwrap();

        assert_eq!(f.float("price", 0.0).unwrap(), 1_250_000.5);
        assert_eq!(f.count("bedrooms", 0).unwrap(), 0);
        assert_eq!(f.float("bathrooms", 0.0).unwrap(), 0.0);
        assert_eq!(f.count("garages", 0).unwrap(), 0);
        assert_eq!(f.count("kitchens", 0).unwrap(), 2);
        assert_eq!(f.count("floorNumber", 1).unwrap(), 1);
        assert_eq!(f.status("status").unwrap(), Some(Status::Pending));
        assert_eq!(f.id("agentId").unwrap(), Some(12));
        assert_eq!(f.text("zipCode"), "6000");
    }

    #[test]
    fn strict_names_malformed_field() {
        let form = json!({"bedrooms": "many", "status": "listed"});
        let f = Fields::new(&form, CoercionPolicy::Strict).unwrap();

        assert_eq!(
            f.count("bedrooms", 0),
            Err(MappingError::InvalidNumber {
                field: "bedrooms".into(),
            }),
        );
        assert_eq!(
            f.status("status"),
            Err(MappingError::InvalidStatus {
                field: "status".into(),
            }),
        );
        assert_eq!(f.count("garages", 0), Ok(0));
    }

    #[test]
    fn requires_object() {
        assert_eq!(
            Fields::new(&json!([1]), CoercionPolicy::Lenient).unwrap_err(),
            MappingError::NotObject { found: "array" },
        );
    }
}
