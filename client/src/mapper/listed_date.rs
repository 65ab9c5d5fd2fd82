//! Listed date normalization.

use common::DateTime;
use serde_json::Value;

use super::{CoercionPolicy, MappingError};

/// Name of the listed date field.
const FIELD: &str = "listedDate";

/// Normalizes the provided listed date form value into an [RFC 3339] string.
///
/// Accepts an epoch milliseconds number, a `{seconds}` timestamp object, an
/// [RFC 3339] string, or a `YYYY-MM-DD` string. Absent value means `now`.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
pub(super) fn normalize(
    value: Option<&Value>,
    policy: CoercionPolicy,
    now: DateTime,
) -> Result<String, MappingError> {
    let Some(value) = value else {
        return Ok(now.to_rfc3339());
    };
    match parse(value) {
        Some(date) => Ok(date.to_rfc3339()),
        None => match policy {
            CoercionPolicy::Lenient => {
                tracing::debug!("malformed `{FIELD}` is replaced with now");
                Ok(now.to_rfc3339())
            }
            CoercionPolicy::Strict => Err(MappingError::InvalidDate {
                field: FIELD.to_owned(),
            }),
        },
    }
}

/// Parses the provided [`Value`] as a [`DateTime`].
fn parse(value: &Value) -> Option<DateTime> {
    match value {
        Value::Number(n) => DateTime::from_unix_timestamp_millis(n.as_i64()?),
        Value::Object(o) => {
            let secs = o.get("seconds").or_else(|| o.get("_seconds"))?;
            DateTime::from_unix_timestamp(secs.as_i64()?)
        }
        Value::String(s) => {
            let s = s.trim();
            DateTime::from_rfc3339(s).ok().or_else(|| calendar_date(s))
        }
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    }
}

/// Parses the provided `YYYY-MM-DD` string as a midnight [`DateTime`].
fn calendar_date(s: &str) -> Option<DateTime> {
    let mut parts = s.splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    DateTime::from_calendar_date(year, month, day)
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use serde_json::json;

    use super::{normalize, CoercionPolicy, MappingError};

    fn now() -> DateTime {
        DateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn accepts_all_input_shapes() {
        let march = DateTime::from_calendar_date(2024, 3, 1).unwrap();

        for input in [
            json!(1_709_251_200_000_i64),
            json!({"seconds": 1_709_251_200, "nanoseconds": 0}),
            json!("2024-03-01T00:00:00Z"),
            json!(" 2024-03-01 "),
        ] {
            assert_eq!(
                normalize(Some(&input), CoercionPolicy::Strict, now()),
                Ok(march.to_rfc3339()),
                "{input}",
            );
        }
    }

    #[test]
    fn defaults_to_now() {
        assert_eq!(
            normalize(None, CoercionPolicy::Strict, now()),
            Ok(now().to_rfc3339()),
        );
        assert_eq!(
            normalize(Some(&json!("soon")), CoercionPolicy::Lenient, now()),
            Ok(now().to_rfc3339()),
        );
        assert_eq!(
            normalize(Some(&json!("soon")), CoercionPolicy::Strict, now()),
            Err(MappingError::InvalidDate {
                field: "listedDate".into(),
            }),
        );
    }

    #[test]
    fn treats_unformattable_years_as_malformed() {
        for input in [
            json!(-100_000_000_000_000_i64),
            json!({"seconds": -100_000_000_000_i64}),
            json!("0000-01-01T00:00:00+01:00"),
        ] {
            assert_eq!(
                normalize(Some(&input), CoercionPolicy::Lenient, now()),
                Ok(now().to_rfc3339()),
                "{input}",
            );
            assert!(
                normalize(Some(&input), CoercionPolicy::Strict, now())
                    .is_err(),
                "{input}",
            );
        }
    }
}
