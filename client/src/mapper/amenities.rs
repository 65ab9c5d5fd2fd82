//! Amenities normalization.

use std::collections::HashSet;

use serde_json::Value;

/// Normalizes the provided amenities form value into an ordered list of
/// labels without duplicates.
///
/// Accepts an array, a JSON-encoded array string, or comma-separated text.
pub(crate) fn normalize(value: Option<&Value>) -> Vec<String> {
    let labels = match value {
        None | Some(Value::Null | Value::Bool(_) | Value::Object(_)) => {
            vec![]
        }
        Some(Value::Array(items)) => items.iter().filter_map(label).collect(),
        Some(Value::Number(n)) => vec![n.to_string()],
        Some(Value::String(s)) => {
            match serde_json::from_str::<Vec<Value>>(s.trim()) {
                Ok(items) => items.iter().filter_map(label).collect(),
                Err(_) => s
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_owned)
                    .collect(),
            }
        }
    };
    dedup(labels)
}

/// Decodes the amenities of a wire record.
///
/// Undecodable amenities are logged and treated as none.
pub(crate) fn decode(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => {
            dedup(items.iter().filter_map(label).collect())
        }
        Some(Value::String(s)) if s.trim().is_empty() => vec![],
        Some(Value::String(s)) => {
            match serde_json::from_str::<Vec<Value>>(s) {
                Ok(items) => dedup(items.iter().filter_map(label).collect()),
                Err(e) => {
                    tracing::warn!("failed to parse amenities `{s}`: {e}");
                    vec![]
                }
            }
        }
        Some(v @ (Value::Bool(_) | Value::Number(_) | Value::Object(_))) => {
            tracing::warn!("unexpected amenities `{v}`");
            vec![]
        }
    }
}

/// Encodes the provided amenity `labels` as a JSON array string.
pub(crate) fn encode(labels: &[String]) -> String {
    Value::from(labels.to_vec()).to_string()
}

/// Extracts a trimmed non-empty label out of the provided array item.
fn label(item: &Value) -> Option<String> {
    let label = match item {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return None;
        }
    };
    (!label.is_empty()).then_some(label)
}

/// Removes duplicated `labels`, keeping the first occurrences in order.
fn dedup(mut labels: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels.retain(|l| seen.insert(l.clone()));
    labels
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use serde_json::{json, Value};

    use super::{decode, encode, normalize};

    fn canonical(value: &Value) -> BTreeSet<String> {
        serde_json::from_str(&encode(&normalize(Some(value)))).unwrap()
    }

    #[test]
    fn accepts_all_input_shapes() {
        let expected = ["Pool", "Gym", "Parking"]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect::<BTreeSet<_>>();

        assert_eq!(canonical(&json!(["Pool", " Gym", "Parking"])), expected);
        assert_eq!(
            canonical(&json!(r#"["Gym","Parking","Pool"]"#)),
            expected,
        );
        assert_eq!(canonical(&json!("Parking, Pool ,Gym,")), expected);
    }

    #[test]
    fn keeps_first_occurrence_order() {
        assert_eq!(
            normalize(Some(&json!("Gym, Pool, Gym, , Sauna"))),
            ["Gym", "Pool", "Sauna"],
        );
        assert_eq!(encode(&["Gym".into(), "Pool".into()]), r#"["Gym","Pool"]"#);
        assert!(normalize(None).is_empty());
    }

    #[test]
    fn swallows_undecodable_records() {
        assert_eq!(decode(Some(&json!(r#"["Pool","Pool"]"#))), ["Pool"]);
        assert!(decode(Some(&json!("Pool, Gym"))).is_empty());
        assert!(decode(Some(&json!(""))).is_empty());
        assert!(decode(Some(&json!(42))).is_empty());
    }
}
