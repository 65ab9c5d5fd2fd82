//! Pre-submission checks of property forms and media files.

use std::collections::BTreeMap;

use serde_json::Value;
use smart_default::SmartDefault;

use crate::{Error, File};

/// Required text fields of a create form, along with their messages.
const REQUIRED: [(&str, &str); 6] = [
    ("title", "Title is required"),
    ("type", "Property type is required"),
    ("address", "Address is required"),
    ("city", "City is required"),
    ("state", "State/Province is required"),
    ("zipCode", "Zip code is required"),
];

/// Validates the provided create form.
///
/// # Errors
///
/// With a [`FormValidation`] [`Error`] listing every violated field.
///
/// [`FormValidation`]: crate::ErrorKind::FormValidation
pub fn validate_create(form: &Value) -> Result<(), Error> {
    let mut errors = BTreeMap::new();
    for (field, message) in REQUIRED {
        if !is_present(form.get(field)) {
            _ = errors.insert(field.to_owned(), message.to_owned());
        }
    }
    if !form.get("price").and_then(number).is_some_and(|p| p > 0.0) {
        _ = errors.insert(
            "price".to_owned(),
            "Price must be greater than zero".to_owned(),
        );
    }
    result(errors)
}

/// Validates the provided update form.
///
/// # Errors
///
/// With a [`FormValidation`] [`Error`] listing every violated field.
///
/// [`FormValidation`]: crate::ErrorKind::FormValidation
pub fn validate_update(form: &Value) -> Result<(), Error> {
    let mut errors = BTreeMap::new();
    if !form.get("id").is_some_and(is_truthy) {
        _ = errors.insert("id".to_owned(), "ID is required".to_owned());
    }
    if !is_present(form.get("title")) {
        _ = errors.insert("title".to_owned(), "Title is required".to_owned());
    }
    result(errors)
}

/// Constraints of uploaded [`File`]s.
#[derive(Clone, Debug, SmartDefault)]
pub struct FileRules {
    /// Maximum size of a [`File`] in bytes.
    #[default(10 * 1024 * 1024)]
    pub max_size_bytes: u64,

    /// Allowed MIME types. Empty list allows any type.
    pub allowed_mime_types: Vec<String>,
}

impl FileRules {
    /// Returns the default [`FileRules`] of property images.
    #[must_use]
    pub fn images() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            allowed_mime_types: types(&[
                "image/jpeg",
                "image/png",
                "image/webp",
                "image/gif",
            ]),
        }
    }

    /// Returns the default [`FileRules`] of property videos.
    #[must_use]
    pub fn videos() -> Self {
        Self {
            max_size_bytes: 200 * 1024 * 1024,
            allowed_mime_types: types(&[
                "video/mp4",
                "video/webm",
                "video/quicktime",
            ]),
        }
    }
}

/// Validates the provided [`File`]s against the provided [`FileRules`].
///
/// Size is checked before MIME type, and only the first violation of each
/// [`File`] is reported.
///
/// # Errors
///
/// With a [`FileValidation`] [`Error`] listing a message per violating
/// [`File`], in the order of `files`.
///
/// [`FileValidation`]: crate::ErrorKind::FileValidation
pub fn validate_files(files: &[File], rules: &FileRules) -> Result<(), Error> {
    let messages = files
        .iter()
        .filter_map(|f| {
            if f.size() > rules.max_size_bytes {
                return Some(format!(
                    "`{}` exceeds the maximum size of {} bytes",
                    f.name, rules.max_size_bytes,
                ));
            }
            let allowed = rules.allowed_mime_types.is_empty()
                || f.content_type.as_deref().is_some_and(|t| {
                    rules
                        .allowed_mime_types
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(t))
                });
            (!allowed).then(|| {
                format!(
                    "`{}` has unsupported type `{}`",
                    f.name,
                    f.content_type.as_deref().unwrap_or("unknown"),
                )
            })
        })
        .collect::<Vec<_>>();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(Error::files(messages))
    }
}

/// Converts the accumulated field `errors` into a validation result.
fn result(errors: BTreeMap<String, String>) -> Result<(), Error> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::form(errors))
    }
}

/// Indicates whether the provided form value is present and non-blank.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => true,
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Indicates whether the provided form value is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads the provided form value as a number.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

/// Converts the provided MIME types into owned ones.
fn types(types: &[&str]) -> Vec<String> {
    types.iter().copied().map(str::to_owned).collect()
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use crate::{Details, ErrorKind, File};

    use super::{validate_create, validate_files, validate_update, FileRules};

    #[test]
    fn reports_every_missing_field() {
        let err = validate_create(&json!({})).unwrap_err();

        assert_eq!(err.kind, ErrorKind::FormValidation);
        let Details::Fields(fields) = err.details else {
            panic!("expected field details");
        };
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            [
                "address", "city", "price", "state", "title", "type",
                "zipCode",
            ],
        );
    }

    #[test]
    fn accepts_complete_form() {
        assert_eq!(
            validate_create(&json!({
                "title": "A",
                "type": "House",
                "price": 100_000,
                "address": "1 Main St",
                "city": "X",
                "state": "Y",
                "zipCode": "12345",
            })),
            Ok(()),
        );
    }

    #[test]
    fn requires_positive_price() {
        for price in [json!(0), json!(-5), json!("free"), json!(null)] {
            let err = validate_create(&json!({"price": price.clone()}))
                .unwrap_err();
            let Details::Fields(fields) = err.details else {
                panic!("expected field details");
            };
            assert!(fields.contains_key("price"), "{price}");
        }
    }

    #[test]
    fn update_requires_id_and_title() {
        assert_eq!(validate_update(&json!({"id": 3, "title": "A"})), Ok(()));

        let err = validate_update(&json!({"id": 0, "title": " "})).unwrap_err();
        let Details::Fields(fields) = err.details else {
            panic!("expected field details");
        };
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn reports_one_message_per_file() {
        let rules = FileRules {
            max_size_bytes: 4,
            ..FileRules::images()
        };
        let files = [
            File::new("big.png", "image/png", vec![0; 5]),
            File::new("ok.png", "image/PNG", vec![0; 4]),
            File::new("doc.pdf", "application/pdf", vec![0; 1]),
            File::new("huge.pdf", "application/pdf", vec![0; 9]),
        ];

        let err = validate_files(&files, &rules).unwrap_err();

        assert_eq!(err.kind, ErrorKind::FileValidation);
        let Details::Files(messages) = err.details else {
            panic!("expected file details");
        };
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("big.png"));
        assert!(messages[1].contains("application/pdf"));
        assert!(messages[2].contains("maximum size"));

        let any = FileRules {
            allowed_mime_types: vec![],
            ..FileRules::default()
        };
        assert_eq!(validate_files(&files[2..], &any), Ok(()));
    }
}
