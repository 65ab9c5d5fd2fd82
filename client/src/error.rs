//! Client [`Error`] taxonomy.

use std::collections::BTreeMap;

use derive_more::{Display, Error as StdError};
use serde_json::Value;

/// Kind of an [`Error`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Request is rejected by a client-side pre-check, or by the server with
    /// `400`/`422` status.
    #[display("VALIDATION_ERROR")]
    Validation,

    /// Server requires authentication (`401`).
    #[display("AUTH_ERROR")]
    Auth,

    /// Server denies access (`403`).
    #[display("FORBIDDEN_ERROR")]
    Forbidden,

    /// Requested resource doesn't exist (`404`).
    #[display("NOT_FOUND_ERROR")]
    NotFound,

    /// Request conflicts with the current state of the resource (`409`).
    #[display("CONFLICT_ERROR")]
    Conflict,

    /// Server failed internally (`500`).
    #[display("SERVER_ERROR")]
    Server,

    /// Request was sent, but no response was received.
    #[display("NETWORK_ERROR")]
    Network,

    /// Response cannot be understood.
    #[display("UNKNOWN_ERROR")]
    Unknown,

    /// Server responded with an unmapped status code.
    #[display("HTTP_ERROR")]
    Http,

    /// Files violate client-side constraints.
    #[display("FILE_VALIDATION_ERROR")]
    FileValidation,

    /// Form fields violate client-side constraints.
    #[display("FORM_VALIDATION_ERROR")]
    FormValidation,
}

impl ErrorKind {
    /// Maps the provided HTTP `status` code of a failed response into an
    /// [`ErrorKind`].
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Auth,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500 => Self::Server,
            _ => Self::Http,
        }
    }

    /// Returns the default human-readable message of this [`ErrorKind`].
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Request is invalid",
            Self::Auth => "Authentication is required",
            Self::Forbidden => "Access is denied",
            Self::NotFound => "Resource does not exist",
            Self::Conflict => "Request conflicts with the current state",
            Self::Server => "Server failed to process the request",
            Self::Network => "Server is unreachable",
            Self::Unknown => "Unexpected response",
            Self::Http => "Request failed",
            Self::FileValidation => "Files are invalid",
            Self::FormValidation => "Form is invalid",
        }
    }
}

/// Structured details of an [`Error`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Details {
    /// No details.
    #[default]
    None,

    /// Per-field messages.
    Fields(BTreeMap<String, String>),

    /// Per-file messages, in the order of the files.
    Files(Vec<String>),
}

/// Normalized error of a client operation.
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
#[display("{kind}: {message}")]
pub struct Error {
    /// [`ErrorKind`] of this [`Error`].
    pub kind: ErrorKind,

    /// Human-readable message.
    pub message: String,

    /// HTTP status code of the response, if any was received.
    pub status: Option<u16>,

    /// Structured [`Details`].
    pub details: Details,
}

impl Error {
    /// Creates a new [`Error`] of the provided [`ErrorKind`] without any
    /// [`Details`].
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: Details::None,
        }
    }

    /// Creates a new [`ErrorKind::Validation`] [`Error`] of a single `field`.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            details: Details::Fields(BTreeMap::from([(
                field.to_owned(),
                message.clone(),
            )])),
            ..Self::new(ErrorKind::Validation, message)
        }
    }

    /// Creates a new [`ErrorKind::FormValidation`] [`Error`] with the
    /// provided per-field messages.
    #[must_use]
    pub fn form(fields: BTreeMap<String, String>) -> Self {
        Self {
            details: Details::Fields(fields),
            ..Self::new(
                ErrorKind::FormValidation,
                ErrorKind::FormValidation.default_message(),
            )
        }
    }

    /// Creates a new [`ErrorKind::FileValidation`] [`Error`] with the
    /// provided per-file messages.
    #[must_use]
    pub fn files(messages: Vec<String>) -> Self {
        Self {
            details: Details::Files(messages),
            ..Self::new(
                ErrorKind::FileValidation,
                ErrorKind::FileValidation.default_message(),
            )
        }
    }

    /// Creates a new [`ErrorKind::Network`] [`Error`].
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Creates a new [`ErrorKind::Unknown`] [`Error`].
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Creates a new [`Error`] out of a failed response with the provided
    /// HTTP `status` code and decoded `body`, if any.
    ///
    /// The `message` and per-field `errors` of the response envelope are
    /// preserved.
    #[must_use]
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map_or_else(|| kind.default_message().to_owned(), str::to_owned);
        let fields = body
            .and_then(|b| b.get("errors"))
            .and_then(Value::as_object)
            .map(|errs| {
                errs.iter()
                    .map(|(field, msg)| {
                        let msg = msg
                            .as_str()
                            .map_or_else(|| msg.to_string(), str::to_owned);
                        (field.clone(), msg)
                    })
                    .collect::<BTreeMap<_, _>>()
            })
            .filter(|errs| !errs.is_empty());

        Self {
            kind,
            message,
            status: Some(status),
            details: fields.map_or(Details::None, Details::Fields),
        }
    }

    /// Returns the per-field messages of this [`Error`], if any.
    #[must_use]
    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match &self.details {
            Details::Fields(f) => Some(f),
            Details::None | Details::Files(_) => None,
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::{Details, Error, ErrorKind};

    #[test]
    fn maps_statuses() {
        for (status, kind) in [
            (400, ErrorKind::Validation),
            (422, ErrorKind::Validation),
            (401, ErrorKind::Auth),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::Conflict),
            (500, ErrorKind::Server),
            (502, ErrorKind::Http),
            (429, ErrorKind::Http),
        ] {
            assert_eq!(ErrorKind::from_status(status), kind, "{status}");
        }
    }

    #[test]
    fn keeps_envelope_details() {
        let body = json!({
            "success": false,
            "code": "VALIDATION_ERROR",
            "message": "Validation failed",
            "errors": {"title": "Title is required", "price": 1},
        });

        let err = Error::from_response(422, Some(&body));

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Validation failed");
        assert_eq!(err.status, Some(422));
        let fields = err.fields().unwrap();
        assert_eq!(fields["title"], "Title is required");
        assert_eq!(fields["price"], "1");
    }

    #[test]
    fn falls_back_to_default_message() {
        let err = Error::from_response(503, None);

        assert_eq!(err.kind, ErrorKind::Http);
        assert_eq!(err.message, "Request failed");
        assert_eq!(err.details, Details::None);
        assert_eq!(err.to_string(), "HTTP_ERROR: Request failed");
    }
}
