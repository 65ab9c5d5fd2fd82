//! [`Error`]-related definitions.

use std::{collections::BTreeMap, fmt};

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    Json,
};
use common::wire::Envelope;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::infra::database;
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            errors: ::std::collections::BTreeMap::new(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Per-field messages of this [`Error`], keyed by the field name.
    pub errors: BTreeMap<String, String>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            errors: BTreeMap::new(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing a malformed request.
    #[must_use]
    pub fn bad_request(msg: &impl ToString) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            errors: BTreeMap::new(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] out of the provided per-field `errors`.
    #[must_use]
    pub fn validation(errors: BTreeMap<String, String>) -> Self {
        Self {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::UNPROCESSABLE_ENTITY,
            message: "Validation failed".to_owned(),
            errors,
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] of a single invalid `field`.
    #[must_use]
    pub fn invalid_field(field: &str, msg: &impl ToString) -> Self {
        Self::validation(BTreeMap::from([(
            field.to_owned(),
            msg.to_string(),
        )]))
    }

    /// Creates a new [`Error`] representing a conflict with the current
    /// state of a resource.
    #[must_use]
    pub fn conflict(msg: &impl ToString) -> Self {
        Self {
            code: "CONFLICT_ERROR",
            status_code: http::StatusCode::CONFLICT,
            message: msg.to_string(),
            errors: BTreeMap::new(),
            backtrace: None,
        }
    }

    /// Returns the [`Envelope`] this [`Error`] is rendered as.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        Envelope::error(self.code, self.message.clone(), self.errors.clone())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            errors,
        } = self;

        write!(f, "[{code}]: {message}")?;
        if !errors.is_empty() {
            write!(
                f,
                " ({})",
                errors.iter().format_with(", ", |(field, msg), f| {
                    f(&format_args!("{field}: {msg}"))
                }),
            )?;
        }
        write!(
            f,
            "{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }
        (self.status_code, Json(self.to_envelope())).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for MultipartRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeMap;

    use axum::{body, response::IntoResponse as _};
    use serde_json::json;

    use super::Error;

    #[tokio::test]
    async fn renders_envelope() {
        let resp = Error::validation(BTreeMap::from([
            ("title".to_owned(), "Title is required".to_owned()),
            ("price".to_owned(), "Price must not be negative".to_owned()),
        ]))
        .into_response();

        assert_eq!(resp.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            json!({
                "success": false,
                "code": "VALIDATION_ERROR",
                "message": "Validation failed",
                "errors": {
                    "price": "Price must not be negative",
                    "title": "Title is required",
                },
            }),
        );
    }

    #[test]
    fn displays_field_errors() {
        let err = Error::invalid_field("agentId", &"Agent does not exist");

        assert_eq!(
            err.to_string(),
            "[VALIDATION_ERROR]: Validation failed \
             (agentId: Agent does not exist)",
        );
    }

    #[test]
    fn internal_errors_are_server_errors() {
        let err = Error::internal(&"boom");

        assert_eq!(err.code, "SERVER_ERROR");
        assert!(err.status_code.is_server_error());
        assert!(err.errors.is_empty());
    }
}
