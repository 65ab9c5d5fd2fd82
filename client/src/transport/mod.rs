//! [`Transport`] of REST API requests.

mod http;
#[cfg(test)]
pub(crate) mod fake;

use common::Handler;
use derive_more::{Display, Error};
use serde_json::Value;

use crate::File;

pub use self::http::{Config as HttpConfig, Http};

/// Request to the REST API.
#[derive(Clone, Debug)]
pub struct Request {
    /// HTTP method of this [`Request`].
    pub method: ::http::Method,

    /// Path segments relative to the API root, not percent-encoded.
    pub path: Vec<String>,

    /// Query parameters.
    pub query: Vec<(String, String)>,

    /// [`Body`] of this [`Request`].
    pub body: Body,
}

impl Request {
    /// Creates a new [`Request`] without any [`Body`].
    #[must_use]
    pub fn new<S: ToString>(
        method: ::http::Method,
        path: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            method,
            path: path.into_iter().map(|s| s.to_string()).collect(),
            query: vec![],
            body: Body::Empty,
        }
    }

    /// Adds the provided query parameter to this [`Request`].
    #[must_use]
    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_owned(), value.into()));
        self
    }

    /// Sets the provided JSON `body` to this [`Request`].
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Sets the provided [`Form`] body to this [`Request`].
    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

/// Body of a [`Request`].
#[derive(Clone, Debug, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,

    /// JSON body.
    Json(Value),

    /// `multipart/form-data` body.
    Multipart(Form),
}

/// `multipart/form-data` body of a [`Request`].
#[derive(Clone, Debug, Default)]
pub struct Form {
    /// Text fields.
    pub texts: Vec<(String, String)>,

    /// File fields.
    pub files: Vec<(String, File)>,
}

impl Form {
    /// Adds a text field to this [`Form`].
    #[must_use]
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.texts.push((name.to_owned(), value.into()));
        self
    }

    /// Adds file fields with the same `name` to this [`Form`].
    #[must_use]
    pub fn files(
        mut self,
        name: &str,
        files: impl IntoIterator<Item = File>,
    ) -> Self {
        self.files
            .extend(files.into_iter().map(|f| (name.to_owned(), f)));
        self
    }
}

/// Response of the REST API.
#[derive(Clone, Debug)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,

    /// Raw body.
    pub body: Vec<u8>,
}

/// Error of a [`Request`] which received no [`Response`].
#[derive(Clone, Debug, Display, Error)]
pub enum TransportError {
    /// [`Request`] cannot be encoded, so nothing has been sent.
    #[display("malformed request: {message}")]
    Malformed {
        /// Description of the failure.
        message: String,
    },

    /// [`Request`] has been sent, but no [`Response`] has arrived.
    #[display("{message}")]
    Network {
        /// Description of the failure.
        message: String,
    },
}

impl TransportError {
    /// Creates a new [`TransportError::Malformed`] with the provided
    /// description.
    #[must_use]
    pub fn malformed(message: impl ToString) -> Self {
        Self::Malformed {
            message: message.to_string(),
        }
    }

    /// Creates a new [`TransportError::Network`] with the provided
    /// description.
    #[must_use]
    pub fn network(message: impl ToString) -> Self {
        Self::Network {
            message: message.to_string(),
        }
    }
}

/// [`Handler`] performing [`Request`]s to the REST API.
pub trait Transport:
    Handler<Request, Ok = Response, Err = TransportError>
{
}

impl<T> Transport for T where
    T: Handler<Request, Ok = Response, Err = TransportError>
{
}
