//! [`reqwest`]-based [`Transport`] implementation.
//!
//! [`Transport`]: super::Transport

use std::time::Duration;

use common::Handler;
use reqwest::{multipart, Url};
use smart_default::SmartDefault;

use super::{Body, Request, Response, TransportError};

/// [`Http`] transport configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Root URL of the REST API.
    #[default(Url::parse("http://localhost:8080").expect("valid URL"))]
    pub base_url: Url,

    /// Timeout of a whole request.
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,

    /// Bearer token to authorize requests with, if any.
    pub token: Option<String>,

    /// `User-Agent` header value.
    #[default(
        concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
            .to_owned()
    )]
    pub user_agent: String,
}

/// [`Transport`] performing [`Request`]s over HTTP.
///
/// [`Transport`]: super::Transport
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying [`reqwest::Client`].
    client: reqwest::Client,

    /// Root URL of the REST API.
    base_url: Url,

    /// Bearer token to authorize requests with.
    token: Option<String>,
}

impl Http {
    /// Creates a new [`Http`] transport with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying [`reqwest::Client`] cannot be built.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let Config {
            base_url,
            timeout,
            token,
            user_agent,
        } = config;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Resolves the provided path `segments` against the root URL,
    /// percent-encoding each of them.
    fn url(&self, segments: &[String]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        _ = url
            .path_segments_mut()
            .map_err(|()| {
                TransportError::malformed(format!(
                    "`{}` cannot be a base URL",
                    self.base_url,
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Handler<Request> for Http {
    type Ok = Response;
    type Err = TransportError;

    async fn execute(&self, req: Request) -> Result<Self::Ok, Self::Err> {
        let Request {
            method,
            path,
            query,
            body,
        } = req;

        let url = self.url(&path)?;
        tracing::debug!("{method} {url}");

        let mut builder = self.client.request(method, url).query(&query);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            Body::Empty => builder,
            Body::Json(json) => builder.json(&json),
            Body::Multipart(form) => {
                let mut multipart = multipart::Form::new();
                for (name, value) in form.texts {
                    multipart = multipart.text(name, value);
                }
                for (name, file) in form.files {
                    let mut part = multipart::Part::bytes(file.bytes)
                        .file_name(file.name);
                    if let Some(mime) = &file.content_type {
                        part = part
                            .mime_str(mime)
                            .map_err(TransportError::malformed)?;
                    }
                    multipart = multipart.part(name, part);
                }
                builder.multipart(multipart)
            }
        };

        let resp = builder.send().await.map_err(TransportError::network)?;
        let status = resp.status().as_u16();
        let body =
            resp.bytes().await.map_err(TransportError::network)?.to_vec();

        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod spec {
    use common::Handler as _;
    use ::http::Method;
    use reqwest::Url;

    use crate::{
        transport::{Form, Request, TransportError},
        File,
    };

    use super::{Config, Http};

    #[test]
    fn encodes_path_segments() {
        let http = Http::new(Config {
            base_url: Url::parse("http://api.example.com/v1/").unwrap(),
            ..Config::default()
        })
        .unwrap();

        let url = http
            .url(&[
                "CreationProperty".into(),
                "images".into(),
                "/media/images/a b.png".into(),
            ])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://api.example.com/v1/CreationProperty/images/\
             %2Fmedia%2Fimages%2Fa%20b.png",
        );
    }

    #[tokio::test]
    async fn unencodable_requests_are_malformed() {
        let opaque = Http::new(Config {
            base_url: Url::parse("mailto:api@example.com").unwrap(),
            ..Config::default()
        })
        .unwrap();
        let err = opaque
            .execute(Request::new(Method::GET, ["CreationProperty"]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed { .. }), "{err}");

        let http = Http::new(Config {
            base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            ..Config::default()
        })
        .unwrap();
        let file = File {
            name: "a.png".into(),
            content_type: Some("not a mime".into()),
            bytes: vec![1],
        };
        let err = http
            .execute(
                Request::new(Method::POST, ["upload"])
                    .multipart(Form::default().files("images", [file])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed { .. }), "{err}");
    }
}
