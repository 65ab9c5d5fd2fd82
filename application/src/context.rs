//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts};

use crate::{storage::Storage, Error, Service};

/// Context of a REST API request.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Media [`Storage`] instance.
    storage: Storage,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns media [`Storage`] instance of this [`Context`].
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let storage = parts
            .extensions
            .get::<Storage>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Storage` extension"))?;

        Ok(Self { service, storage })
    }
}
