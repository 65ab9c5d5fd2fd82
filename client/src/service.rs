//! [`PropertyService`] facade of the REST API.

use std::collections::HashMap;

use common::{wire, AreaUnit, Handler as _, Status};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smart_default::SmartDefault;

use crate::{
    agents,
    frontend::{Agent, Property},
    mapper::{self, CoercionPolicy, Mapper, MappingError},
    transport::{Form, Request, Transport, TransportError},
    validator::{self, FileRules},
    Details, Error, ErrorKind, File,
};

/// Root path segment of the property listing resources.
const ROOT: &str = "CreationProperty";

/// Path segment of the agent resources.
const AGENTS: &str = "agents";

/// [`PropertyService`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// [`CoercionPolicy`] of form input.
    pub coercion: CoercionPolicy,

    /// [`AreaUnit`] forms and listings use.
    pub area_unit: AreaUnit,

    /// [`FileRules`] of uploaded images.
    #[default(FileRules::images())]
    pub images: FileRules,

    /// [`FileRules`] of uploaded videos.
    #[default(FileRules::videos())]
    pub videos: FileRules,
}

/// Client of the property listing REST API.
///
/// Validates forms before sending them, maps them into wire requests, and
/// maps responses into frontend [`Property`] listings.
#[derive(Clone, Debug)]
pub struct PropertyService<T> {
    /// [`Transport`] performing the requests.
    transport: T,

    /// [`Mapper`] of forms and records.
    mapper: Mapper,

    /// [`FileRules`] of uploaded images.
    images: FileRules,

    /// [`FileRules`] of uploaded videos.
    videos: FileRules,
}

impl<T: Transport> PropertyService<T> {
    /// Creates a new [`PropertyService`] performing requests with the
    /// provided [`Transport`].
    #[must_use]
    pub fn new(transport: T, config: Config) -> Self {
        let Config {
            coercion,
            area_unit,
            images,
            videos,
        } = config;
        Self {
            transport,
            mapper: Mapper::new(coercion, area_unit),
            images,
            videos,
        }
    }

    /// Returns the [`Transport`] of this [`PropertyService`].
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the [`Mapper`] of this [`PropertyService`].
    #[must_use]
    pub const fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Creates a new property listing out of the provided form.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FormValidation`] if the form misses required fields.
    /// - [`ErrorKind::Validation`] if the form cannot be mapped.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn create(&self, form: &Value) -> Result<Property, Error> {
        validator::validate_create(form)?;
        let req = self.mapper.to_create_request(form).map_err(invalid)?;

        let body = self
            .send(Request::new(Method::POST, [ROOT]).json(json(&req)?))
            .await?;
        self.property(&body)
    }

    /// Creates a new property listing out of the provided form, uploading
    /// the provided media files along.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FormValidation`] if the form misses required fields.
    /// - [`ErrorKind::FileValidation`] if files violate [`FileRules`].
    /// - [`ErrorKind::Validation`] if the form cannot be mapped.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn create_with_media(
        &self,
        form: &Value,
        images: Vec<File>,
        videos: Vec<File>,
    ) -> Result<Property, Error> {
        validator::validate_create(form)?;
        self.validate_media(&images, &videos)?;
        let req = self.mapper.to_create_request(form).map_err(invalid)?;

        let form = media_form(&req, images, videos)?;
        let body = self
            .send(
                Request::new(Method::POST, [ROOT, "with-media"])
                    .multipart(form),
            )
            .await?;
        self.property(&body)
    }

    /// Updates an existing property listing with the provided form.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FormValidation`] if the form misses required fields.
    /// - [`ErrorKind::Validation`] if the form cannot be mapped, or has no
    ///   valid ID.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn update(&self, form: &Value) -> Result<Property, Error> {
        let req = self.update_request(form)?;

        let body = self
            .send(
                Request::new(Method::PUT, [ROOT, &req.id.to_string()])
                    .json(json(&req)?),
            )
            .await?;
        self.property(&body)
    }

    /// Updates an existing property listing with the provided form,
    /// uploading the provided media files along.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FormValidation`] if the form misses required fields.
    /// - [`ErrorKind::FileValidation`] if files violate [`FileRules`].
    /// - [`ErrorKind::Validation`] if the form cannot be mapped, or has no
    ///   valid ID.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn update_with_media(
        &self,
        form: &Value,
        images: Vec<File>,
        videos: Vec<File>,
    ) -> Result<Property, Error> {
        let req = self.update_request(form)?;
        self.validate_media(&images, &videos)?;

        let id = req.id.to_string();
        let form = media_form(&req, images, videos)?;
        let body = self
            .send(
                Request::new(Method::PUT, [ROOT, &id, "with-media"])
                    .multipart(form),
            )
            .await?;
        self.property(&body)
    }

    /// Returns the property listing with the provided `id`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if there is no such listing.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn get_by_id(&self, id: i64) -> Result<Property, Error> {
        let body = self
            .send(Request::new(Method::GET, [ROOT, &id.to_string()]))
            .await?;
        self.mapper
            .to_frontend(mapper::single(&body))
            .map_err(unexpected)?
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("Property #{id} does not exist"),
                )
            })
    }

    /// Returns all the property listings.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn get_all(&self) -> Result<Vec<Property>, Error> {
        self.list(Request::new(Method::GET, [ROOT])).await
    }

    /// Returns the property listings with the provided [`Status`].
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn get_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Property>, Error> {
        self.list(Request::new(Method::GET, [ROOT, "status", status.as_str()]))
            .await
    }

    /// Returns the property listings of the owner with the provided ID.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn get_by_owner(
        &self,
        owner_id: i64,
    ) -> Result<Vec<Property>, Error> {
        self.list(Request::new(
            Method::GET,
            [ROOT, "owner", &owner_id.to_string()],
        ))
        .await
    }

    /// Returns the property listings handled by the agent with the provided
    /// ID.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn get_by_agent(
        &self,
        agent_id: i64,
    ) -> Result<Vec<Property>, Error> {
        self.list(Request::new(
            Method::GET,
            [ROOT, "agent", &agent_id.to_string()],
        ))
        .await
    }

    /// Returns the property listings awaiting an approval.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn get_pending(&self) -> Result<Vec<Property>, Error> {
        self.list(Request::new(Method::GET, [ROOT, "pending"])).await
    }

    /// Approves the property listing with the provided `id`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Conflict`] if the listing cannot be approved.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn approve(&self, id: i64) -> Result<Property, Error> {
        let body = self
            .send(Request::new(
                Method::PATCH,
                [ROOT, &id.to_string(), "approve"],
            ))
            .await?;
        self.property(&body)
    }

    /// Rejects the property listing with the provided `id` for the provided
    /// `reason`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`] if the `reason` is blank. No request is
    ///   performed then.
    /// - [`ErrorKind::Conflict`] if the listing cannot be rejected.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn reject(
        &self,
        id: i64,
        reason: &str,
    ) -> Result<Property, Error> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::validation(
                "reason",
                "Rejection reason is required",
            ));
        }

        let patch = wire::RejectPatch {
            reason: reason.to_owned(),
        };
        let body = self
            .send(
                Request::new(Method::PATCH, [ROOT, &id.to_string(), "reject"])
                    .json(json(&patch)?),
            )
            .await?;
        self.property(&body)
    }

    /// Changes the [`Status`] of the property listing with the provided
    /// `id`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Validation`] if [`Status::Rejected`] is requested, which
    ///   is reachable via [`PropertyService::reject()`] only.
    /// - [`ErrorKind::Conflict`] if the [`Status`] is not reachable.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn set_status(
        &self,
        id: i64,
        status: Status,
    ) -> Result<Property, Error> {
        let body = self
            .send(
                Request::new(Method::PATCH, [ROOT, &id.to_string(), "status"])
                    .json(json(&wire::StatusPatch { status })?),
            )
            .await?;
        self.property(&body)
    }

    /// Reassigns the property listing with the provided `id` to the agent
    /// with the provided ID, or unassigns it if [`None`].
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn reassign_handler(
        &self,
        id: i64,
        agent_id: Option<i64>,
    ) -> Result<Property, Error> {
        let body = self
            .send(
                Request::new(Method::PATCH, [ROOT, &id.to_string(), "handler"])
                    .json(json(&wire::HandlerPatch { agent_id })?),
            )
            .await?;
        self.property(&body)
    }

    /// Deletes the property listing with the provided `id`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if there is no such listing.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        _ = self
            .send(Request::new(Method::DELETE, [ROOT, &id.to_string()]))
            .await?;
        Ok(())
    }

    /// Searches the property listings matching the provided free-text
    /// `term`.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn search(&self, term: &str) -> Result<Vec<Property>, Error> {
        self.list(
            Request::new(Method::GET, [ROOT, "search"]).query("term", term),
        )
        .await
    }

    /// Searches the property listings matching the provided
    /// [`wire::SearchCriteria`].
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn search_advanced(
        &self,
        criteria: &wire::SearchCriteria,
    ) -> Result<Vec<Property>, Error> {
        self.list(
            Request::new(Method::POST, [ROOT, "search", "advanced"])
                .json(json(criteria)?),
        )
        .await
    }

    /// Uploads the provided images, returning their URLs.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FileValidation`] if files violate [`FileRules`].
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn upload_images(
        &self,
        images: Vec<File>,
    ) -> Result<Vec<String>, Error> {
        validator::validate_files(&images, &self.images)?;
        self.upload("images", images).await
    }

    /// Uploads the provided videos, returning their URLs.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FileValidation`] if files violate [`FileRules`].
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn upload_videos(
        &self,
        videos: Vec<File>,
    ) -> Result<Vec<String>, Error> {
        validator::validate_files(&videos, &self.videos)?;
        self.upload("videos", videos).await
    }

    /// Deletes the image with the provided `url`.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn delete_image(&self, url: &str) -> Result<(), Error> {
        _ = self
            .send(Request::new(Method::DELETE, [ROOT, "images", url]))
            .await?;
        Ok(())
    }

    /// Deletes the video with the provided `url`.
    ///
    /// # Errors
    ///
    /// Any [`ErrorKind`] the request fails with.
    pub async fn delete_video(&self, url: &str) -> Result<(), Error> {
        _ = self
            .send(Request::new(Method::DELETE, [ROOT, "videos", url]))
            .await?;
        Ok(())
    }

    /// Returns the [`Agent`] with the provided `id`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if there is no such agent.
    /// - Any [`ErrorKind`] the request fails with.
    pub async fn get_agent(&self, id: i64) -> Result<Agent, Error> {
        let body = self
            .send(Request::new(Method::GET, [AGENTS, &id.to_string()]))
            .await?;
        let record = body.get("agent").cloned().unwrap_or(body);
        let record = serde_json::from_value::<wire::AgentRecord>(record)
            .map_err(|e| Error::unknown(format!("Malformed agent: {e}")))?;
        Ok(agent(record))
    }

    /// Returns the [`Agent`]s with the provided `ids`, fetching them
    /// concurrently.
    ///
    /// An [`Agent`] failing to be fetched is substituted with an
    /// [`Agent::placeholder()`].
    pub async fn get_agents(
        &self,
        ids: impl IntoIterator<Item = i64>,
    ) -> HashMap<i64, Agent> {
        agents::fetch_all(ids, |id| self.get_agent(id)).await
    }

    /// Fetches and attaches the [`Agent`]s handling the provided
    /// [`Property`] listings.
    pub async fn with_agents(&self, properties: &mut [Property]) {
        let agents = self.get_agents(agents::ids_of(properties)).await;
        agents::attach(properties, &agents);
    }

    /// Validates and maps the provided update form.
    fn update_request(
        &self,
        form: &Value,
    ) -> Result<wire::UpdateRequest, Error> {
        validator::validate_update(form)?;
        let req = self.mapper.to_update_request(form).map_err(invalid)?;
        if req.id == 0 {
            return Err(Error::validation("id", "ID must be an integer"));
        }
        Ok(req)
    }

    /// Validates the provided media files against the configured
    /// [`FileRules`].
    fn validate_media(
        &self,
        images: &[File],
        videos: &[File],
    ) -> Result<(), Error> {
        let errs = [
            validator::validate_files(images, &self.images),
            validator::validate_files(videos, &self.videos),
        ]
        .into_iter()
        .filter_map(Result::err)
        .flat_map(|e| match e.details {
            Details::Files(msgs) => msgs,
            Details::None | Details::Fields(_) => vec![],
        })
        .collect::<Vec<_>>();

        if errs.is_empty() {
            Ok(())
        } else {
            Err(Error::files(errs))
        }
    }

    /// Uploads the provided `files` of the provided media `kind`.
    async fn upload(
        &self,
        kind: &str,
        files: Vec<File>,
    ) -> Result<Vec<String>, Error> {
        let body = self
            .send(
                Request::new(Method::POST, [ROOT, "upload", kind])
                    .multipart(Form::default().files(kind, files)),
            )
            .await?;
        let urls = body
            .get("urls")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::unknown("Response carries no URLs"))?;
        Ok(urls
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect())
    }

    /// Performs the provided [`Request`] and maps the response into a list
    /// of [`Property`] listings.
    async fn list(&self, req: Request) -> Result<Vec<Property>, Error> {
        let body = self.send(req).await?;
        Ok(self.mapper.to_frontend_list(&body))
    }

    /// Maps the provided response body into a single [`Property`].
    fn property(&self, body: &Value) -> Result<Property, Error> {
        self.mapper
            .to_frontend(mapper::single(body))
            .map_err(unexpected)?
            .ok_or_else(|| Error::unknown("Response carries no property"))
    }

    /// Performs the provided [`Request`], normalizing its failures into an
    /// [`Error`].
    async fn send(&self, req: Request) -> Result<Value, Error> {
        let (method, path) = (req.method.clone(), req.path.join("/"));

        let resp = self.transport.execute(req).await.map_err(|e| {
            tracing::warn!("`{method} /{path}` failed: {e}");
            match e {
                TransportError::Malformed { message } => {
                    Error::unknown(message)
                }
                TransportError::Network { message } => {
                    Error::network(message)
                }
            }
        })?;

        let body = if resp.body.is_empty() {
            Some(Value::Null)
        } else {
            serde_json::from_slice::<Value>(&resp.body).ok()
        };
        if !(200..300).contains(&resp.status) {
            tracing::debug!("`{method} /{path}` responded {}", resp.status);
            return Err(Error::from_response(resp.status, body.as_ref()));
        }

        let body = body.ok_or_else(|| {
            Error::unknown(format!("`{method} /{path}` responded non-JSON"))
        })?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(ErrorKind::Unknown.default_message());
            return Err(Error {
                status: Some(resp.status),
                ..Error::unknown(message)
            });
        }
        Ok(body)
    }
}

/// Builds a multipart [`Form`] carrying the provided property data and
/// media files.
fn media_form(
    data: &impl Serialize,
    images: Vec<File>,
    videos: Vec<File>,
) -> Result<Form, Error> {
    let data = serde_json::to_string(data)
        .map_err(|e| Error::unknown(format!("Unserializable form: {e}")))?;
    Ok(Form::default()
        .text("propertyData", data)
        .files("images", images)
        .files("videos", videos))
}

/// Serializes the provided request body.
fn json(body: &impl Serialize) -> Result<Value, Error> {
    serde_json::to_value(body)
        .map_err(|e| Error::unknown(format!("Unserializable request: {e}")))
}

/// Converts a [`MappingError`] of a form into a [`ErrorKind::Validation`]
/// [`Error`].
fn invalid(e: MappingError) -> Error {
    match e.field() {
        Some(field) => Error::validation(field, e.to_string()),
        None => Error::new(ErrorKind::Validation, e.to_string()),
    }
}

/// Converts a [`MappingError`] of a response into a [`ErrorKind::Unknown`]
/// [`Error`].
fn unexpected(e: MappingError) -> Error {
    Error::unknown(format!("Malformed property: {e}"))
}

/// Converts the provided [`wire::AgentRecord`] into an [`Agent`].
fn agent(record: wire::AgentRecord) -> Agent {
    let wire::AgentRecord {
        id,
        first_name,
        last_name,
        email,
        phone,
        license_number,
        profile_picture_url,
    } = record;
    Agent {
        id,
        first_name,
        last_name,
        email,
        phone,
        license_number,
        profile_picture_url,
    }
}

#[cfg(test)]
mod spec {
    use common::{wire, Status};
    use serde_json::{json, Value};

    use reqwest::Url;

    use crate::{
        transport::{fake::Fake, HttpConfig},
        Details, ErrorKind, File, Http, PropertyService,
    };

    use super::Config;

    fn service() -> PropertyService<Fake> {
        PropertyService::new(Fake::default(), Config::default())
    }

    fn form() -> Value {
        json!({
            "title": "Seaside Villa",
            "description": "Four bedrooms by the sea",
            "type": "Villa",
            "status": "draft",
            "price": "12,500,000",
            "listedDate": "2024-03-01",
            "address": "1 Coast Rd",
            "city": "Lapu-Lapu City",
            "state": "Cebu",
            "zipCode": "6015",
            "latitude": 10.31,
            "bedrooms": 4,
            "bathrooms": 3.5,
            "kitchens": 1,
            "garages": 2,
            "areaSqm": 250,
            "propertyAge": 3,
            "floorNumber": 2,
            "amenities": ["Pool", "Garden"],
            "agentId": 1,
        })
    }

    #[tokio::test]
    async fn round_trips_created_fields() {
        let svc = service();

        let p = svc.create(&form()).await.unwrap();

        assert!(p.id > 0);
        assert!(!p.property_number.is_empty());
        assert_eq!(p.title, "Seaside Villa");
        assert_eq!(p.description, "Four bedrooms by the sea");
        assert_eq!(p.kind, "Villa");
        assert_eq!(p.status, Some(Status::Draft));
        assert_eq!(p.price, 12_500_000.0);
        assert!(p.listed_date.starts_with("2024-03-01"));
        assert_eq!(p.address, "1 Coast Rd");
        assert_eq!(p.city, "Lapu-Lapu City");
        assert_eq!(p.state, "Cebu");
        assert_eq!(p.zip_code, "6015");
        assert_eq!(p.country, "Philippines");
        assert_eq!(p.latitude, Some(10.31));
        assert_eq!(p.longitude, None);
        assert_eq!(p.bedrooms, 4);
        assert_eq!(p.bathrooms, 3.5);
        assert_eq!(p.kitchens, 1);
        assert_eq!(p.garages, 2);
        assert_eq!(p.area_label(), "250 sqm");
        assert_eq!(p.property_age, 3);
        assert_eq!(p.floor_number, 2);
        assert_eq!(p.amenities, ["Pool", "Garden"]);
        assert_eq!(p.agent_id, Some(1));
        assert_eq!(p.agent.unwrap().first_name, "Maria");
    }

    #[tokio::test]
    async fn validates_before_sending() {
        let svc = service();

        let err = svc.create(&json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::FormValidation);
        assert_eq!(err.fields().unwrap().len(), 7);

        let err = svc
            .update(&json!({"id": "abc", "title": "A"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.fields().unwrap().contains_key("id"));

        assert_eq!(svc.transport().requests(), 0);
    }

    #[tokio::test]
    async fn updates_fields() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;
        let mut form = form();
        form["id"] = json!(id.to_string());
        form["title"] = json!("Renovated Villa");
        form["amenities"] = json!("Pool, Gym");

        let p = svc.update(&form).await.unwrap();

        assert_eq!(p.id, id);
        assert_eq!(p.title, "Renovated Villa");
        assert_eq!(p.amenities, ["Pool", "Gym"]);
        assert_eq!(p.status, Some(Status::Draft));

        let criteria = wire::SearchCriteria {
            status: Some(Status::Draft),
            min_price: Some(1_000_000.0),
            ..wire::SearchCriteria::default()
        };
        let found = svc.search_advanced(&criteria).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Renovated Villa");
    }

    #[tokio::test]
    async fn approve_is_visible_to_get() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;
        _ = svc.set_status(id, Status::Pending).await.unwrap();

        let approved = svc.approve(id).await.unwrap();
        assert_eq!(approved.status, Some(Status::Approved));

        let p = svc.get_by_id(id).await.unwrap();
        assert_eq!(p.status, Some(Status::Approved));
    }

    #[tokio::test]
    async fn rejects_empty_reason_without_request() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;
        let sent = svc.transport().requests();

        let err = svc.reject(id, "  ").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(svc.transport().requests(), sent);
    }

    #[tokio::test]
    async fn rejection_keeps_reason() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;
        _ = svc.set_status(id, Status::Pending).await.unwrap();

        let p = svc.reject(id, "Blurry photos").await.unwrap();

        assert_eq!(p.status, Some(Status::Rejected));
        assert_eq!(p.rejection_reason.as_deref(), Some("Blurry photos"));
    }

    #[tokio::test]
    async fn rejection_is_reachable_only_with_reason() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;
        _ = svc.set_status(id, Status::Pending).await.unwrap();

        let err = svc.set_status(id, Status::Rejected).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.fields().unwrap().contains_key("reason"));

        let mut update = form();
        update["id"] = json!(id);
        update["status"] = json!("rejected");
        let err = svc.update(&update).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.fields().unwrap().contains_key("reason"));

        let p = svc.get_by_id(id).await.unwrap();
        assert_eq!(p.status, Some(Status::Pending));

        _ = svc.reject(id, "Blurry photos").await.unwrap();
        let p = svc.set_status(id, Status::Rejected).await.unwrap();
        assert_eq!(p.rejection_reason.as_deref(), Some("Blurry photos"));
    }

    #[tokio::test]
    async fn impossible_transition_conflicts() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;

        let err = svc.set_status(id, Status::Sold).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.status, Some(409));
    }

    #[tokio::test]
    async fn deleted_property_is_not_found() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;

        svc.delete(id).await.unwrap();
        let err = svc.get_by_id(id).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(svc.delete(id).await.unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn lists_by_criteria() {
        let svc = service();
        let mut cabin = form();
        cabin["title"] = json!("Mountain Cabin");
        cabin["ownerId"] = json!(5);
        _ = svc.create(&form()).await.unwrap();
        let id = svc.create(&cabin).await.unwrap().id;
        _ = svc.set_status(id, Status::Pending).await.unwrap();

        assert_eq!(svc.get_all().await.unwrap().len(), 2);
        let found = svc.get_pending().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Mountain Cabin");
        assert_eq!(svc.get_by_status(Status::Draft).await.unwrap().len(), 1);
        assert_eq!(svc.get_by_owner(5).await.unwrap().len(), 1);
        assert_eq!(svc.get_by_agent(1).await.unwrap().len(), 2);
        assert_eq!(svc.search("cabin").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reassigns_handler() {
        let svc = service();
        let id = svc.create(&form()).await.unwrap().id;

        let p = svc.reassign_handler(id, Some(2)).await.unwrap();
        assert_eq!(p.agent_id, Some(2));

        let p = svc.reassign_handler(id, None).await.unwrap();
        assert_eq!(p.agent_id, None);
        assert_eq!(p.agent, None);
    }

    #[tokio::test]
    async fn uploads_validated_files() {
        let svc = service();

        let urls = svc
            .upload_images(vec![File::new("a.png", "image/png", vec![1])])
            .await
            .unwrap();
        assert_eq!(urls, ["/media/images/a.png"]);
        svc.delete_image(&urls[0]).await.unwrap();

        let sent = svc.transport().requests();
        let err = svc
            .upload_videos(vec![File::new("a.png", "image/png", vec![1])])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileValidation);
        assert!(matches!(err.details, Details::Files(ref m) if m.len() == 1));
        assert_eq!(svc.transport().requests(), sent);
    }

    #[tokio::test]
    async fn creates_with_media() {
        let svc = service();

        let p = svc
            .create_with_media(
                &form(),
                vec![File::new("front.jpg", "image/jpeg", vec![1])],
                vec![File::new("tour.mp4", "video/mp4", vec![2])],
            )
            .await
            .unwrap();

        assert_eq!(p.main_image, "/media/images/front.jpg");
        assert_eq!(p.main_video, "/media/videos/tour.mp4");
        assert_eq!(p.title, "Seaside Villa");
    }

    #[tokio::test]
    async fn substitutes_failed_agents() {
        let svc = PropertyService::new(
            Fake::default().failing_agent(2),
            Config::default(),
        );

        let agents = svc.get_agents([1, 2, 1]).await;

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[&1].first_name, "Maria");
        assert_eq!(agents[&2].full_name(), "Unknown Agent");
        assert_eq!(
            svc.get_agent(2).await.unwrap_err().kind,
            ErrorKind::Server,
        );
    }

    #[tokio::test]
    async fn normalizes_network_failures() {
        let svc = PropertyService::new(Fake::offline(), Config::default());

        let err = svc.get_all().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn unsent_requests_are_not_network_failures() {
        let http = Http::new(HttpConfig {
            base_url: Url::parse("mailto:api@example.com").unwrap(),
            ..HttpConfig::default()
        })
        .unwrap();
        let svc = PropertyService::new(http, Config::default());

        let err = svc.get_all().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.status, None);
    }
}
