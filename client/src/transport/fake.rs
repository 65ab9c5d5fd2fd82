//! In-memory [`Transport`] emulating the REST API.
//!
//! [`Transport`]: super::Transport

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashSet},
    mem,
};

use common::{wire, Handler, Status};
use http::Method;
use serde::Serialize;
use serde_json::Value;

use super::{Body, Request, Response, TransportError};

/// Emulated persisted state.
#[derive(Debug, Default)]
struct State {
    /// Stored property records.
    properties: BTreeMap<i64, wire::PropertyRecord>,

    /// Last assigned ID.
    last_id: i64,
}

/// In-memory [`Transport`] emulating the REST API.
///
/// [`Transport`]: super::Transport
#[derive(Debug, Default)]
pub(crate) struct Fake {
    /// Emulated persisted state.
    state: RefCell<State>,

    /// Number of performed requests.
    requests: Cell<usize>,

    /// IDs of agents whose lookup fails.
    failing_agents: HashSet<i64>,

    /// Indicator whether every request fails with a network error.
    offline: bool,
}

impl Fake {
    /// Creates a [`Fake`] failing every request with a network error.
    pub(crate) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Makes the lookup of the agent with the provided `id` fail.
    pub(crate) fn failing_agent(mut self, id: i64) -> Self {
        _ = self.failing_agents.insert(id);
        self
    }

    /// Returns the number of requests performed so far.
    pub(crate) fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Routes the provided [`Request`].
    fn route(&self, req: Request) -> Response {
        let Request {
            method,
            path,
            query,
            body,
        } = req;
        let path = path.iter().map(String::as_str).collect::<Vec<_>>();

        match (method, path.as_slice()) {
            (Method::GET, ["agents"]) => ok(&wire::Envelope {
                success: true,
                agents: Some(vec![agent(1), agent(2)]),
                ..wire::Envelope::default()
            }),
            (Method::GET, ["agents", a]) => match id(a) {
                Some(a) if self.failing_agents.contains(&a) => {
                    failure(500, "SERVER_ERROR")
                }
                Some(a @ (1 | 2)) => ok(&wire::Envelope {
                    success: true,
                    agent: Some(agent(a)),
                    ..wire::Envelope::default()
                }),
                Some(_) | None => failure(404, "NOT_FOUND_ERROR"),
            },
            (Method::POST, ["CreationProperty"]) => {
                let Body::Json(json) = body else {
                    return failure(400, "VALIDATION_ERROR");
                };
                match serde_json::from_value(json) {
                    Ok(req) => self.insert(req, vec![], vec![]),
                    Err(_) => failure(400, "VALIDATION_ERROR"),
                }
            }
            (Method::POST, ["CreationProperty", "with-media"]) => {
                let Body::Multipart(form) = body else {
                    return failure(400, "VALIDATION_ERROR");
                };
                let data = form
                    .texts
                    .iter()
                    .find(|(n, _)| n == "propertyData")
                    .and_then(|(_, v)| serde_json::from_str(v).ok());
                let urls = |kind: &str| {
                    form.files
                        .iter()
                        .filter(|(n, _)| n == kind)
                        .map(|(_, f)| format!("/media/{kind}/{}", f.name))
                        .collect::<Vec<_>>()
                };
                match data {
                    Some(req) => {
                        self.insert(req, urls("images"), urls("videos"))
                    }
                    None => failure(422, "VALIDATION_ERROR"),
                }
            }
            (Method::POST, ["CreationProperty", "upload", kind]) => {
                let Body::Multipart(form) = body else {
                    return failure(400, "VALIDATION_ERROR");
                };
                ok(&wire::Envelope {
                    success: true,
                    urls: Some(
                        form.files
                            .iter()
                            .map(|(_, f)| format!("/media/{kind}/{}", f.name))
                            .collect(),
                    ),
                    ..wire::Envelope::default()
                })
            }
            (
                Method::DELETE,
                ["CreationProperty", "images" | "videos", url],
            ) => {
                if url.starts_with("/media/") {
                    ok(&wire::Envelope::ok("Media deleted"))
                } else {
                    failure(404, "NOT_FOUND_ERROR")
                }
            }
            (Method::GET, ["CreationProperty"]) => self.select(|_| true),
            (Method::GET, ["CreationProperty", "pending"]) => {
                self.select(|p| p.status == Some(Status::Pending))
            }
            (Method::GET, ["CreationProperty", "status", s]) => {
                self.select(|p| p.status.is_some_and(|st| st.as_str() == *s))
            }
            (Method::GET, ["CreationProperty", "owner", o]) => {
                self.select(|p| p.owner_id == id(o))
            }
            (Method::GET, ["CreationProperty", "agent", a]) => {
                self.select(|p| p.agent_id == id(a))
            }
            (Method::GET, ["CreationProperty", "search"]) => {
                let term = query
                    .iter()
                    .find(|(n, _)| n == "term")
                    .map(|(_, t)| t.to_lowercase())
                    .unwrap_or_default();
                self.select(|p| p.title.to_lowercase().contains(&term))
            }
            (Method::POST, ["CreationProperty", "search", "advanced"]) => {
                let criteria = match body {
                    Body::Json(json) => serde_json::from_value::<
                        wire::SearchCriteria,
                    >(json)
                    .unwrap_or_default(),
                    Body::Empty | Body::Multipart(_) => {
                        wire::SearchCriteria::default()
                    }
                };
                self.select(|p| {
                    criteria.status.is_none_or(|s| p.status == Some(s))
                        && criteria.min_price.is_none_or(|m| p.price >= m)
                        && criteria.agent_id.is_none_or(|a| {
                            p.agent_id == Some(a)
                        })
                })
            }
            (Method::GET, ["CreationProperty", p]) => {
                match id(p).and_then(|p| {
                    self.state.borrow().properties.get(&p).cloned()
                }) {
                    Some(p) => ok(&wire::Envelope::property(p)),
                    None => failure(404, "NOT_FOUND_ERROR"),
                }
            }
            (Method::PUT, ["CreationProperty", p]) => {
                let (Some(p), Body::Json(json)) = (id(p), body) else {
                    return failure(400, "VALIDATION_ERROR");
                };
                match serde_json::from_value::<wire::UpdateRequest>(json) {
                    Ok(req) => self.update(p, req),
                    Err(_) => failure(400, "VALIDATION_ERROR"),
                }
            }
            (Method::DELETE, ["CreationProperty", p]) => {
                let removed = id(p).and_then(|p| {
                    self.state.borrow_mut().properties.remove(&p)
                });
                match removed {
                    Some(_) => ok(&wire::Envelope::ok("Property deleted")),
                    None => failure(404, "NOT_FOUND_ERROR"),
                }
            }
            (Method::PATCH, ["CreationProperty", p, action]) => {
                let Some(p) = id(p) else {
                    return failure(400, "VALIDATION_ERROR");
                };
                let json = match body {
                    Body::Json(json) => json,
                    Body::Empty | Body::Multipart(_) => Value::Null,
                };
                self.patch(p, action, &json)
            }
            _ => failure(404, "NOT_FOUND_ERROR"),
        }
    }

    /// Stores a new property record out of the provided request.
    fn insert(
        &self,
        req: wire::CreateRequest,
        images: Vec<String>,
        videos: Vec<String>,
    ) -> Response {
        let mut state = self.state.borrow_mut();
        state.last_id += 1;
        let id = state.last_id;

        let status = req.status.unwrap_or(Status::Draft);
        if !status.is_initial() {
            return failure(422, "VALIDATION_ERROR");
        }
        let now = req.listed_date.clone();
        let record = wire::PropertyRecord {
            id,
            property_number: Some(format!("PROP-{id:06}")),
            status: Some(status),
            agent: req.agent_id.and_then(known_agent),
            property_images: (1..)
                .zip(images)
                .map(|(n, image_url)| wire::ImageRecord {
                    id: n,
                    property_id: id,
                    image_url,
                    created_at: now.clone(),
                })
                .collect(),
            property_videos: (1..)
                .zip(videos)
                .map(|(n, video_url)| wire::VideoRecord {
                    id: n,
                    property_id: id,
                    video_url,
                    ..wire::VideoRecord::default()
                })
                .collect(),
            created_at: now.clone(),
            updated_at: now,
            ..echo(req)
        };
        _ = state.properties.insert(id, record.clone());

        Response {
            status: 201,
            body: encode(&wire::Envelope::property(record)),
        }
    }

    /// Replaces the fields of the property with the provided `id`.
    fn update(&self, id: i64, req: wire::UpdateRequest) -> Response {
        let mut state = self.state.borrow_mut();
        let Some(existing) = state.properties.get_mut(&id) else {
            return failure(404, "NOT_FOUND_ERROR");
        };
        if req.id != 0 && req.id != id {
            return failure(422, "VALIDATION_ERROR");
        }
        let current = existing.status.unwrap_or(Status::Draft);
        let status = match req.fields.status.map(|s| change(current, s)) {
            None => current,
            Some(Ok(status)) => status,
            Some(Err(resp)) => return resp,
        };
        let rejection_reason = if status == current {
            existing.rejection_reason.take()
        } else {
            None
        };

        let fields = echo(req.fields);
        let updated = wire::PropertyRecord {
            id,
            property_number: existing.property_number.take(),
            status: Some(status),
            rejection_reason,
            agent: fields.agent_id.and_then(known_agent),
            property_images: mem::take(&mut existing.property_images),
            property_videos: mem::take(&mut existing.property_videos),
            created_at: mem::take(&mut existing.created_at),
            updated_at: fields.listed_date.clone(),
            ..fields
        };
        *existing = updated.clone();
        ok(&wire::Envelope::property(updated))
    }

    /// Applies the provided patch `action` to the property with the
    /// provided `id`.
    fn patch(&self, id: i64, action: &str, json: &Value) -> Response {
        let mut state = self.state.borrow_mut();
        let Some(p) = state.properties.get_mut(&id) else {
            return failure(404, "NOT_FOUND_ERROR");
        };

        let requested = match action {
            "approve" => Some(Status::Approved),
            "reject" => Some(Status::Rejected),
            "status" => json
                .get("status")
                .and_then(|s| serde_json::from_value(s.clone()).ok()),
            "handler" => {
                p.agent_id = json.get("agentId").and_then(Value::as_i64);
                p.agent = p.agent_id.and_then(known_agent);
                return ok(&wire::Envelope::property(p.clone()));
            }
            _ => return failure(404, "NOT_FOUND_ERROR"),
        };
        let Some(requested) = requested else {
            return failure(422, "VALIDATION_ERROR");
        };

        let current = p.status.unwrap_or(Status::Draft);
        let changed = if action == "reject" {
            current
                .transition(requested)
                .map_err(|_| failure(409, "CONFLICT_ERROR"))
        } else {
            change(current, requested)
        };
        match changed {
            Ok(status) => {
                if status != current || action == "reject" {
                    p.rejection_reason = (status == Status::Rejected)
                        .then(|| {
                            json.get("reason")?.as_str().map(str::to_owned)
                        })
                        .flatten();
                }
                p.status = Some(status);
                ok(&wire::Envelope::property(p.clone()))
            }
            Err(resp) => resp,
        }
    }

    /// Responds with the property records satisfying the provided
    /// predicate.
    fn select(&self, pred: impl Fn(&wire::PropertyRecord) -> bool) -> Response {
        let state = self.state.borrow();
        ok(&wire::Envelope::properties(
            state.properties.values().filter(|p| pred(p)).cloned().collect(),
        ))
    }
}

impl Handler<Request> for Fake {
    type Ok = Response;
    type Err = TransportError;

    async fn execute(&self, req: Request) -> Result<Self::Ok, Self::Err> {
        self.requests.set(self.requests.get() + 1);
        if self.offline {
            return Err(TransportError::network("connection refused"));
        }
        Ok(self.route(req))
    }
}

/// Echoes the provided request as a property record.
fn echo(req: wire::CreateRequest) -> wire::PropertyRecord {
    let wire::CreateRequest {
        title,
        description,
        kind,
        status,
        price,
        listed_date,
        address,
        city,
        state,
        zip_code,
        country,
        latitude,
        longitude,
        bedrooms,
        bathrooms,
        kitchens,
        garages,
        area_sqm,
        property_age,
        floor_number,
        amenities,
        agent_id,
        owner_id,
    } = req;
    wire::PropertyRecord {
        title,
        description,
        kind,
        status,
        price,
        listed_date,
        address,
        city,
        state,
        zip_code,
        country,
        latitude,
        longitude,
        bedrooms,
        bathrooms,
        kitchens,
        garages,
        area_sqm,
        property_age,
        floor_number,
        amenities,
        agent_id,
        owner_id,
        ..wire::PropertyRecord::default()
    }
}

/// Parses the provided path segment as an ID.
fn id(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

/// Returns the agent record with the provided `id`, if such agent is known.
fn known_agent(id: i64) -> Option<wire::AgentRecord> {
    (1..=2).contains(&id).then(|| agent(id))
}

/// Returns the agent record with the provided `id`.
fn agent(id: i64) -> wire::AgentRecord {
    let (first_name, last_name) = match id {
        1 => ("Maria", "Santos"),
        _ => ("Jose", "Reyes"),
    };
    wire::AgentRecord {
        id,
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        ..wire::AgentRecord::default()
    }
}

/// Responds with `200 OK` and the provided body.
fn ok(body: &impl Serialize) -> Response {
    Response {
        status: 200,
        body: encode(body),
    }
}

/// Changes the `current` status to the `requested` one, unless it's a
/// rejection without a reason or is not reachable.
fn change(current: Status, requested: Status) -> Result<Status, Response> {
    if requested == Status::Rejected && current != Status::Rejected {
        return Err(Response {
            status: 422,
            body: encode(&wire::Envelope::error(
                "VALIDATION_ERROR",
                "Validation failed",
                BTreeMap::from([(
                    "reason".to_owned(),
                    "Rejecting a listing requires a reason".to_owned(),
                )]),
            )),
        });
    }
    current
        .transition(requested)
        .map_err(|_| failure(409, "CONFLICT_ERROR"))
}

/// Responds with a failed [`wire::Envelope`].
fn failure(status: u16, code: &str) -> Response {
    Response {
        status,
        body: encode(&wire::Envelope::error(
            code,
            format!("Request failed with {code}"),
            BTreeMap::new(),
        )),
    }
}

/// Encodes the provided body as JSON.
fn encode(body: &impl Serialize) -> Vec<u8> {
    serde_json::to_vec(body).unwrap()
}
