// REST object model
//
// A `RestObject` is a short-lived value built for one logical operation
// (create / read / update / delete / exists) and dropped afterwards. It
// owns the resolved options, the assigned id and the last fetched document,
// and turns HTTP statuses into the outcomes the reconcilers depend on:
// 404 on read is `ReadOutcome::Absent`, 404 on delete is success, every
// other non-2xx is `Error::Api`.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{ApiClient, RawResponse};
use crate::error::Error;
use crate::options::{ObjectOptions, Operation, ReadSearch, value_at, value_to_string};

/// Where an object is in its single-operation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Options built, no request sent yet.
    Unresolved,
    /// Request in flight.
    Pending,
    /// Response parsed.
    Resolved,
    Failed,
}

/// Result of a read: the object, or the sentinel for "does not exist".
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Found(Map<String, Value>),
    Absent,
}

impl ReadOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_document(self) -> Option<Map<String, Value>> {
        match self {
            Self::Found(doc) => Some(doc),
            Self::Absent => None,
        }
    }
}

/// One remote resource instance, bound to a client for one operation.
pub struct RestObject<'a> {
    client: &'a ApiClient,
    options: ObjectOptions,
    id: Option<String>,
    state: ObjectState,
    document: Map<String, Value>,
    create_response: Option<String>,
}

impl<'a> RestObject<'a> {
    pub fn new(client: &'a ApiClient, options: ObjectOptions) -> Self {
        let id = options.resolve_id();
        debug!(path = %options.path, id = ?id, "constructed rest object");
        Self {
            client,
            options,
            id,
            state: ObjectState::Unresolved,
            document: Map::new(),
            create_response: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn options(&self) -> &ObjectOptions {
        &self.options
    }

    /// Last document fetched from (or accepted by) the server.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Raw body of the create response, for create-only data.
    pub fn create_response(&self) -> Option<&str> {
        self.create_response.as_deref()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Create the object from `payload` and resolve its id.
    ///
    /// A pre-assigned id is kept; otherwise the id attribute of the response
    /// supplies it. Any non-2xx (404 included) is [`Error::Api`].
    pub async fn create(&mut self, payload: Map<String, Value>) -> Result<(), Error> {
        self.state = ObjectState::Pending;
        let result = self.do_create(payload).await;
        self.settle(result)
    }

    /// Fetch the object. A 404 is [`ReadOutcome::Absent`], not an error.
    pub async fn read(&mut self) -> Result<ReadOutcome, Error> {
        self.state = ObjectState::Pending;
        let result = match self.options.read_search.clone() {
            Some(search) => self.do_search(&search).await,
            None => self.do_read().await,
        };
        self.settle(result)
    }

    /// Send `payload` as the new state of the object.
    ///
    /// With copy keys configured, the object is read first and each copy key
    /// in the payload is overwritten with the value just read.
    pub async fn update(&mut self, payload: Map<String, Value>) -> Result<(), Error> {
        self.state = ObjectState::Pending;
        let result = self.do_update(payload).await;
        self.settle(result)
    }

    /// Delete the object. A 404 counts as success.
    pub async fn delete(&mut self) -> Result<(), Error> {
        self.state = ObjectState::Pending;
        let result = self.do_delete().await;
        self.settle(result)
    }

    /// Whether the object exists remotely.
    ///
    /// Absent objects and empty searches report `false`; every other
    /// failure propagates.
    pub async fn exists(&mut self) -> Result<bool, Error> {
        match self.read().await {
            Ok(outcome) => Ok(outcome.is_found()),
            Err(Error::NotFound { message }) => {
                debug!(%message, "search matched nothing, reporting absent");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn settle<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        self.state = if result.is_ok() {
            ObjectState::Resolved
        } else {
            ObjectState::Failed
        };
        result
    }

    async fn send(
        &self,
        op: Operation,
        path: &str,
        body: Option<&str>,
    ) -> Result<RawResponse, Error> {
        self.client
            .send(op.as_str(), self.options.method(op), path, body)
            .await
    }

    fn require_id(&self, op: Operation) -> Result<&str, Error> {
        self.id.as_deref().ok_or_else(|| Error::Validation {
            field: "id".into(),
            reason: format!("cannot {} an object without an id", op.as_str()),
        })
    }

    async fn do_create(&mut self, payload: Map<String, Value>) -> Result<(), Error> {
        let path = self
            .options
            .path_for(Operation::Create, self.id.as_deref())?;
        let body = encode(&payload)?;

        let resp = self.send(Operation::Create, &path, Some(&body)).await?;
        if !resp.is_success() {
            return Err(resp.into_api_error());
        }

        self.document = if resp.body.trim().is_empty() {
            payload
        } else {
            parse_object(&resp.body)?
        };

        let returned_id =
            value_at(&self.document, self.options.id_attribute()).map(value_to_string);
        if let Some(returned) = returned_id {
            if let Some(assigned) = self.id.as_deref() {
                if assigned != returned {
                    warn!(
                        assigned,
                        returned = %returned,
                        "create response carries a different id, keeping the assigned one"
                    );
                }
            } else {
                self.id = Some(returned);
            }
        } else if self.id.is_none() {
            return Err(Error::Deserialization {
                message: format!(
                    "create response has no '{}' attribute to take the id from",
                    self.options.id_attribute()
                ),
                body: resp.body,
            });
        }

        self.create_response = Some(resp.body);
        Ok(())
    }

    async fn do_read(&mut self) -> Result<ReadOutcome, Error> {
        let id = self.require_id(Operation::Read)?;
        let path = self.options.path_for(Operation::Read, Some(id))?;

        let resp = self.send(Operation::Read, &path, None).await?;
        if resp.status == reqwest::StatusCode::NOT_FOUND {
            debug!(%path, "object is absent");
            self.document.clear();
            return Ok(ReadOutcome::Absent);
        }
        if !resp.is_success() {
            return Err(resp.into_api_error());
        }

        self.document = parse_object(&resp.body)?;
        Ok(ReadOutcome::Found(self.document.clone()))
    }

    async fn do_search(&mut self, search: &ReadSearch) -> Result<ReadOutcome, Error> {
        let path = self.options.search_path(search);

        let resp = self.send(Operation::Read, &path, None).await?;
        if !resp.is_success() {
            return Err(resp.into_api_error());
        }

        let parsed: Value = serde_json::from_str(&resp.body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: resp.body.clone(),
        })?;

        let entries = match (&search.results_key, &parsed) {
            (Some(key), Value::Object(doc)) => value_at(doc, key).and_then(Value::as_array),
            (None, Value::Array(items)) => Some(items),
            _ => None,
        }
        .ok_or_else(|| Error::Deserialization {
            message: format!(
                "search response has no result array{}",
                search
                    .results_key
                    .as_ref()
                    .map(|k| format!(" under '{k}'"))
                    .unwrap_or_default()
            ),
            body: resp.body.clone(),
        })?;

        let mut matches = entries
            .iter()
            .filter_map(Value::as_object)
            .filter(|entry| search.matches(entry));

        let (Some(found), None) = (matches.next(), matches.next()) else {
            let count = entries
                .iter()
                .filter_map(Value::as_object)
                .filter(|entry| search.matches(entry))
                .count();
            return Err(Error::NotFound {
                message: format!(
                    "search {:?} on {path} matched {count} objects, expected exactly one",
                    search.filters
                ),
            });
        };

        if let Some(found_id) = value_at(found, self.options.id_attribute()).map(value_to_string) {
            self.id = Some(found_id);
        }
        self.document = found.clone();
        Ok(ReadOutcome::Found(self.document.clone()))
    }

    async fn do_update(&mut self, mut payload: Map<String, Value>) -> Result<(), Error> {
        if !self.options.copy_keys.is_empty() {
            let current = match self.read().await? {
                ReadOutcome::Found(doc) => doc,
                ReadOutcome::Absent => {
                    return Err(Error::NotFound {
                        message: format!(
                            "object {} vanished before its copy keys could be read",
                            self.id.as_deref().unwrap_or("<unknown>")
                        ),
                    });
                }
            };
            for key in &self.options.copy_keys {
                if let Some(value) = current.get(key) {
                    debug!(key, "copying field from server state");
                    payload.insert(key.clone(), value.clone());
                }
            }
        }

        let id = self.require_id(Operation::Update)?;
        let path = self.options.path_for(Operation::Update, Some(id))?;
        let body = encode(&payload)?;

        let resp = self.send(Operation::Update, &path, Some(&body)).await?;
        if !resp.is_success() {
            return Err(resp.into_api_error());
        }

        self.document = match parse_object(&resp.body) {
            Ok(doc) => doc,
            Err(_) => {
                debug!("update response is not a JSON object, keeping the sent payload");
                payload
            }
        };
        Ok(())
    }

    async fn do_delete(&mut self) -> Result<(), Error> {
        let id = self.require_id(Operation::Destroy)?;
        let path = self.options.path_for(Operation::Destroy, Some(id))?;

        let resp = self.send(Operation::Destroy, &path, None).await?;
        if resp.status == reqwest::StatusCode::NOT_FOUND {
            debug!(%path, "object already absent");
        } else if !resp.is_success() {
            return Err(resp.into_api_error());
        }

        self.document.clear();
        Ok(())
    }
}

impl fmt::Display for RestObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} path={} state={:?} fields={}",
            self.id.as_deref().unwrap_or("<none>"),
            self.options.path,
            self.state,
            self.document.len()
        )
    }
}

fn encode(payload: &Map<String, Value>) -> Result<String, Error> {
    serde_json::to_string(payload).map_err(|e| Error::Deserialization {
        message: format!("failed to encode payload: {e}"),
        body: String::new(),
    })
}

fn parse_object(body: &str) -> Result<Map<String, Value>, Error> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(other) => Err(Error::Deserialization {
            message: format!("expected a JSON object, got {}", kind(&other)),
            body: body.to_owned(),
        }),
        Err(e) => Err(Error::Deserialization {
            message: e.to_string(),
            body: body.to_owned(),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
