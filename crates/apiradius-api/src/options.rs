//! Per-resource-kind request configuration for [`RestObject`](crate::RestObject).

use reqwest::Method;
use serde_json::{Map, Value};

use crate::error::Error;

/// Placeholder replaced by the object id in path templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Field used to find the id in a response when none is configured.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// The four verbs an object supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Destroy,
}

impl Operation {
    pub fn default_method(self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Read => Method::GET,
            Self::Update => Method::PUT,
            Self::Destroy => Method::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

/// Collection read that selects one entry by field values, for APIs
/// without a usable direct `{path}/{id}` endpoint.
#[derive(Debug, Clone, Default)]
pub struct ReadSearch {
    /// Field/value pairs an entry must all match. Keys may be `/`-separated paths.
    pub filters: Vec<(String, String)>,
    /// Key holding the result array, when the collection is wrapped in an object.
    pub results_key: Option<String>,
    /// Collection path. Defaults to the object's base path.
    pub path: Option<String>,
    /// Query string for the collection request. Defaults to the object's query string.
    pub query_string: Option<String>,
}

impl ReadSearch {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filters: vec![(key.into(), value.into())],
            ..Self::default()
        }
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn with_results_key(mut self, key: impl Into<String>) -> Self {
        self.results_key = Some(key.into());
        self
    }

    /// Whether `entry` carries every filter value.
    pub(crate) fn matches(&self, entry: &Map<String, Value>) -> bool {
        self.filters.iter().all(|(key, expected)| {
            value_at(entry, key).is_some_and(|v| value_to_string(v) == *expected)
        })
    }
}

/// Paths, methods and id handling for one resource kind.
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    /// Base (collection) path, e.g. `/operator/acme/profile`.
    pub path: String,
    pub create_path: Option<String>,
    pub read_path: Option<String>,
    pub update_path: Option<String>,
    pub destroy_path: Option<String>,
    pub create_method: Option<Method>,
    pub read_method: Option<Method>,
    pub update_method: Option<Method>,
    pub destroy_method: Option<Method>,
    /// Response field holding the object id. `/`-separated for nested keys.
    pub id_attribute: Option<String>,
    /// Appended to every request path.
    pub query_string: Option<String>,
    pub read_search: Option<ReadSearch>,
    /// Fields re-read from the server and echoed back on update.
    pub copy_keys: Vec<String>,
    /// Explicit id supplied by the caller. Wins over any other source.
    pub id: Option<String>,
    /// Id already known from earlier operations.
    pub known_id: Option<String>,
}

impl ObjectOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_known_id(mut self, id: Option<String>) -> Self {
        self.known_id = id;
        self
    }

    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = Some(attribute.into());
        self
    }

    pub fn with_query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = Some(query.into());
        self
    }

    pub fn with_read_search(mut self, search: ReadSearch) -> Self {
        self.read_search = Some(search);
        self
    }

    pub fn with_copy_keys(mut self, keys: Vec<String>) -> Self {
        self.copy_keys = keys;
        self
    }

    pub fn with_path(mut self, op: Operation, path: impl Into<String>) -> Self {
        let path = Some(path.into());
        match op {
            Operation::Create => self.create_path = path,
            Operation::Read => self.read_path = path,
            Operation::Update => self.update_path = path,
            Operation::Destroy => self.destroy_path = path,
        }
        self
    }

    pub fn with_method(mut self, op: Operation, method: Method) -> Self {
        let method = Some(method);
        match op {
            Operation::Create => self.create_method = method,
            Operation::Read => self.read_method = method,
            Operation::Update => self.update_method = method,
            Operation::Destroy => self.destroy_method = method,
        }
        self
    }

    /// Explicit id, then known id.
    pub fn resolve_id(&self) -> Option<String> {
        self.id.clone().or_else(|| self.known_id.clone())
    }

    pub fn id_attribute(&self) -> &str {
        self.id_attribute.as_deref().unwrap_or(DEFAULT_ID_ATTRIBUTE)
    }

    pub fn method(&self, op: Operation) -> Method {
        let configured = match op {
            Operation::Create => &self.create_method,
            Operation::Read => &self.read_method,
            Operation::Update => &self.update_method,
            Operation::Destroy => &self.destroy_method,
        };
        configured.clone().unwrap_or_else(|| op.default_method())
    }

    /// Request path for `op`, with `{id}` substituted and the query string appended.
    pub fn path_for(&self, op: Operation, id: Option<&str>) -> Result<String, Error> {
        let template = match op {
            Operation::Create => Some(
                self.create_path
                    .clone()
                    .unwrap_or_else(|| self.path.clone()),
            ),
            Operation::Read => self.read_path.clone(),
            Operation::Update => self.update_path.clone(),
            Operation::Destroy => self.destroy_path.clone(),
        }
        .unwrap_or_else(|| format!("{}/{ID_PLACEHOLDER}", self.path.trim_end_matches('/')));

        let path = if template.contains(ID_PLACEHOLDER) {
            let id = id.ok_or_else(|| {
                Error::validation(
                    "id",
                    format!("{} path {template} needs an object id", op.as_str()),
                )
            })?;
            template.replace(ID_PLACEHOLDER, id)
        } else {
            template
        };

        Ok(append_query(path, self.query_string.as_deref()))
    }

    /// Collection path and query for a search read.
    pub(crate) fn search_path(&self, search: &ReadSearch) -> String {
        let path = search.path.clone().unwrap_or_else(|| self.path.clone());
        let query = search
            .query_string
            .as_deref()
            .or(self.query_string.as_deref());
        append_query(path, query)
    }
}

fn append_query(path: String, query: Option<&str>) -> String {
    match query.map(|q| q.trim_start_matches('?')) {
        Some(q) if !q.is_empty() => {
            let sep = if path.contains('?') { '&' } else { '?' };
            format!("{path}{sep}{q}")
        }
        _ => path,
    }
}

/// Look up a `/`-separated key path in a JSON object.
pub fn value_at<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('/');
    let first = doc.get(parts.next()?)?;
    parts.try_fold(first, |current, part| current.as_object()?.get(part))
}

/// String form of a JSON scalar, as used for ids and search filters.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
