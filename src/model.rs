// Copyright 2022 Cognite AS
//! The shapes callers hand to the client: models, actions and routing inputs.
use std::collections::BTreeMap;
use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

/// A domain entity that can be sent to and fetched from the API.
///
/// `TYPE_NAME` is the key the [`crate::endpoint::Endpoint`] maps to a URL
/// segment.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use transporter::Model;
///
/// #[derive(Debug, Deserialize, Serialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// impl Model for User {
///     const TYPE_NAME: &'static str = "User";
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned {
    const TYPE_NAME: &'static str;
}

/// Collections are routed like their element type.
impl<T: Model> Model for Vec<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
}

/// An integer-backed sub-resource selector for POST requests. The raw value
/// is appended to the resolved segment as its last path component.
pub trait Action {
    fn raw_value(&self) -> i32;
}

impl Action for i32 {
    fn raw_value(&self) -> i32 {
        *self
    }
}

/// Values substituted, in order, into the placeholders of a segment template.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathVars {
    vars: Vec<String>,
}

impl PathVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(mut self, value: impl Display) -> Self {
        self.vars.push(value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.vars
    }
}

impl<D: Display> FromIterator<D> for PathVars {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Query string parameters, already rendered to strings.
///
/// Keys are unique; inserting an existing key replaces its value. Rendering:
/// strings verbatim, booleans as `true`/`false`, numbers in decimal, unit
/// enum variants by their serde name. `null` values are left out, nested
/// arrays and objects become compact JSON.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a value that serializes to a JSON object, such as a struct or
    /// a map, into parameters.
    pub fn from_serialize<Q: Serialize + ?Sized>(query: &Q) -> Result<Self, Error> {
        let value = serde_json::to_value(query).map_err(|e| Error::InvalidQuery(e.to_string()))?;
        let map = match value {
            Value::Object(map) => map,
            other => return Err(Error::InvalidQuery(format!("expected a map, got {other}"))),
        };
        let params = map
            .into_iter()
            .filter_map(|(key, value)| render_value(value).map(|value| (key, value)))
            .collect();
        Ok(Self { params })
    }

    pub fn insert<V: Serialize + ?Sized>(&mut self, key: &str, value: &V) -> Result<(), Error> {
        let value = serde_json::to_value(value).map_err(|e| Error::InvalidQuery(e.to_string()))?;
        match render_value(value) {
            Some(rendered) => self.params.insert(key.into(), rendered),
            None => self.params.remove(key),
        };
        Ok(())
    }

    pub fn param<V: Serialize + ?Sized>(mut self, key: &str, value: &V) -> Result<Self, Error> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn render_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// Everything besides the model type that decides where a request goes.
#[derive(Clone, Debug, Default)]
pub struct Route {
    pub(crate) controller: Option<String>,
    pub(crate) path_vars: PathVars,
    pub(crate) query: QueryParams,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route through a differently named API resource instead of the model's
    /// own type name.
    pub fn controller(mut self, name: impl Into<String>) -> Self {
        self.controller = Some(name.into());
        self
    }

    pub fn path_var(mut self, value: impl Display) -> Self {
        self.path_vars = self.path_vars.var(value);
        self
    }

    pub fn path_vars(mut self, vars: PathVars) -> Self {
        self.path_vars = vars;
        self
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }
}
