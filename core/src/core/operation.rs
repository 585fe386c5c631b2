// api_pack/src/core/operation.rs

//! The per-request `Operation` record threaded through every pipeline stage,
//! together with the closed `Method` and `ResourceType` enumerations it is keyed on.

use crate::error::{ApiPackError, ApiPackResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Raw request body handed to the `deserialize` stage.
/// An empty map stands for "no body".
pub type Payload = Map<String, Value>;

/// HTTP verb of the operation. Parsed case-insensitively, from strings and from serde input alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Method {
  #[default]
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
    }
  }

  /// GET and DELETE never carry a request body.
  pub fn is_bodiless(&self) -> bool {
    matches!(self, Method::Get | Method::Delete)
  }

  /// POST and PUT may arrive without a body, in which case deserialization is skipped.
  pub fn allows_empty_body(&self) -> bool {
    matches!(self, Method::Post | Method::Put)
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Method {
  type Err = ApiPackError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "GET" => Ok(Method::Get),
      "POST" => Ok(Method::Post),
      "PUT" => Ok(Method::Put),
      "PATCH" => Ok(Method::Patch),
      "DELETE" => Ok(Method::Delete),
      _ => Err(ApiPackError::InvalidMethod(s.to_string())),
    }
  }
}

impl TryFrom<String> for Method {
  type Error = ApiPackError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

/// Shape of the addressed resource. Parsed case-insensitively, from strings and from serde input alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ResourceType {
  Collection,
  #[default]
  Item,
  Custom,
}

impl ResourceType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceType::Collection => "COLLECTION",
      ResourceType::Item => "ITEM",
      ResourceType::Custom => "CUSTOM",
    }
  }
}

impl fmt::Display for ResourceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ResourceType {
  type Err = ApiPackError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "COLLECTION" => Ok(ResourceType::Collection),
      "ITEM" => Ok(ResourceType::Item),
      "CUSTOM" => Ok(ResourceType::Custom),
      _ => Err(ApiPackError::InvalidResourceType(s.to_string())),
    }
  }
}

impl TryFrom<String> for ResourceType {
  type Error = ApiPackError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

/// Side channel filled by collaborators while the operation moves through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationContext {
  /// Error details keyed by error type, in the order they were reported.
  #[serde(default)]
  pub errors: HashMap<String, Vec<Value>>,
}

/// The mutable record one pipeline run owns.
///
/// The core only ever reads `method`, `resource_type` and `data`. `attributes`
/// carries whatever collaborators need (identifiers, filters, ...) and is never
/// inspected by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
  pub method: Method,
  pub resource_type: ResourceType,
  /// Payload produced by retrieval/deserialization. `None` until a stage sets it.
  pub data: Option<Value>,
  #[serde(default)]
  pub context: OperationContext,
  #[serde(default)]
  pub attributes: Map<String, Value>,
}

impl Operation {
  pub fn new(method: Method, resource_type: ResourceType) -> Self {
    Self {
      method,
      resource_type,
      ..Default::default()
    }
  }

  /// Builds an operation from transport-level strings, e.g. `("post", "Item")`.
  pub fn parse(method: &str, resource_type: &str) -> ApiPackResult<Self> {
    Ok(Self::new(method.parse()?, resource_type.parse()?))
  }

  pub fn with_data(mut self, data: impl Into<Value>) -> Self {
    self.data = Some(data.into());
    self
  }

  pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }

  pub fn attribute(&self, key: &str) -> Option<&Value> {
    self.attributes.get(key)
  }

  /// Whether `data` holds something a stage should act on.
  ///
  /// `None`, `null`, `false`, numeric zero and `""` count as empty. Arrays and
  /// objects always count as data, even when empty.
  pub fn has_data(&self) -> bool {
    match &self.data {
      None | Some(Value::Null) => false,
      Some(Value::Bool(b)) => *b,
      Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
      Some(Value::String(s)) => !s.is_empty(),
      Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
  }

  /// Error details recorded under `kind`, if any.
  pub fn errors(&self, kind: &str) -> Option<&[Value]> {
    self.context.errors.get(kind).map(Vec::as_slice)
  }

  pub fn push_error(&mut self, kind: impl Into<String>, detail: impl Into<Value>) {
    self.context.errors.entry(kind.into()).or_default().push(detail.into());
  }

  pub fn has_errors(&self) -> bool {
    self.context.errors.values().any(|v| !v.is_empty())
  }
}
