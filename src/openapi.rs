//! The OpenAPI 3.0 object graph produced by the assembler.
//!
//! Maps are `BTreeMap`s so serialized output is deterministic. Members that are absent in the
//! model (an operation without a request body, a schema without required fields) are omitted
//! from the serialized form rather than written as `null` or `[]`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const DEFAULT_TITLE: &str = "Generated API";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub paths: BTreeMap<String, PathItem>,
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Document {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
            },
            paths: BTreeMap::new(),
            components: Components::default(),
            tags: Vec::new(),
        }
    }

    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.components.schemas
    }

    /// Looks up the operation bound to `verb` on `path`.
    pub fn operation(&self, path: &str, verb: HttpVerb) -> Option<&Operation> {
        self.paths.get(path)?.operation(verb)
    }

    /// Tag names in first-seen order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_VERSION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
}

/// An object schema built from one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    /// Names of non-optional fields in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    pub fn object() -> Self {
        Self {
            data_type: DataType::Object,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Int32,
    Int64,
    Double,
}

/// `{"$ref": "#/components/schemas/<Name>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Primitive {
        data_type: DataType,
        format: Option<Format>,
    },
    Reference(SchemaRef),
    Array {
        items: Box<Property>,
    },
}

impl Serialize for Property {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Property::Primitive { data_type, format } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", data_type)?;
                if let Some(format) = format {
                    map.serialize_entry("format", format)?;
                }
                map.end()
            }
            Property::Reference(schema_ref) => schema_ref.serialize(serializer),
            Property::Array { items } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", &DataType::Array)?;
                map.serialize_entry("items", items)?;
                map.end()
            }
        }
    }
}

/// The HTTP verbs a path item has slots for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for HttpVerb {
    type Err = String;

    /// Case-insensitive: `GET`, `Get` and `get` are all [`HttpVerb::Get`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpVerb::Get),
            "post" => Ok(HttpVerb::Post),
            "put" => Ok(HttpVerb::Put),
            "delete" => Ok(HttpVerb::Delete),
            other => Err(format!("unsupported HTTP verb `{other}`")),
        }
    }
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, verb: HttpVerb) -> Option<&Operation> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, verb: HttpVerb) -> &mut Option<Operation> {
        match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Delete => &mut self.delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub content: BTreeMap<String, MediaType>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

/// `{"application/json": {"schema": <schema>}}`
pub fn json_content(schema: SchemaRef) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}
