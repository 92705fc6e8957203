use crate::openapi::{DataType, Format, Property, SchemaRef};

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// How the element type of a `list<...>` field is rendered.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ListItems {
    /// Items always reference a schema named after the inner token, even for primitives:
    /// `list<i32>` yields `{"$ref": "#/components/schemas/i32"}`.
    #[default]
    Reference,
    /// Items are mapped like any other field type, so `list<i32>` yields
    /// `{"type": "integer", "format": "int32"}`.
    Typed,
}

/// A raw IDL type token, classified.
#[derive(Debug, PartialEq, Clone)]
pub enum MappedType<'a> {
    Primitive {
        data_type: DataType,
        format: Option<Format>,
    },
    /// A named schema. Whether it exists is not checked.
    Reference(&'a str),
    /// One level of `list<...>`. The inner token is kept verbatim.
    List(&'a str),
}

/// Classifies a type token. Primitive names match exactly and case-sensitively.
pub fn map_type(token: &str) -> MappedType<'_> {
    if let Some(inner) = token
        .strip_prefix("list<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return MappedType::List(inner);
    }

    match primitive(token) {
        Some((data_type, format)) => MappedType::Primitive { data_type, format },
        None => MappedType::Reference(token),
    }
}

fn primitive(token: &str) -> Option<(DataType, Option<Format>)> {
    match token {
        "i32" => Some((DataType::Integer, Some(Format::Int32))),
        "i64" => Some((DataType::Integer, Some(Format::Int64))),
        "string" => Some((DataType::String, None)),
        "bool" => Some((DataType::Boolean, None)),
        "double" => Some((DataType::Number, Some(Format::Double))),
        _ => None,
    }
}

/// `#/components/schemas/<type_name>`, without looking at what `type_name` is.
pub fn schema_ref(type_name: &str) -> SchemaRef {
    SchemaRef {
        reference: format!("{SCHEMA_REF_PREFIX}{type_name}"),
    }
}

/// Turns field type tokens into schema properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper {
    list_items: ListItems,
}

impl TypeMapper {
    pub fn new(list_items: ListItems) -> Self {
        Self { list_items }
    }

    pub fn property(&self, token: &str) -> Property {
        match map_type(token) {
            MappedType::Primitive { data_type, format } => {
                Property::Primitive { data_type, format }
            }
            MappedType::Reference(name) => Property::Reference(schema_ref(name)),
            MappedType::List(inner) => {
                let items = match self.list_items {
                    ListItems::Reference => Property::Reference(schema_ref(inner)),
                    ListItems::Typed => self.element(inner),
                };
                Property::Array {
                    items: Box::new(items),
                }
            }
        }
    }

    // Typed list elements never nest a second array.
    fn element(&self, token: &str) -> Property {
        match primitive(token) {
            Some((data_type, format)) => Property::Primitive { data_type, format },
            None => Property::Reference(schema_ref(token)),
        }
    }
}
