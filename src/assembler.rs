use crate::ast::{IdlFile, Method, Record, ServiceDef, SkipKind, Skipped};
use crate::openapi::{
    json_content, Document, HttpVerb, Operation, RequestBody, Response, Schema, Tag,
};
use crate::resolver::{schema_ref, TypeMapper};
use log::debug;
use std::collections::BTreeMap;

const SUCCESS_STATUS: &str = "200";
const SUCCESS_DESCRIPTION: &str = "Successful Response";
const REQUEST_BODY_DESCRIPTION: &str = "Request Body";

/// Folds records into schemas and service methods into path operations.
#[derive(Debug)]
pub struct Assembler {
    mapper: TypeMapper,
    document: Document,
    skipped: Vec<Skipped>,
}

impl Assembler {
    pub fn new(document: Document, mapper: TypeMapper) -> Self {
        Self {
            mapper,
            document,
            skipped: Vec::new(),
        }
    }

    /// Adds every record, then every service, of `idl`.
    pub fn add_file(&mut self, idl: &IdlFile) {
        for record in &idl.records {
            self.add_record(record);
        }
        for service in &idl.services {
            self.add_service(service);
        }
    }

    /// A later record with the same name replaces the earlier schema.
    pub fn add_record(&mut self, record: &Record) {
        let mut schema = Schema::object();
        for field in &record.fields {
            schema
                .properties
                .insert(field.name.clone(), self.mapper.property(&field.field_type));
            if !field.optional {
                schema.required.push(field.name.clone());
            }
        }
        self.document
            .components
            .schemas
            .insert(record.name.clone(), schema);
    }

    pub fn add_service(&mut self, service: &ServiceDef) {
        if !self.document.tags.iter().any(|t| t.name == service.name) {
            self.document.tags.push(Tag {
                name: service.name.clone(),
            });
        }

        for method in &service.methods {
            self.add_method(&service.name, method);
        }
    }

    /// Binds `method` to its path and verb. A later binding of the same pair wins.
    fn add_method(&mut self, tag: &str, method: &Method) {
        if method.http_path.is_empty() || method.http_verb.is_empty() {
            self.skip(SkipKind::EmptyBinding, method);
            return;
        }
        let Ok(verb) = method.http_verb.parse::<HttpVerb>() else {
            self.skip(SkipKind::UnsupportedVerb, method);
            return;
        };

        let request_body = (!method.param_type.is_empty()).then(|| RequestBody {
            description: REQUEST_BODY_DESCRIPTION.to_string(),
            content: json_content(schema_ref(&method.param_type)),
            required: true,
        });
        let operation = Operation {
            summary: method.name.clone(),
            tags: vec![tag.to_string()],
            request_body,
            responses: BTreeMap::from([(
                SUCCESS_STATUS.to_string(),
                Response {
                    description: SUCCESS_DESCRIPTION.to_string(),
                    content: json_content(schema_ref(&method.return_type)),
                },
            )]),
        };

        let slot = self
            .document
            .paths
            .entry(method.http_path.clone())
            .or_default()
            .slot_mut(verb);
        if let Some(previous) = slot.replace(operation) {
            debug!(
                "{} {} rebound from `{}` to `{}`",
                verb, method.http_path, previous.summary, method.name
            );
        }
    }

    fn skip(&mut self, kind: SkipKind, method: &Method) {
        let text = format!(
            "{} (api.{}=\"{}\")",
            method.name, method.http_verb, method.http_path
        );
        let fragment = Skipped::new(kind, text, method.span.clone());
        debug!("{} at bytes {:?}", fragment, fragment.span);
        self.skipped.push(fragment);
    }

    pub fn finish(self) -> (Document, Vec<Skipped>) {
        debug!(
            "assembled {} schemas, {} paths, {} tags",
            self.document.components.schemas.len(),
            self.document.paths.len(),
            self.document.tags.len()
        );
        (self.document, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Field;
    use crate::openapi::{DataType, Format, Property};
    use crate::resolver::ListItems;

    fn field(id: i64, field_type: &str, name: &str, optional: bool) -> Field {
        Field {
            id,
            field_type: field_type.to_string(),
            name: name.to_string(),
            optional,
        }
    }

    fn method(name: &str, ret: &str, param: &str, verb: &str, path: &str) -> Method {
        Method {
            name: name.to_string(),
            return_type: ret.to_string(),
            param_type: param.to_string(),
            http_verb: verb.to_string(),
            http_path: path.to_string(),
            span: 0..0,
        }
    }

    fn assemble(idl: &IdlFile) -> (Document, Vec<Skipped>) {
        let mut assembler = Assembler::new(Document::default(), TypeMapper::default());
        assembler.add_file(idl);
        assembler.finish()
    }

    #[test]
    fn test_required_follows_declaration_order() {
        let idl = IdlFile {
            records: vec![Record {
                name: "User".to_string(),
                fields: vec![
                    field(3, "string", "zeta", false),
                    field(1, "i32", "alpha", true),
                    field(2, "bool", "mid", false),
                ],
            }],
            services: vec![],
        };
        let (doc, _) = assemble(&idl);
        let schema = &doc.schemas()["User"];
        assert_eq!(schema.required, vec!["zeta", "mid"]);
        assert_eq!(schema.properties.len(), 3);
        assert_eq!(
            schema.properties["alpha"],
            Property::Primitive {
                data_type: DataType::Integer,
                format: Some(Format::Int32),
            }
        );
    }

    #[test]
    fn test_duplicate_record_replaces_schema() {
        let idl = IdlFile {
            records: vec![
                Record {
                    name: "A".to_string(),
                    fields: vec![field(1, "i32", "old", false)],
                },
                Record {
                    name: "A".to_string(),
                    fields: vec![field(1, "i32", "new", false)],
                },
            ],
            services: vec![],
        };
        let (doc, _) = assemble(&idl);
        assert_eq!(doc.schemas().len(), 1);
        assert!(doc.schemas()["A"].properties.contains_key("new"));
    }

    #[test]
    fn test_tags_are_deduplicated_in_first_seen_order() {
        let idl = IdlFile {
            records: vec![],
            services: vec![
                ServiceDef {
                    name: "B".to_string(),
                    methods: vec![],
                },
                ServiceDef {
                    name: "A".to_string(),
                    methods: vec![],
                },
                ServiceDef {
                    name: "B".to_string(),
                    methods: vec![],
                },
            ],
        };
        let (doc, _) = assemble(&idl);
        assert_eq!(doc.tag_names().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_operation_shape() {
        let idl = IdlFile {
            records: vec![],
            services: vec![ServiceDef {
                name: "Users".to_string(),
                methods: vec![method("getUser", "User", "i32", "GET", "/user/{id}")],
            }],
        };
        let (doc, skipped) = assemble(&idl);
        assert!(skipped.is_empty());

        let op = doc.operation("/user/{id}", HttpVerb::Get).unwrap();
        assert_eq!(op.summary, "getUser");
        assert_eq!(op.tags, vec!["Users"]);
        let response = &op.responses["200"];
        assert_eq!(response.description, "Successful Response");
        assert_eq!(
            response.content["application/json"].schema,
            schema_ref("User")
        );

        // Parameter types are references even when they name a primitive.
        let body = op.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.content["application/json"].schema, schema_ref("i32"));
    }

    #[test]
    fn test_method_without_param_has_no_request_body() {
        let idl = IdlFile {
            records: vec![],
            services: vec![ServiceDef {
                name: "S".to_string(),
                methods: vec![method("list", "Page", "", "get", "/items")],
            }],
        };
        let (doc, _) = assemble(&idl);
        let op = doc.operation("/items", HttpVerb::Get).unwrap();
        assert!(op.request_body.is_none());
    }

    #[test]
    fn test_unsupported_and_empty_bindings_are_skipped() {
        let idl = IdlFile {
            records: vec![],
            services: vec![ServiceDef {
                name: "S".to_string(),
                methods: vec![
                    method("patchIt", "R", "P", "patch", "/x"),
                    method("noPath", "R", "P", "get", ""),
                    method("noVerb", "R", "P", "", "/y"),
                ],
            }],
        };
        let (doc, skipped) = assemble(&idl);
        assert!(doc.paths.is_empty());
        let kinds: Vec<SkipKind> = skipped.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SkipKind::UnsupportedVerb,
                SkipKind::EmptyBinding,
                SkipKind::EmptyBinding
            ]
        );
        // The service still contributes its tag.
        assert_eq!(doc.tag_names().collect::<Vec<_>>(), vec!["S"]);
    }

    #[test]
    fn test_later_binding_overwrites_earlier() {
        let idl = IdlFile {
            records: vec![],
            services: vec![
                ServiceDef {
                    name: "First".to_string(),
                    methods: vec![method("one", "R", "P", "post", "/same")],
                },
                ServiceDef {
                    name: "Second".to_string(),
                    methods: vec![
                        method("two", "R", "P", "POST", "/same"),
                        method("three", "R", "P", "delete", "/same"),
                    ],
                },
            ],
        };
        let (doc, _) = assemble(&idl);
        assert_eq!(doc.paths.len(), 1);
        let post = doc.operation("/same", HttpVerb::Post).unwrap();
        assert_eq!(post.summary, "two");
        assert_eq!(post.tags, vec!["Second"]);
        assert_eq!(
            doc.operation("/same", HttpVerb::Delete).unwrap().summary,
            "three"
        );
    }

    #[test]
    fn test_typed_list_items_option() {
        let idl = IdlFile {
            records: vec![Record {
                name: "Bag".to_string(),
                fields: vec![field(1, "list<double>", "values", false)],
            }],
            services: vec![],
        };
        let mut assembler = Assembler::new(Document::default(), TypeMapper::new(ListItems::Typed));
        assembler.add_file(&idl);
        let (doc, _) = assembler.finish();
        assert_eq!(
            doc.schemas()["Bag"].properties["values"],
            Property::Array {
                items: Box::new(Property::Primitive {
                    data_type: DataType::Number,
                    format: Some(Format::Double),
                })
            }
        );
    }
}
