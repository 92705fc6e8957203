use std::fmt::Display;
use std::ops::Range;

/// Everything recognized in one IDL source file.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct IdlFile {
    pub records: Vec<Record>,
    pub services: Vec<ServiceDef>,
}

/// A `struct Name { ... }` block and the fields recognized inside it.
#[derive(Debug, PartialEq, Clone)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Field {
    /// Declaration tag. Zero when the digit run does not fit in an `i64`.
    pub id: i64,
    /// Raw type token, e.g. `i32`, `User` or `list<User>`.
    pub field_type: String,
    pub name: String,
    pub optional: bool,
}

/// A `service Name { ... }` block.
#[derive(Debug, PartialEq, Clone)]
pub struct ServiceDef {
    pub name: String,
    pub methods: Vec<Method>,
}

/// A service method with its `(api.<verb>="<path>")` binding.
#[derive(Debug, PartialEq, Clone)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    /// Type of the sole parameter, empty if none was recognized.
    pub param_type: String,
    /// Verb key exactly as written, e.g. `get` or `POST`.
    pub http_verb: String,
    pub http_path: String,
    /// Byte range of the declaration in the source.
    pub span: Range<usize>,
}

// --- Diagnostics for dropped fragments ---

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SkipKind {
    /// A struct or service header whose body is empty or never closes.
    Block,
    /// Text inside a struct body that is not a recognizable field.
    Field,
    /// Text inside a service body that is not a recognizable annotated method.
    Method,
    /// A parsed method whose verb is not one of get/post/put/delete.
    UnsupportedVerb,
    /// A parsed method with an empty verb or path.
    EmptyBinding,
}

impl Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipKind::Block => write!(f, "block"),
            SkipKind::Field => write!(f, "field"),
            SkipKind::Method => write!(f, "method"),
            SkipKind::UnsupportedVerb => write!(f, "unsupported HTTP verb"),
            SkipKind::EmptyBinding => write!(f, "empty HTTP binding"),
        }
    }
}

/// A fragment of source text that was dropped during conversion.
#[derive(Debug, PartialEq, Clone)]
pub struct Skipped {
    pub kind: SkipKind,
    /// Trimmed text of the fragment.
    pub text: String,
    /// Byte range of the fragment in the converted source text.
    pub span: Range<usize>,
}

impl Skipped {
    pub fn new(kind: SkipKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped {} `{}`", self.kind, self.text)
    }
}
