use crate::assembler::Assembler;
use crate::ast::{IdlFile, Skipped};
use crate::error::{ConvertError, UnrecognizedError};
use crate::lexer::BlockNesting;
use crate::openapi::{Document, DEFAULT_TITLE, DEFAULT_VERSION};
use crate::parser::Parser;
use crate::resolver::{ListItems, TypeMapper};
use crate::serialization::{render, OutputFormat};
use serde::{Serialize, Serializer};

/// Knobs for a conversion. The defaults reproduce the plain best-effort behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub nesting: BlockNesting,
    pub list_items: ListItems,
    pub title: String,
    pub version: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            nesting: BlockNesting::default(),
            list_items: ListItems::default(),
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn with_nesting(mut self, nesting: BlockNesting) -> Self {
        self.nesting = nesting;
        self
    }

    #[must_use]
    pub fn with_list_items(mut self, list_items: ListItems) -> Self {
        self.list_items = list_items;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// The outcome of converting one IDL source.
///
/// Holds the finished document, the intermediate model it was built from, and every fragment
/// that was dropped along the way. Serializing the result serializes the document.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub document: Document,
    pub idl: IdlFile,
    pub skipped: Vec<Skipped>,
}

impl Serialize for ConversionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.document.serialize(serializer)
    }
}

impl ConversionResult {
    /// Serializes the document into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `ConvertError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConvertError> {
        render(&self.document, OutputFormat::Json)
    }

    /// Serializes the document into a YAML string.
    ///
    /// # Errors
    /// Returns a `ConvertError` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConvertError> {
        render(&self.document, OutputFormat::Yaml)
    }

    /// True when nothing in the source was dropped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Converts IDL source text into an OpenAPI document with default options.
///
/// This never fails: unrecognized fields, methods and bindings are dropped and listed in
/// [`ConversionResult::skipped`]. An empty source yields an empty document.
#[must_use]
pub fn convert(source: &str) -> ConversionResult {
    convert_with_options(source, &ConvertOptions::default())
}

/// Converts IDL source text into an OpenAPI document.
#[must_use]
pub fn convert_with_options(source: &str, options: &ConvertOptions) -> ConversionResult {
    let mut parser = Parser::new(source).with_nesting(options.nesting);
    let idl = parser.parse_file();
    let mut skipped = parser.into_skipped();

    let mut assembler = Assembler::new(
        Document::new(options.title.clone(), options.version.clone()),
        TypeMapper::new(options.list_items),
    );
    assembler.add_file(&idl);
    let (document, dropped) = assembler.finish();
    skipped.extend(dropped);
    skipped.sort_by_key(|s| s.span.start);

    ConversionResult {
        document,
        idl,
        skipped,
    }
}

/// Converts like [`convert_with_options`] but rejects the source if anything was dropped.
///
/// # Arguments
///
/// * `source` - The IDL source code as a string.
/// * `file_name` - The name shown in the diagnostic.
///
/// # Errors
///
/// Returns a `ConvertError::Unrecognized` pointing at the first dropped fragment.
pub fn convert_strict(
    source: &str,
    file_name: &str,
    options: &ConvertOptions,
) -> Result<ConversionResult, ConvertError> {
    let result = convert_with_options(source, options);
    match result.skipped.first() {
        Some(first) => Err(UnrecognizedError::from_skipped(first, file_name, source).into()),
        None => Ok(result),
    }
}
