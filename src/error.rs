use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

use crate::ast::{SkipKind, Skipped};

/// Failures around the conversion core: file I/O, serialization and strict-mode rejections.
///
/// [`crate::convert`] itself never fails.
#[derive(Error, Debug, Diagnostic)]
pub enum ConvertError {
    #[error("Failed to read or write `{}`", path.display())]
    #[diagnostic(
        code(io::file),
        help("Check that the path exists and is accessible.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize document as JSON")]
    #[diagnostic(code(serialization::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize document as YAML")]
    #[diagnostic(code(serialization::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Unrecognized(#[from] UnrecognizedError),
}

/// A fragment of the IDL source that the converter would otherwise drop silently.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum UnrecognizedError {
    #[error("Unterminated or empty block")]
    #[diagnostic(
        code(idl::unrecognized_block),
        help("A struct or service body must be non-empty and end with `}}`.")
    )]
    Block {
        #[source_code]
        src: NamedSource<String>,
        #[label("this block is dropped")]
        span: SourceSpan,
    },

    #[error("Unrecognized field declaration")]
    #[diagnostic(
        code(idl::unrecognized_field),
        help("Fields must look like `<id>: [optional ]<type> <name>`.")
    )]
    Field {
        #[source_code]
        src: NamedSource<String>,
        #[label("this is not a field")]
        span: SourceSpan,
    },

    #[error("Unrecognized method declaration")]
    #[diagnostic(
        code(idl::unrecognized_method),
        help(
            "Methods take exactly one parameter and end with an annotation such as `(api.get=\"/path\")`."
        )
    )]
    Method {
        #[source_code]
        src: NamedSource<String>,
        #[label("this is not an annotated method")]
        span: SourceSpan,
    },

    #[error("Unsupported HTTP verb")]
    #[diagnostic(
        code(idl::unsupported_verb),
        help("Only get, post, put and delete are mapped to operations.")
    )]
    UnsupportedVerb {
        #[source_code]
        src: NamedSource<String>,
        #[label("bound to a verb other than get, post, put or delete")]
        span: SourceSpan,
    },

    #[error("Empty HTTP binding")]
    #[diagnostic(
        code(idl::empty_binding),
        help("Both the verb and the path of the annotation must be non-empty.")
    )]
    EmptyBinding {
        #[source_code]
        src: NamedSource<String>,
        #[label("no verb or path here")]
        span: SourceSpan,
    },
}

impl UnrecognizedError {
    /// Builds the diagnostic for a dropped fragment of `source`.
    pub fn from_skipped(skipped: &Skipped, file_name: &str, source: &str) -> Self {
        let src = NamedSource::new(file_name, source.to_string());
        let span: SourceSpan = (skipped.span.start, skipped.span.len()).into();
        match skipped.kind {
            SkipKind::Block => UnrecognizedError::Block { src, span },
            SkipKind::Field => UnrecognizedError::Field { src, span },
            SkipKind::Method => UnrecognizedError::Method { src, span },
            SkipKind::UnsupportedVerb => UnrecognizedError::UnsupportedVerb { src, span },
            SkipKind::EmptyBinding => UnrecognizedError::EmptyBinding { src, span },
        }
    }
}
