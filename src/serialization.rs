use crate::error::ConvertError;
use crate::openapi::Document;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format `{other}` (expected json or yaml)")),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Renders the document as indented JSON or as YAML.
///
/// # Errors
/// Returns a `ConvertError` if the serializer fails.
pub fn render(document: &Document, format: OutputFormat) -> Result<String, ConvertError> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)?,
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
    };
    Ok(text)
}

/// Renders the document and writes it to `path`, replacing any existing file.
///
/// # Errors
/// Returns a `ConvertError` if rendering or writing fails.
pub fn write_to_path(
    document: &Document,
    format: OutputFormat,
    path: &Path,
) -> Result<(), ConvertError> {
    let mut text = render(document, format)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    std::fs::write(path, text).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })
}
