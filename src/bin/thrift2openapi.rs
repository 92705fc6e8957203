//! Command-line interface for thrift-openapi.
//!
//! Usage:
//!   thrift2openapi `<file>` [--format json|yaml] [--output `<path>`] [--strict]

use clap::Parser;
use log::warn;
use miette::Report;
use std::path::PathBuf;
use std::process::ExitCode;
use thrift_openapi::lexer::BlockNesting;
use thrift_openapi::resolver::ListItems;
use thrift_openapi::serialization::{render, write_to_path, OutputFormat};
use thrift_openapi::utils::get_line_and_column;
use thrift_openapi::{convert_strict, convert_with_options, ConvertError, ConvertOptions};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "thrift2openapi")]
#[command(version, about = "Generate an OpenAPI 3.0 document from a Thrift IDL file", long_about = None)]
struct Cli {
    /// Thrift IDL file to convert
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Match block braces by depth so nested blocks do not truncate their parent
    #[arg(long)]
    balanced: bool,

    /// Map `list<primitive>` items to the primitive type instead of a schema reference
    #[arg(long)]
    typed_lists: bool,

    /// Fail on the first field, method or binding that would be dropped
    #[arg(long)]
    strict: bool,

    /// Title recorded in the document info
    #[arg(long)]
    title: Option<String>,

    /// Version recorded in the document info
    #[arg(long, value_name = "VERSION")]
    api_version: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    log_verbosity: u8,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::default()
            .with_nesting(if self.balanced {
                BlockNesting::Balanced
            } else {
                BlockNesting::Flat
            })
            .with_list_items(if self.typed_lists {
                ListItems::Typed
            } else {
                ListItems::Reference
            });
        if let Some(title) = &self.title {
            options = options.with_title(title.clone());
        }
        if let Some(version) = &self.api_version {
            options = options.with_version(version.clone());
        }
        options
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,thrift_openapi=debug".to_string(),
            _ => "debug,thrift_openapi=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run(cli: &Cli) -> Result<(), ConvertError> {
    let source = std::fs::read_to_string(&cli.input).map_err(|source| ConvertError::Io {
        path: cli.input.clone(),
        source,
    })?;
    let file_name = cli.input.to_string_lossy();
    let options = cli.options();

    let result = if cli.strict {
        convert_strict(&source, &file_name, &options)?
    } else {
        convert_with_options(&source, &options)
    };

    for skipped in &result.skipped {
        let (line, column) = get_line_and_column(&source, skipped.span.start);
        warn!("{file_name}:{line}:{column}: {skipped}");
    }

    match &cli.output {
        Some(path) => write_to_path(&result.document, cli.format, path),
        None => {
            println!("{}", render(&result.document, cli.format)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::FAILURE
        }
    }
}
