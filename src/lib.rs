//! Derives an OpenAPI 3.0 document from Thrift IDL services annotated with HTTP bindings.
//!
//! The conversion runs in two stages: [`parser`] extracts records and annotated service methods
//! from the raw text, and [`assembler`] folds them into the [`openapi`] object graph. Anything the
//! parser does not recognize is dropped and reported through [`ast::Skipped`].

pub mod api;
pub mod assembler;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod openapi;
pub mod parser;
pub mod resolver;
pub mod serialization;
pub mod utils;

pub use api::{convert, convert_strict, convert_with_options, ConversionResult, ConvertOptions};
pub use error::ConvertError;
