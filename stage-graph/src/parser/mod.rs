// Loader module for execution definitions
// Provides JSON/YAML parsing with located, annotated errors

pub mod error;
pub mod loader;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use loader::{ExecutionFormat, ExecutionParser};
