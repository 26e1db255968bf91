// Crate-wide error type
// Wraps the structural, context and loader failures behind one enum

use crate::context::ContextError;
use crate::graph::GraphError;
use crate::parser::ParseError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed stage graph; not recoverable by retrying
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A typed read of a stage context failed
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
