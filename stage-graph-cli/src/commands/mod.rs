pub mod inspect;
pub mod order;
pub mod validate;

use std::path::Path;

use color_eyre::Result;
use stage_graph::{Execution, ExecutionParser};

use crate::output;

/// Load an execution file. A parse failure prints the annotated report and
/// exits with status 1.
pub fn load_execution(path: &Path) -> Result<Execution> {
    if !path.exists() {
        color_eyre::eyre::bail!("Execution file not found: {}", path.display());
    }

    match ExecutionParser::parse_file(path) {
        Ok(execution) => Ok(execution),
        Err(e) => {
            output::error(&e.report());
            std::process::exit(1);
        }
    }
}
