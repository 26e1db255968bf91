// Execution definition loader
// Reads serialized executions (JSON or YAML) into the stage arena

use super::error::{ParseError, ParseResult};
use crate::model::Execution;

use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFormat {
    Json,
    Yaml,
}

impl ExecutionFormat {
    /// `.yml` / `.yaml` files are YAML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                ExecutionFormat::Yaml
            }
            _ => ExecutionFormat::Json,
        }
    }
}

pub struct ExecutionParser;

impl ExecutionParser {
    /// Parse an execution from a string
    pub fn parse_str(content: &str, format: ExecutionFormat) -> ParseResult<Execution> {
        let execution: Execution = match format {
            ExecutionFormat::Json => serde_json::from_str(content)
                .map_err(|e| ParseError::from_json_error(&e, content))?,
            ExecutionFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ParseError::from_yaml_error(&e, content))?,
        };

        debug!(
            execution = execution.id(),
            stages = execution.stages().len(),
            "loaded execution"
        );

        Ok(execution)
    }

    /// Parse an execution from file, picking the format from its extension
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Execution> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParseError::io(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_str(&content, ExecutionFormat::from_path(path))
    }
}
