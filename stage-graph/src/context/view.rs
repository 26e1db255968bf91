// Typed Stage Context View
// Reads parts of a stage context into typed values via JSON Pointer (RFC 6901)

use crate::model::{Stage, StageContext};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::any::type_name;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("nothing in stage context at pointer '{pointer}'")]
    PointerNotFound { pointer: String },

    #[error("value in stage context at pointer '{pointer}' is not text")]
    NotText { pointer: String },

    #[error("value in stage context at pointer '{pointer}' is not base 64 encoded")]
    InvalidBase64 {
        pointer: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("unable to map context to {target}")]
    Mapping {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not convert {data} to {target}")]
    Decode {
        target: &'static str,
        data: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Format of the payload hidden inside a Base64 context value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextDecoder {
    #[default]
    Json,
    Yaml,
}

impl ContextDecoder {
    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ContextError> {
        let result: Result<T, Box<dyn std::error::Error + Send + Sync>> = match self {
            ContextDecoder::Json => serde_json::from_slice(data).map_err(|e| e.into()),
            ContextDecoder::Yaml => serde_yaml::from_slice(data).map_err(|e| e.into()),
        };

        result.map_err(|source| ContextError::Decode {
            target: type_name::<T>(),
            data: String::from_utf8_lossy(data).into_owned(),
            source,
        })
    }
}

/// Map the whole stage context to `T`
pub fn map_context<T: DeserializeOwned>(stage: &Stage) -> Result<T, ContextError> {
    map_context_at(stage, "")
}

/// Map the part of the stage context at `pointer` to `T`. An empty pointer
/// selects the whole context.
pub fn map_context_at<T: DeserializeOwned>(stage: &Stage, pointer: &str) -> Result<T, ContextError> {
    let mapped = if pointer.is_empty() {
        T::deserialize(Value::Object(stage.context().clone()))
    } else {
        T::deserialize(resolve(stage.context(), pointer)?)
    };

    mapped.map_err(|source| ContextError::Mapping {
        target: type_name::<T>(),
        source,
    })
}

/// Decode the Base64 string at `pointer` and read the bytes as `T`
pub fn decode_base64<T: DeserializeOwned>(
    stage: &Stage,
    pointer: &str,
    decoder: ContextDecoder,
) -> Result<T, ContextError> {
    let not_text = || ContextError::NotText {
        pointer: pointer.to_string(),
    };
    if pointer.is_empty() {
        return Err(not_text());
    }
    let text = resolve(stage.context(), pointer)?
        .as_str()
        .ok_or_else(not_text)?;

    let data = STANDARD
        .decode(text)
        .map_err(|source| ContextError::InvalidBase64 {
            pointer: pointer.to_string(),
            source,
        })?;

    decoder.decode(&data)
}

/// Look up the first pointer token in the context map, then follow the rest
/// of the pointer inside that value.
fn resolve<'c>(context: &'c StageContext, pointer: &str) -> Result<&'c Value, ContextError> {
    let not_found = || ContextError::PointerNotFound {
        pointer: pointer.to_string(),
    };

    let tokens = pointer.strip_prefix('/').ok_or_else(not_found)?;
    let (head, rest) = match tokens.find('/') {
        Some(idx) => tokens.split_at(idx),
        None => (tokens, ""),
    };
    let key = head.replace("~1", "/").replace("~0", "~");

    let node = context.get(&key).ok_or_else(not_found)?;
    if rest.is_empty() {
        Ok(node)
    } else {
        node.pointer(rest).ok_or_else(not_found)
    }
}
