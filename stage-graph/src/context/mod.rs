// Stage Context Access
// Typed reads over a stage's input context

pub mod view;

pub use view::{decode_base64, map_context, map_context_at, ContextDecoder, ContextError};
