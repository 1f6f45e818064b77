//! Shared types for the stagehand engine.
//!
//! Everything here is plain data: keys, handles and the dynamic field value
//! carried by component records. No crate in the workspace is below this one.

mod types;
mod value;

pub use types::{normalize_message, ActorKey, NativeHandle, NativeKind};
pub use value::{Fields, Value};
