//! Content definitions: scenes, actor templates, component types, game config.
//!
//! The engine consumes parsed definitions through [`SceneSource`]; where they
//! come from (a resources directory, memory) is this crate's concern.
//!
//! # Layout
//! ```text
//! resources/
//!   game.config                    - title and initial scene
//!   scenes/<name>.scene            - actor lists
//!   actor_templates/<name>.template
//!   component_types/<name>.*       - one file per type; .json supplies defaults
//! ```

mod config;
mod definition;
mod source;

pub use config::GameConfig;
pub use definition::{ActorDef, ComponentDef, ComponentTypeDef, SceneDef};
pub use source::{MemorySource, ResourceDir, SceneSource};

use std::path::PathBuf;

/// Errors from loading content definitions.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("error parsing json at [{path}]: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("resources directory {0} missing")]
    ResourcesMissing(PathBuf),
    #[error("{0} missing")]
    ConfigMissing(PathBuf),
    #[error("scene {0} is missing")]
    SceneMissing(String),
    #[error("template {0} is missing")]
    TemplateMissing(String),
}
