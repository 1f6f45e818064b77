use stagehand_assets::AssetError;

/// Configuration errors that stop the engine. Script failures never surface
/// here; they are reported and the frame carries on.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("component type not found: {0}")]
    ComponentTypeNotFound(String),

    #[error("component {key} on actor {actor} declares no type")]
    MissingComponentType { actor: String, key: String },

    #[error("no initial scene configured")]
    NoInitialScene,
}
