use serde::Deserialize;

/// Contents of `game.config`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub game_title: String,
    #[serde(default)]
    pub initial_scene: Option<String>,
}

impl GameConfig {
    /// The scene to boot into. An empty name counts as missing.
    pub fn initial_scene(&self) -> Option<&str> {
        self.initial_scene.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_initial_scene_is_missing() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "game_title": "Demo", "initial_scene": "" }"#).unwrap();
        assert_eq!(config.game_title, "Demo");
        assert_eq!(config.initial_scene(), None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "initial_scene": "basic", "x_resolution": 640 }"#).unwrap();
        assert_eq!(config.initial_scene(), Some("basic"));
        assert_eq!(config.game_title, "");
    }
}
