use crate::definition::{ActorDef, ComponentDef, ComponentTypeDef, SceneDef};
use crate::{AssetError, GameConfig};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the engine gets scene and template definitions from.
pub trait SceneSource {
    fn scene(&self, name: &str) -> Result<SceneDef, AssetError>;

    fn template(&self, name: &str) -> Result<ActorDef, AssetError>;
}

/// Definitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scenes: HashMap<String, SceneDef>,
    templates: HashMap<String, ActorDef>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(mut self, name: impl Into<String>, scene: SceneDef) -> Self {
        self.scenes.insert(name.into(), scene);
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, template: ActorDef) -> Self {
        self.templates.insert(name.into(), template);
        self
    }
}

impl SceneSource for MemorySource {
    fn scene(&self, name: &str) -> Result<SceneDef, AssetError> {
        self.scenes
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::SceneMissing(name.to_owned()))
    }

    fn template(&self, name: &str) -> Result<ActorDef, AssetError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::TemplateMissing(name.to_owned()))
    }
}

/// A `resources/` directory on disk. All files are JSON.
#[derive(Debug, Clone)]
pub struct ResourceDir {
    root: PathBuf,
    config: GameConfig,
}

impl ResourceDir {
    /// Open a resources directory. Both the directory and its `game.config`
    /// must exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, AssetError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(AssetError::ResourcesMissing(root));
        }
        let config_path = root.join("game.config");
        if !config_path.is_file() {
            return Err(AssetError::ConfigMissing(config_path));
        }
        let config = read_json(&config_path)?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene_path(&self, name: &str) -> PathBuf {
        self.root.join("scenes").join(format!("{name}.scene"))
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.root
            .join("actor_templates")
            .join(format!("{name}.template"))
    }

    /// Names of every `.scene` file, sorted.
    pub fn scene_names(&self) -> Result<Vec<String>, AssetError> {
        let mut names: Vec<String> = stems(&self.root.join("scenes"))?
            .into_iter()
            .filter(|(_, ext)| ext.as_deref() == Some("scene"))
            .map(|(stem, _)| stem)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Component types declared under `component_types/`. Every file stem is a
    /// type; `.json` files also carry default field values. A missing
    /// directory declares nothing.
    pub fn component_types(&self) -> Result<Vec<ComponentTypeDef>, AssetError> {
        let dir = self.root.join("component_types");
        let mut types = Vec::new();
        for (name, ext) in stems(&dir)? {
            let fields = if ext.as_deref() == Some("json") {
                let path = dir.join(format!("{name}.json"));
                read_json::<ComponentDef>(&path)?.fields
            } else {
                Default::default()
            };
            types.push(ComponentTypeDef { name, fields });
        }
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types.dedup_by(|a, b| a.name == b.name);
        Ok(types)
    }
}

impl SceneSource for ResourceDir {
    fn scene(&self, name: &str) -> Result<SceneDef, AssetError> {
        let path = self.scene_path(name);
        if !path.is_file() {
            return Err(AssetError::SceneMissing(name.to_owned()));
        }
        read_json(&path)
    }

    fn template(&self, name: &str) -> Result<ActorDef, AssetError> {
        let path = self.template_path(name);
        if !path.is_file() {
            return Err(AssetError::TemplateMissing(name.to_owned()));
        }
        read_json(&path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|source| AssetError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// `(stem, extension)` of every regular file in `dir`; empty if `dir` is absent.
fn stems(dir: &Path) -> Result<Vec<(String, Option<String>)>, AssetError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_owned);
        out.push((stem.to_owned(), ext));
    }
    Ok(out)
}
