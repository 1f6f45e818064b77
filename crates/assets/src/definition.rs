use serde::Deserialize;
use stagehand_common::{Fields, Value};
use std::collections::BTreeMap;

/// A parsed scene: the actors it declares, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SceneDef {
    #[serde(default)]
    pub actors: Vec<ActorDef>,
}

impl SceneDef {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_actor(mut self, actor: ActorDef) -> Self {
        self.actors.push(actor);
        self
    }
}

/// One actor entry in a scene, or the body of an actor template.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActorDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDef>,
}

impl ActorDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_component(mut self, key: impl Into<String>, component: ComponentDef) -> Self {
        self.components.insert(key.into(), component);
        self
    }
}

/// A component declaration: the `type` to instantiate (required only when the
/// key is new to the actor) and scalar field overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawComponentDef")]
pub struct ComponentDef {
    pub type_name: Option<String>,
    pub fields: Fields,
}

impl ComponentDef {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: Fields::new(),
        }
    }

    /// An override-only declaration for a key the actor already has.
    pub fn overrides() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

/// A component type discovered on disk, with the default fields it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTypeDef {
    pub name: String,
    pub fields: Fields,
}

#[derive(Deserialize)]
struct RawComponentDef {
    #[serde(rename = "type", default)]
    type_name: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, RawField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Bool(bool),
    Number(f64),
    String(String),
    Unsupported(serde::de::IgnoredAny),
}

impl From<RawComponentDef> for ComponentDef {
    fn from(raw: RawComponentDef) -> Self {
        let mut fields = Fields::new();
        for (name, field) in raw.fields {
            let value = match field {
                RawField::Bool(b) => Value::Bool(b),
                RawField::Number(n) => Value::Number(n),
                RawField::String(s) => Value::String(s),
                RawField::Unsupported(_) => {
                    tracing::warn!(field = %name, "ignoring non-scalar component field");
                    continue;
                }
            };
            fields.insert(name, value);
        }
        Self {
            type_name: raw.type_name,
            fields,
        }
    }
}
