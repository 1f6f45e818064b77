use crate::{ComponentRecord, ComponentRef};
use stagehand_common::NativeKind;
use std::collections::BTreeMap;

/// What a declared component `type` resolves to.
#[derive(Debug, Clone)]
pub enum Prototype {
    Native(NativeKind),
    Script(ComponentRef),
}

/// Named component-type prototypes supplied by the scripting collaborator.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    prototypes: BTreeMap<String, ComponentRef>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype under its type name, replacing any previous one.
    pub fn register(&mut self, record: ComponentRecord) -> ComponentRef {
        let name = record.type_name().to_owned();
        let proto = ComponentRef::new(record);
        self.prototypes.insert(name, proto.clone());
        proto
    }

    pub fn get(&self, type_name: &str) -> Option<ComponentRef> {
        self.prototypes.get(type_name).cloned()
    }

    /// Resolve a declared type. Native kinds win over any same-named prototype.
    pub fn resolve(&self, type_name: &str) -> Option<Prototype> {
        if let Some(kind) = NativeKind::from_type_name(type_name) {
            return Some(Prototype::Native(kind));
        }
        self.get(type_name).map(Prototype::Script)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.prototypes.contains_key(type_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}
