use crate::hook::{Hook, HookArg, HookError, HookName};
use crate::ScriptHost;
use stagehand_common::{ActorKey, Fields, NativeHandle, NativeKind, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Whether a record is driven by hooks or by a native collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Script,
    Native(NativeKind),
}

/// A component: reserved fields, locally overridden fields, hooks, and the
/// parent record that supplies everything not overridden here.
pub struct ComponentRecord {
    key: String,
    type_name: String,
    kind: ComponentKind,
    enabled: bool,
    actor: Option<ActorKey>,
    handle: Option<NativeHandle>,
    fields: Fields,
    hooks: BTreeMap<HookName, Hook>,
    parent: Option<ComponentRef>,
}

impl ComponentRecord {
    /// A root record for a scripted component type.
    pub fn prototype(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            key: type_name.clone(),
            type_name,
            kind: ComponentKind::Script,
            enabled: true,
            actor: None,
            handle: None,
            fields: Fields::new(),
            hooks: BTreeMap::new(),
            parent: None,
        }
    }

    /// A root record for one of the native kinds.
    pub fn native(kind: NativeKind) -> Self {
        Self {
            kind: ComponentKind::Native(kind),
            ..Self::prototype(kind.type_name())
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name: String = name.into();
        self.set(&name, value.into());
        self
    }

    pub fn with_hook<F>(mut self, name: HookName, f: F) -> Self
    where
        F: Fn(&mut dyn ScriptHost, &ComponentRef, &HookArg) -> Result<(), HookError> + 'static,
    {
        self.hooks.insert(name, Rc::new(f));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn native_kind(&self) -> Option<NativeKind> {
        match self.kind {
            ComponentKind::Native(kind) => Some(kind),
            ComponentKind::Script => None,
        }
    }

    /// Owning actor. Only a key: it stops resolving once the actor is gone.
    pub fn actor(&self) -> Option<ActorKey> {
        self.actor
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    pub fn set_handle(&mut self, handle: Option<NativeHandle>) {
        self.handle = handle;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn parent(&self) -> Option<&ComponentRef> {
        self.parent.as_ref()
    }

    /// Fields set on this record itself, excluding anything inherited.
    pub fn local_fields(&self) -> &Fields {
        &self.fields
    }

    pub fn overrides(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Read a field, falling back to the parent chain at read time.
    /// `actor` reads as the owning actor's numeric key.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "enabled" => return Some(Value::Bool(self.enabled)),
            "key" => return Some(Value::String(self.key.clone())),
            "type" => return Some(Value::String(self.type_name.clone())),
            "actor" => return self.actor.map(|actor| Value::Number(actor.0 as f64)),
            _ => {}
        }
        if let Some(value) = self.fields.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Write a field on this record. The parent is never touched.
    pub fn set(&mut self, name: &str, value: Value) {
        match (name, value) {
            ("enabled", Value::Bool(enabled)) => self.enabled = enabled,
            ("key" | "type" | "enabled" | "actor", value) => {
                tracing::warn!(component = %self.key, field = name, %value, "ignoring write to reserved field");
            }
            (_, value) => {
                self.fields.insert(name.to_owned(), value);
            }
        }
    }

    /// Resolve a hook on this record or its ancestors.
    pub fn hook(&self, name: HookName) -> Option<Hook> {
        if let Some(h) = self.hooks.get(&name) {
            return Some(Rc::clone(h));
        }
        self.parent.as_ref().and_then(|p| p.hook(name))
    }

    pub fn set_hook(&mut self, name: HookName, hook: Hook) {
        self.hooks.insert(name, hook);
    }
}

impl fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("actor", &self.actor)
            .field("handle", &self.handle)
            .field("fields", &self.fields)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Shared handle to a component record.
///
/// Scripts, the owning actor and event subscriptions all hold the same record.
/// Borrows are short: never hold one across a hook call.
#[derive(Clone)]
pub struct ComponentRef(Rc<RefCell<ComponentRecord>>);

impl ComponentRef {
    pub fn new(record: ComponentRecord) -> Self {
        Self(Rc::new(RefCell::new(record)))
    }

    pub fn borrow(&self) -> Ref<'_, ComponentRecord> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ComponentRecord> {
        self.0.borrow_mut()
    }

    /// Identity comparison: same record, not equal contents.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// New instance with this record as its parent.
    pub fn derive(&self, key: impl Into<String>, actor: Option<ActorKey>) -> ComponentRef {
        let parent = self.borrow();
        ComponentRef::new(ComponentRecord {
            key: key.into(),
            type_name: parent.type_name.clone(),
            kind: parent.kind,
            enabled: true,
            actor,
            handle: None,
            fields: Fields::new(),
            hooks: BTreeMap::new(),
            parent: Some(self.clone()),
        })
    }

    pub fn key(&self) -> String {
        self.borrow().key.clone()
    }

    pub fn type_name(&self) -> String {
        self.borrow().type_name.clone()
    }

    pub fn actor(&self) -> Option<ActorKey> {
        self.borrow().actor
    }

    pub fn native_kind(&self) -> Option<NativeKind> {
        self.borrow().native_kind()
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.borrow().handle
    }

    pub fn is_enabled(&self) -> bool {
        self.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.borrow_mut().enabled = enabled;
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.borrow().get(name)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.borrow_mut().set(name, value.into());
    }

    pub fn hook(&self, name: HookName) -> Option<Hook> {
        self.borrow().hook(name)
    }

    pub fn has_hook(&self, name: HookName) -> bool {
        self.hook(name).is_some()
    }

    pub fn set_hook(&self, name: HookName, hook: Hook) {
        self.borrow_mut().set_hook(name, hook);
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(record) => record.fmt(f),
            Err(_) => f.write_str("ComponentRecord { <borrowed> }"),
        }
    }
}
