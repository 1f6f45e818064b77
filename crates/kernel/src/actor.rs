use stagehand_common::{ActorKey, NativeKind};
use stagehand_ecs::{ComponentRef, ComponentTarget};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Shared handle to an actor. The registry, its staging queues and dispatch
/// snapshots all hold clones.
pub type ActorRef = Rc<RefCell<Actor>>;

/// A live entity: a stable key, a name, and its components.
///
/// The component map is only restructured by [`Actor::add_component`] while
/// loading, and by the registry's drain phase. Everything a script asks for at
/// runtime goes through the staged lists.
#[derive(Debug)]
pub struct Actor {
    key: ActorKey,
    name: String,
    components: BTreeMap<String, ComponentRef>,
    started: bool,
    pending_delete: bool,
    persistent: bool,
    pending_start: BTreeSet<String>,
    staged_add: Vec<(String, ComponentRef)>,
    staged_remove: Vec<String>,
    body_key: Option<String>,
    emitter_key: Option<String>,
}

impl Actor {
    /// An empty, unnamed actor that has not started.
    pub fn new(key: ActorKey) -> Self {
        Self {
            key,
            name: String::new(),
            components: BTreeMap::new(),
            started: false,
            pending_delete: false,
            persistent: false,
            pending_start: BTreeSet::new(),
            staged_add: Vec::new(),
            staged_remove: Vec::new(),
            body_key: None,
            emitter_key: None,
        }
    }

    /// Wrap the actor in a shared handle.
    pub fn into_ref(self) -> ActorRef {
        Rc::new(RefCell::new(self))
    }

    /// Stable key, unique for the lifetime of the registry.
    pub fn key(&self) -> ActorKey {
        self.key
    }

    /// Display name; several actors may share one.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the actor. Lookups by name see the new name immediately.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// True once the actor has been through a Start pass.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True if the next Start pass has anything to do for this actor.
    pub fn needs_start(&self) -> bool {
        !self.started || !self.pending_start.is_empty()
    }

    /// True from the moment the actor is destroyed until it leaves the registry.
    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }

    /// Persistent actors survive scene changes.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Mark or unmark the actor as surviving scene changes.
    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Live components in key order.
    pub fn components(&self) -> &BTreeMap<String, ComponentRef> {
        &self.components
    }

    /// Keys of live or staged components still waiting for their Start.
    pub fn pending_start(&self) -> &BTreeSet<String> {
        &self.pending_start
    }

    /// Number of components staged for insertion at the next drain.
    pub fn staged_additions(&self) -> usize {
        self.staged_add.len()
    }

    /// Number of components staged for removal at the next drain.
    pub fn staged_removals(&self) -> usize {
        self.staged_remove.len()
    }

    /// Owned copy of the live map, for iterating while hooks run.
    pub fn snapshot(&self) -> Vec<(String, ComponentRef)> {
        self.components
            .iter()
            .map(|(k, c)| (k.clone(), c.clone()))
            .collect()
    }

    /// Live component under `key`.
    pub fn component_by_key(&self, key: &str) -> Option<ComponentRef> {
        self.components.get(key).cloned()
    }

    /// First live component of a type. The native type names go through the
    /// reserved slot keys. Disabled components are still returned.
    pub fn component_of_type(&self, type_name: &str) -> Option<ComponentRef> {
        if let Some(kind) = NativeKind::from_type_name(type_name) {
            return self
                .native_key(kind)
                .and_then(|key| self.components.get(key).cloned());
        }
        self.components
            .values()
            .find(|c| c.borrow().type_name() == type_name)
            .cloned()
    }

    /// Every live component of a type, in key order.
    pub fn components_of_type(&self, type_name: &str) -> Vec<ComponentRef> {
        self.components
            .values()
            .filter(|c| c.borrow().type_name() == type_name)
            .cloned()
            .collect()
    }

    /// Key reserved for the Body or Emitter slot, if the actor has one.
    pub fn native_key(&self, kind: NativeKind) -> Option<&str> {
        match kind {
            NativeKind::Body => self.body_key.as_deref(),
            NativeKind::Emitter => self.emitter_key.as_deref(),
        }
    }

    /// The record occupying a native slot, whether live or still staged.
    pub fn native_component(&self, kind: NativeKind) -> Option<ComponentRef> {
        let key = self.native_key(kind)?;
        self.components.get(key).cloned().or_else(|| {
            self.staged_add
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, c)| c.clone())
        })
    }

    /// Direct insertion, used while loading scenes and templates. An existing
    /// key is overwritten in place; a new key is queued for its first Start.
    pub fn add_component(&mut self, key: impl Into<String>, component: ComponentRef) {
        let key = key.into();
        self.claim_native_slot(&key, &component);
        if self.components.insert(key.clone(), component).is_none() {
            self.pending_start.insert(key);
        }
    }

    /// Runtime insertion: the record joins the live map at the next drain.
    pub fn stage_component(&mut self, key: impl Into<String>, component: ComponentRef) {
        let key = key.into();
        self.claim_native_slot(&key, &component);
        self.pending_start.insert(key.clone());
        tracing::debug!(actor = %self.key, component = %key, "staged component add");
        self.staged_add.push((key, component));
    }

    /// Disable a component now and queue it for destruction. Returns `false`
    /// if the target does not belong to this actor.
    pub fn stage_removal(&mut self, target: &ComponentTarget) -> bool {
        let Some((key, component)) = self.resolve_target(target) else {
            return false;
        };
        component.set_enabled(false);
        if !self.staged_remove.contains(&key) {
            tracing::debug!(actor = %self.key, component = %key, "staged component removal");
            self.staged_remove.push(key);
        }
        true
    }

    /// Disable every live component.
    pub fn disable_all(&mut self) {
        for component in self.components.values() {
            component.set_enabled(false);
        }
    }

    /// Flag the actor for removal. Returns `false` if it already was.
    pub(crate) fn mark_pending_delete(&mut self) -> bool {
        !std::mem::replace(&mut self.pending_delete, true)
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    pub(crate) fn take_pending_start(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.pending_start)
    }

    pub(crate) fn take_staged(&mut self) -> (Vec<(String, ComponentRef)>, Vec<String>) {
        (
            std::mem::take(&mut self.staged_add),
            std::mem::take(&mut self.staged_remove),
        )
    }

    pub(crate) fn insert_live(&mut self, key: String, component: ComponentRef) {
        self.components.insert(key, component);
    }

    pub(crate) fn remove_live(&mut self, key: &str) -> Option<ComponentRef> {
        let removed = self.components.remove(key)?;
        if self.body_key.as_deref() == Some(key) {
            self.body_key = None;
        }
        if self.emitter_key.as_deref() == Some(key) {
            self.emitter_key = None;
        }
        Some(removed)
    }

    /// The first record of a native kind keeps the slot until it is removed.
    fn claim_native_slot(&mut self, key: &str, component: &ComponentRef) {
        let slot = match component.native_kind() {
            Some(NativeKind::Body) => &mut self.body_key,
            Some(NativeKind::Emitter) => &mut self.emitter_key,
            None => return,
        };
        slot.get_or_insert_with(|| key.to_owned());
    }

    fn resolve_target(&self, target: &ComponentTarget) -> Option<(String, ComponentRef)> {
        match target {
            ComponentTarget::Record(record) => {
                let key = record.key();
                let owned = self
                    .components
                    .get(&key)
                    .or_else(|| {
                        self.staged_add
                            .iter()
                            .find(|(k, _)| *k == key)
                            .map(|(_, c)| c)
                    })
                    .is_some_and(|c| c.ptr_eq(record));
                owned.then(|| (key, record.clone()))
            }
            ComponentTarget::Native(handle) => [NativeKind::Body, NativeKind::Emitter]
                .into_iter()
                .filter_map(|kind| self.native_component(kind))
                .find(|c| c.handle() == Some(*handle))
                .map(|c| (c.key(), c)),
        }
    }
}
