use crate::actor::{Actor, ActorRef};
use crate::error::SceneError;
use crate::events::EventBus;
use crate::native::{HandleTable, Headless, NativeBackend};
use stagehand_assets::{ActorDef, GameConfig, SceneSource};
use stagehand_common::{ActorKey, NativeKind};
use stagehand_ecs::{ComponentCatalog, ComponentRecord, ComponentRef, Prototype};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

/// A loaded actor template. Its records are the parents of every instance's
/// records, so edits here show through in instances that have not overridden
/// the field.
#[derive(Debug)]
pub struct Template {
    name: String,
    actor_name: Option<String>,
    components: BTreeMap<String, ComponentRef>,
}

impl Template {
    /// Name the template was loaded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name given to instances, if the template sets one.
    pub fn actor_name(&self) -> Option<&str> {
        self.actor_name.as_deref()
    }

    /// Shared parent record under `key`.
    pub fn component(&self, key: &str) -> Option<ComponentRef> {
        self.components.get(key).cloned()
    }

    /// Every parent record, in key order.
    pub fn components(&self) -> &BTreeMap<String, ComponentRef> {
        &self.components
    }
}

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    /// A script asked to quit during this frame or an earlier one.
    Quit,
}

/// Owns every actor and drives the frame phases.
///
/// Live actors sit in a key-ordered map. Actors created or destroyed from
/// hooks are staged and only join or leave the map in
/// [`Registry::alter_actors`], so the phase loops always walk a stable set.
pub struct Registry {
    current_scene: String,
    pending_scene: String,
    actors: BTreeMap<ActorKey, ActorRef>,
    next_key: u64,
    staged_actors: Vec<ActorRef>,
    staged_removals: Vec<ActorKey>,
    validated_types: BTreeSet<String>,
    templates: HashMap<String, Rc<Template>>,
    catalog: ComponentCatalog,
    source: Box<dyn SceneSource>,
    body_root: ComponentRef,
    emitter_root: ComponentRef,
    pub(crate) natives: Box<dyn NativeBackend>,
    pub(crate) handles: HandleTable,
    pub(crate) events: EventBus,
    next_component: u64,
    frame: u64,
    quit: bool,
    pub(crate) fatal: Option<SceneError>,
}

impl Registry {
    /// An empty registry over `source`, resolving types through `catalog`
    /// and driving native components through `natives`.
    pub fn new(
        source: impl SceneSource + 'static,
        catalog: ComponentCatalog,
        natives: impl NativeBackend + 'static,
    ) -> Self {
        Self {
            current_scene: String::new(),
            pending_scene: String::new(),
            actors: BTreeMap::new(),
            next_key: 0,
            staged_actors: Vec::new(),
            staged_removals: Vec::new(),
            validated_types: BTreeSet::new(),
            templates: HashMap::new(),
            catalog,
            source: Box::new(source),
            body_root: ComponentRef::new(ComponentRecord::native(NativeKind::Body)),
            emitter_root: ComponentRef::new(ComponentRecord::native(NativeKind::Emitter)),
            natives: Box::new(natives),
            handles: HandleTable::new(),
            events: EventBus::new(),
            next_component: 0,
            frame: 0,
            quit: false,
            fatal: None,
        }
    }

    /// A registry whose native components do nothing.
    pub fn headless(source: impl SceneSource + 'static, catalog: ComponentCatalog) -> Self {
        Self::new(source, catalog, Headless)
    }

    /// Load the configured initial scene.
    pub fn boot(&mut self, config: &GameConfig) -> Result<(), SceneError> {
        let initial = config.initial_scene().ok_or(SceneError::NoInitialScene)?;
        tracing::info!(title = %config.game_title, scene = initial, "booting");
        self.load_scene(initial, true)
    }

    /// Name of the scene most recently loaded.
    pub fn current_scene(&self) -> &str {
        &self.current_scene
    }

    /// Scene to load at the end of this frame. Equal to the current scene
    /// when no change is pending.
    pub fn pending_scene(&self) -> &str {
        &self.pending_scene
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Component types known to this registry.
    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Event subscriptions, as of the last flush.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Native handles currently allocated.
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Component type names that have resolved successfully at least once.
    pub fn validated_types(&self) -> &BTreeSet<String> {
        &self.validated_types
    }

    /// A live actor. Staged actors are not included.
    pub fn actor(&self, key: ActorKey) -> Option<ActorRef> {
        self.actors.get(&key).cloned()
    }

    /// Live actors in key order.
    pub fn actors(&self) -> impl Iterator<Item = &ActorRef> {
        self.actors.values()
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Actors instantiated this frame and not yet drained.
    pub fn staged_actor_count(&self) -> usize {
        self.staged_actors.len()
    }

    /// True once a script has called quit.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Run one frame: Start, Update, LateUpdate, event flush, actor drain,
    /// scene change, physics step. A fatal error raised inside a hook stops the
    /// frame at the next phase boundary. A quit request lets the frame finish
    /// and is reported as [`Tick::Quit`].
    pub fn tick(&mut self) -> Result<Tick, SceneError> {
        let _span = tracing::info_span!("frame", frame = self.frame).entered();

        self.start();
        self.take_fatal()?;
        self.update();
        self.take_fatal()?;
        self.late_update();
        self.take_fatal()?;
        self.flush_events();
        self.alter_actors();
        self.take_fatal()?;
        self.check_for_change()?;
        self.step_physics();
        self.take_fatal()?;

        self.frame += 1;
        Ok(if self.quit { Tick::Quit } else { Tick::Continue })
    }

    /// Start every live actor with unstarted components.
    pub fn start(&mut self) {
        tracing::trace!(actors = self.actors.len(), "start phase");
        for actor in self.live_snapshot() {
            if actor.borrow().needs_start() {
                self.start_actor(&actor);
            }
        }
    }

    /// Run OnUpdate on every live actor and update emitters.
    pub fn update(&mut self) {
        tracing::trace!(actors = self.actors.len(), "update phase");
        for actor in self.live_snapshot() {
            self.update_actor(&actor);
        }
    }

    /// Run OnLateUpdate on every live actor and sync bodies.
    pub fn late_update(&mut self) {
        tracing::trace!(actors = self.actors.len(), "late update phase");
        for actor in self.live_snapshot() {
            self.late_update_actor(&actor);
        }
    }

    /// Apply subscription changes staged during this frame.
    pub fn flush_events(&mut self) {
        self.events.flush();
    }

    /// Apply staged actor insertions and removals, then drain every live
    /// actor's staged component changes.
    pub fn alter_actors(&mut self) {
        let added = std::mem::take(&mut self.staged_actors);
        let removed = std::mem::take(&mut self.staged_removals);
        if !added.is_empty() || !removed.is_empty() {
            tracing::debug!(
                added = added.len(),
                removed = removed.len(),
                "altering actor set"
            );
        }

        for actor in added {
            let key = actor.borrow().key();
            self.actors.insert(key, actor);
        }
        for key in removed {
            // A staged actor destroyed in the frame it was created has just
            // been inserted above, so it is torn down like any other.
            if let Some(actor) = self.actors.get(&key).cloned() {
                self.delete_actor(&actor);
                self.actors.remove(&key);
            }
        }

        for actor in self.live_snapshot() {
            self.alter_container(&actor);
        }
    }

    /// Perform a scene change requested during this frame.
    pub fn check_for_change(&mut self) -> Result<(), SceneError> {
        if self.pending_scene == self.current_scene {
            return Ok(());
        }
        let target = self.pending_scene.clone();
        self.load_scene(&target, false)
    }

    /// Step the native backend and dispatch the contacts it reports.
    pub fn step_physics(&mut self) {
        let contacts = self.natives.step();
        tracing::trace!(contacts = contacts.len(), "physics step");
        for contact in &contacts {
            self.dispatch_contact(contact);
        }
    }

    /// Build the actors of a scene. Unless `initial`, every non-persistent
    /// actor of the previous scene is torn down first. Persistent actors keep
    /// their keys.
    pub fn load_scene(&mut self, name: &str, initial: bool) -> Result<(), SceneError> {
        let scene = self.source.scene(name)?;

        if !initial {
            let doomed: Vec<ActorRef> = self
                .actors
                .values()
                .filter(|a| !a.borrow().is_persistent())
                .cloned()
                .collect();
            for actor in doomed {
                let key = actor.borrow().key();
                self.delete_actor(&actor);
                self.actors.remove(&key);
            }
        }

        self.current_scene = name.to_owned();
        self.pending_scene = name.to_owned();

        for def in &scene.actors {
            let key = self.allocate_key();
            let actor = self.build_actor(key, def)?;
            self.actors.insert(key, actor.into_ref());
        }
        tracing::info!(
            scene = name,
            actors = scene.actors.len(),
            live = self.actors.len(),
            "scene loaded"
        );
        Ok(())
    }

    /// Look up a template, loading it on first use.
    pub fn template(&mut self, name: &str) -> Result<Rc<Template>, SceneError> {
        if let Some(template) = self.templates.get(name) {
            return Ok(template.clone());
        }

        let def = self.source.template(name)?;
        if def.template.is_some() {
            tracing::warn!(template = name, "templates cannot extend other templates");
        }
        let mut components = BTreeMap::new();
        for (key, component) in &def.components {
            let type_name =
                component
                    .type_name
                    .as_deref()
                    .ok_or_else(|| SceneError::MissingComponentType {
                        actor: name.to_owned(),
                        key: key.clone(),
                    })?;
            if let Some(existing) = NativeKind::from_type_name(type_name).and_then(|kind| {
                components
                    .values()
                    .find(|c: &&ComponentRef| c.native_kind() == Some(kind))
                    .cloned()
            }) {
                tracing::warn!(template = name, component = %key, slot = %existing.key(), "second {type_name}; fields go to the existing one");
                for (field, value) in &component.fields {
                    existing.set(field, value.clone());
                }
                continue;
            }
            let record = self.component_from_type(type_name, key, None)?;
            for (field, value) in &component.fields {
                record.set(field, value.clone());
            }
            components.insert(key.clone(), record);
        }

        let template = Rc::new(Template {
            name: name.to_owned(),
            actor_name: def.name.clone(),
            components,
        });
        tracing::debug!(template = name, components = template.components.len(), "template loaded");
        self.templates.insert(name.to_owned(), template.clone());
        Ok(template)
    }

    pub(crate) fn request_quit(&mut self) {
        self.quit = true;
    }

    pub(crate) fn request_scene(&mut self, name: &str) {
        tracing::debug!(from = %self.current_scene, to = name, "scene change requested");
        self.pending_scene = name.to_owned();
    }

    /// Build an actor from a template and stage it. Its key is valid
    /// immediately; it joins the live set at the next drain.
    pub(crate) fn spawn(&mut self, template: &str) -> Result<ActorKey, SceneError> {
        let template = self.template(template)?;
        let key = self.allocate_key();
        let mut actor = Actor::new(key);
        self.link_template(&mut actor, &template);
        tracing::debug!(actor = %key, template = template.name(), "actor instantiated");
        self.staged_actors.push(actor.into_ref());
        Ok(key)
    }

    pub(crate) fn stage_destroy(&mut self, key: ActorKey) {
        self.staged_removals.push(key);
    }

    /// A live or staged actor.
    pub(crate) fn lookup(&self, key: ActorKey) -> Option<ActorRef> {
        self.actors.get(&key).cloned().or_else(|| {
            self.staged_actors
                .iter()
                .find(|a| a.borrow().key() == key)
                .cloned()
        })
    }

    /// Live actors followed by staged ones, skipping those marked for removal.
    pub(crate) fn candidates(&self) -> impl Iterator<Item = &ActorRef> {
        self.actors
            .values()
            .chain(self.staged_actors.iter())
            .filter(|a| !a.borrow().is_pending_delete())
    }

    pub(crate) fn next_component_key(&mut self) -> String {
        let key = format!("r{}", self.next_component);
        self.next_component += 1;
        key
    }

    /// Resolve a type and derive a new record from it. Native records attached
    /// to an actor get a fresh handle.
    pub(crate) fn component_from_type(
        &mut self,
        type_name: &str,
        key: &str,
        actor: Option<ActorKey>,
    ) -> Result<ComponentRef, SceneError> {
        let parent = self.resolve_type(type_name)?;
        let record = parent.derive(key, actor);
        if let Some(owner) = actor {
            self.attach_native(&record, owner);
        }
        Ok(record)
    }

    fn resolve_type(&mut self, type_name: &str) -> Result<ComponentRef, SceneError> {
        let parent = match self.catalog.resolve(type_name) {
            Some(Prototype::Native(NativeKind::Body)) => self.body_root.clone(),
            Some(Prototype::Native(NativeKind::Emitter)) => self.emitter_root.clone(),
            Some(Prototype::Script(prototype)) => prototype,
            None => return Err(SceneError::ComponentTypeNotFound(type_name.to_owned())),
        };
        if self.validated_types.insert(type_name.to_owned()) {
            tracing::trace!(type_name, "component type validated");
        }
        Ok(parent)
    }

    fn attach_native(&mut self, record: &ComponentRef, owner: ActorKey) {
        if let Some(kind) = record.native_kind() {
            let handle = self.handles.allocate(owner, kind);
            record.borrow_mut().set_handle(Some(handle));
        }
    }

    fn allocate_key(&mut self) -> ActorKey {
        let key = ActorKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn build_actor(&mut self, key: ActorKey, def: &ActorDef) -> Result<Actor, SceneError> {
        let mut actor = Actor::new(key);
        if let Some(template) = &def.template {
            let template = self.template(template)?;
            self.link_template(&mut actor, &template);
        }
        if let Some(name) = &def.name {
            actor.set_name(name);
        }

        for (ckey, component) in &def.components {
            if let Some(existing) = actor.component_by_key(ckey) {
                for (field, value) in &component.fields {
                    existing.set(field, value.clone());
                }
                continue;
            }
            let type_name =
                component
                    .type_name
                    .as_deref()
                    .ok_or_else(|| SceneError::MissingComponentType {
                        actor: actor.name().to_owned(),
                        key: ckey.clone(),
                    })?;
            // One body and one emitter per actor.
            if let Some(existing) =
                NativeKind::from_type_name(type_name).and_then(|kind| actor.native_component(kind))
            {
                tracing::warn!(actor = actor.name(), component = %ckey, slot = %existing.key(), "second {type_name}; fields go to the existing one");
                for (field, value) in &component.fields {
                    existing.set(field, value.clone());
                }
                continue;
            }
            let record = self.component_from_type(type_name, ckey, Some(key))?;
            for (field, value) in &component.fields {
                record.set(field, value.clone());
            }
            actor.add_component(ckey.clone(), record);
        }
        Ok(actor)
    }

    fn link_template(&mut self, actor: &mut Actor, template: &Template) {
        if let Some(name) = template.actor_name() {
            actor.set_name(name);
        }
        let owner = actor.key();
        for (ckey, parent) in template.components() {
            let record = parent.derive(ckey.clone(), Some(owner));
            self.attach_native(&record, owner);
            actor.add_component(ckey.clone(), record);
        }
    }

    fn live_snapshot(&self) -> Vec<ActorRef> {
        self.actors.values().cloned().collect()
    }

    fn take_fatal(&mut self) -> Result<(), SceneError> {
        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
