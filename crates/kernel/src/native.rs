use glam::Vec2;
use stagehand_common::{ActorKey, NativeHandle, NativeKind};
use stagehand_ecs::ComponentRecord;
use std::collections::HashMap;

/// Whether a contact started or stopped touching this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// One participant of a contact, as the backend sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSide {
    pub handle: NativeHandle,
    pub sensor: bool,
}

/// A contact reported by [`NativeBackend::step`]. `point` and `normal` are
/// only meaningful for a beginning solid contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub phase: ContactPhase,
    pub a: ContactSide,
    pub b: ContactSide,
    pub point: Vec2,
    pub normal: Vec2,
    pub relative_velocity: Vec2,
}

/// The physics and particle collaborator. The registry owns the handle
/// bookkeeping; a backend only ever sees handles it was told to start.
pub trait NativeBackend {
    /// Bring a native component to life. `config` reads through the
    /// component's inheritance chain.
    fn start(&mut self, handle: NativeHandle, kind: NativeKind, config: &ComponentRecord);

    /// Per-frame tick during the Update phase. Only emitters receive it.
    fn update(&mut self, _handle: NativeHandle, _kind: NativeKind) {}

    /// Per-frame tick during the LateUpdate phase. Only bodies receive it.
    fn late_update(&mut self, _handle: NativeHandle, _kind: NativeKind) {}

    fn destroy(&mut self, handle: NativeHandle, kind: NativeKind);

    /// Advance the simulation one step and report contacts that began or
    /// ended during it.
    fn step(&mut self) -> Vec<Contact>;
}

/// A backend that simulates nothing.
#[derive(Debug, Default)]
pub struct Headless;

impl NativeBackend for Headless {
    fn start(&mut self, _handle: NativeHandle, _kind: NativeKind, _config: &ComponentRecord) {}

    fn destroy(&mut self, _handle: NativeHandle, _kind: NativeKind) {}

    fn step(&mut self) -> Vec<Contact> {
        Vec::new()
    }
}

/// Maps native handles back to the actor that owns them.
#[derive(Debug, Default)]
pub struct HandleTable {
    next: u64,
    owners: HashMap<NativeHandle, (ActorKey, NativeKind)>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh handle. Handles are never reused.
    pub fn allocate(&mut self, owner: ActorKey, kind: NativeKind) -> NativeHandle {
        self.next += 1;
        let handle = NativeHandle(self.next);
        self.owners.insert(handle, (owner, kind));
        handle
    }

    pub fn owner(&self, handle: NativeHandle) -> Option<ActorKey> {
        self.owners.get(&handle).map(|(owner, _)| *owner)
    }

    pub fn kind(&self, handle: NativeHandle) -> Option<NativeKind> {
        self.owners.get(&handle).map(|(_, kind)| *kind)
    }

    pub fn release(&mut self, handle: NativeHandle) -> Option<(ActorKey, NativeKind)> {
        self.owners.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
