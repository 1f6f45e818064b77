//! Fixtures shared by the kernel tests.

use crate::native::{Contact, NativeBackend};
use crate::registry::Registry;
use stagehand_assets::MemorySource;
use stagehand_common::{NativeHandle, NativeKind};
use stagehand_ecs::{ComponentCatalog, ComponentRecord, ComponentRef, HookArg, HookName, ScriptHost};
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::default()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub fn count(log: &Log, entry: &str) -> usize {
    log.borrow().iter().filter(|e| *e == entry).count()
}

/// `"<actor name>.<component key>"` for a record attached to an actor.
pub fn label(host: &dyn ScriptHost, component: &ComponentRef) -> String {
    let actor = component
        .actor()
        .and_then(|key| host.actor_name(key))
        .unwrap_or_default();
    format!("{actor}.{}", component.key())
}

/// A script type whose lifecycle and contact hooks append
/// `"<actor>.<key>:<Hook>"` to `log`.
pub fn traced(type_name: &str, log: &Log) -> ComponentRecord {
    let mut record = ComponentRecord::prototype(type_name);
    for name in HookName::ALL {
        let log = log.clone();
        record = record.with_hook(name, move |host, component, arg| {
            let mut entry = format!("{}:{name}", label(host, component));
            if let HookArg::Collision(collision) = arg {
                let other = host.actor_name(collision.other).unwrap_or_default();
                entry.push_str(&format!("<{other}>"));
            }
            log.borrow_mut().push(entry);
            Ok(())
        });
    }
    record
}

/// Native backend that records every call and replays queued contacts on
/// the next step.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub log: Log,
    pub contacts: Rc<RefCell<Vec<Contact>>>,
}

impl RecordingBackend {
    pub fn queue(&self, contact: Contact) {
        self.contacts.borrow_mut().push(contact);
    }
}

impl NativeBackend for RecordingBackend {
    fn start(&mut self, handle: NativeHandle, kind: NativeKind, _config: &ComponentRecord) {
        self.log.borrow_mut().push(format!("start {kind} #{}", handle.0));
    }

    fn update(&mut self, handle: NativeHandle, kind: NativeKind) {
        self.log.borrow_mut().push(format!("update {kind} #{}", handle.0));
    }

    fn late_update(&mut self, handle: NativeHandle, kind: NativeKind) {
        self.log.borrow_mut().push(format!("late_update {kind} #{}", handle.0));
    }

    fn destroy(&mut self, handle: NativeHandle, kind: NativeKind) {
        self.log.borrow_mut().push(format!("destroy {kind} #{}", handle.0));
    }

    fn step(&mut self) -> Vec<Contact> {
        self.log.borrow_mut().push("step".to_owned());
        std::mem::take(&mut *self.contacts.borrow_mut())
    }
}

/// A registry over in-memory definitions with a recording backend that
/// writes to `log`. The returned backend shares its contact queue with the
/// registry's.
pub fn registry(
    source: MemorySource,
    catalog: ComponentCatalog,
    log: &Log,
) -> (Registry, RecordingBackend) {
    let backend = RecordingBackend {
        log: log.clone(),
        contacts: Rc::default(),
    };
    let registry = Registry::new(source, catalog, backend.clone());
    (registry, backend)
}
