use crate::{ComponentRef, ScriptHost};
use glam::Vec2;
use stagehand_common::{ActorKey, Fields};
use std::fmt;
use std::rc::Rc;

/// Lifecycle points at which a component may expose a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookName {
    OnStart,
    OnUpdate,
    OnLateUpdate,
    OnDestroy,
    OnCollisionEnter,
    OnCollisionExit,
    OnTriggerEnter,
    OnTriggerExit,
}

impl HookName {
    pub const ALL: [HookName; 8] = [
        Self::OnStart,
        Self::OnUpdate,
        Self::OnLateUpdate,
        Self::OnDestroy,
        Self::OnCollisionEnter,
        Self::OnCollisionExit,
        Self::OnTriggerEnter,
        Self::OnTriggerExit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnStart => "OnStart",
            Self::OnUpdate => "OnUpdate",
            Self::OnLateUpdate => "OnLateUpdate",
            Self::OnDestroy => "OnDestroy",
            Self::OnCollisionEnter => "OnCollisionEnter",
            Self::OnCollisionExit => "OnCollisionExit",
            Self::OnTriggerEnter => "OnTriggerEnter",
            Self::OnTriggerExit => "OnTriggerExit",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by a hook body. Recovered at the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Point/normal placeholder for contacts that carry no manifold
/// (contact end, sensor overlaps).
pub const NO_CONTACT: Vec2 = Vec2::new(-999.0, -999.0);

/// Payload handed to collision and trigger hooks, from one side's view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub other: ActorKey,
    pub point: Vec2,
    pub normal: Vec2,
    pub relative_velocity: Vec2,
}

/// Second argument of a hook call.
#[derive(Debug, Clone, PartialEq)]
pub enum HookArg {
    None,
    Event(Fields),
    Collision(Collision),
}

/// An opaque callable supplied by the scripting collaborator. Invoked with the
/// engine bridge, the owning component record, and the call payload.
pub type Hook = Rc<dyn Fn(&mut dyn ScriptHost, &ComponentRef, &HookArg) -> Result<(), HookError>>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&mut dyn ScriptHost, &ComponentRef, &HookArg) -> Result<(), HookError> + 'static,
{
    Rc::new(f)
}
