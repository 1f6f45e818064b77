use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an actor in the registry.
///
/// Keys are handed out by a monotonic allocator and never reused, so a stale
/// key simply stops resolving once its actor is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorKey(pub u64);

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Opaque reference to a native (non-scripted) resource such as a physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeHandle(pub u64);

/// The two component kinds backed by a native collaborator instead of hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeKind {
    Body,
    Emitter,
}

impl NativeKind {
    /// Declared `type` name that selects this kind in scene content.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Body => "Rigidbody",
            Self::Emitter => "ParticleSystem",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Rigidbody" => Some(Self::Body),
            "ParticleSystem" => Some(Self::Emitter),
            _ => None,
        }
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Normalize a script error message for display: path separators become `/`
/// so reports read the same on every platform.
pub fn normalize_message(message: &str) -> String {
    message.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_kind_round_trips_type_names() {
        for kind in [NativeKind::Body, NativeKind::Emitter] {
            assert_eq!(NativeKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(NativeKind::from_type_name("Health"), None);
    }

    #[test]
    fn message_paths_are_normalized() {
        let raw = r"resources\component_types\Health.lua:12: attempt to index nil";
        assert_eq!(
            normalize_message(raw),
            "resources/component_types/Health.lua:12: attempt to index nil"
        );
    }

    #[test]
    fn actor_keys_order_by_value() {
        let mut keys = vec![ActorKey(3), ActorKey(1), ActorKey(2)];
        keys.sort();
        assert_eq!(keys, vec![ActorKey(1), ActorKey(2), ActorKey(3)]);
    }
}
