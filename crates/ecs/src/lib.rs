//! Component model: dynamically typed records, prototype inheritance, hooks.
//!
//! A component record holds only the fields it has overridden plus a link to
//! its parent (an actor template's record, which in turn links to the type
//! prototype in the [`ComponentCatalog`]). Reads fall through the chain at read
//! time, so edits to a shared parent are visible to every instance that has
//! not shadowed the field.
//!
//! # Invariants
//! - Writes through an instance never reach its parent.
//! - A missing hook is a no-op for the caller, never an error.
//! - Hooks see the engine only through [`ScriptHost`].

mod catalog;
mod component;
mod hook;
mod host;

pub use catalog::{ComponentCatalog, Prototype};
pub use component::{ComponentKind, ComponentRecord, ComponentRef};
pub use hook::{hook, Collision, Hook, HookArg, HookError, HookName, NO_CONTACT};
pub use host::{ComponentTarget, ScriptHost};
