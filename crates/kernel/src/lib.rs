//! Scene kernel: actor registry, frame-phase driver, staged mutation and the
//! event bus.
//!
//! One [`Registry`] owns every actor, template cache, native handle and
//! subscription. Hooks receive it as `&mut dyn ScriptHost` and may change
//! anything, but structural changes are queued and applied at fixed points of
//! [`Registry::tick`].
//!
//! # Invariants
//! - Actor keys come from a monotonic counter and are never reused.
//! - Each component receives at most one Start, and only after it is live.
//! - The live actor map and each actor's component map only change in the
//!   drain phase or during a scene load.
//! - Subscription changes apply at the event flush, subscribes first.
//! - A hook failure is reported and skipped; configuration errors stop the
//!   engine.

mod actor;
mod contact;
mod dispatch;
mod error;
mod events;
mod host;
mod native;
mod registry;

#[cfg(test)]
mod testkit;

pub use actor::{Actor, ActorRef};
pub use error::SceneError;
pub use events::{EventBus, Subscription};
pub use native::{Contact, ContactPhase, ContactSide, HandleTable, Headless, NativeBackend};
pub use registry::{Registry, Template, Tick};
