use crate::{ComponentRef, Hook};
use stagehand_common::{ActorKey, Fields, NativeHandle};

/// What a script hands to `RemoveComponent`: either a keyed record or the
/// bare handle of a native Body/Emitter.
#[derive(Debug, Clone)]
pub enum ComponentTarget {
    Record(ComponentRef),
    Native(NativeHandle),
}

/// The engine surface visible to hook bodies.
///
/// Calls with a dangling actor key or an unknown component resolve to `None`,
/// an empty list, or a no-op. Structural changes (adding or removing actors
/// and components, subscriptions, scene loads) are staged and take effect at
/// the engine's fixed drain points, never during the call.
pub trait ScriptHost {
    /// Index of the frame currently being run.
    fn frame(&self) -> u64;

    /// Name of a live or just-instantiated actor.
    fn actor_name(&self, actor: ActorKey) -> Option<String>;

    fn component_by_key(&self, actor: ActorKey, key: &str) -> Option<ComponentRef>;

    /// First component of the given type, in key order. `Rigidbody` and
    /// `ParticleSystem` resolve through the actor's reserved slots.
    fn component(&self, actor: ActorKey, type_name: &str) -> Option<ComponentRef>;

    /// Every component of the given type, in key order.
    fn components(&self, actor: ActorKey, type_name: &str) -> Vec<ComponentRef>;

    /// Create a component of `type_name` and stage it onto the actor. The
    /// record is returned immediately but joins the actor at the next drain.
    fn add_component(&mut self, actor: ActorKey, type_name: &str) -> Option<ComponentRef>;

    /// Disable the target now and stage it for destruction.
    fn remove_component(&mut self, actor: ActorKey, target: ComponentTarget);

    fn find(&self, name: &str) -> Option<ActorKey>;

    fn find_all(&self, name: &str) -> Vec<ActorKey>;

    /// Build an actor from a template and stage it for insertion.
    fn instantiate(&mut self, template: &str) -> Option<ActorKey>;

    fn destroy(&mut self, actor: ActorKey);

    /// Exempt an actor from scene-unload teardown.
    fn dont_destroy(&mut self, actor: ActorKey);

    /// Request a scene change at the end of the current frame.
    fn change_scene(&mut self, name: &str);

    fn current_scene(&self) -> String;

    fn publish(&mut self, event_type: &str, payload: &Fields);

    fn subscribe(&mut self, event_type: &str, subscriber: ComponentRef, handler: Hook);

    fn unsubscribe(&mut self, event_type: &str, subscriber: ComponentRef, handler: Hook);

    /// Ask the engine to stop once the current frame has finished.
    fn quit(&mut self);

    /// Write a script message to the engine log.
    fn log(&self, message: &str);
}
