use crate::actor::ActorRef;
use crate::registry::Registry;
use stagehand_common::{normalize_message, NativeKind};
use stagehand_ecs::{ComponentRef, HookArg, HookError, HookName, ScriptHost};

/// Log a failed hook as `<actor> : <message>` and carry on.
pub(crate) fn report_hook_failure(actor_name: &str, hook: &str, err: &HookError) {
    let message = normalize_message(err.message());
    tracing::error!(actor = actor_name, hook, "{actor_name} : {message}");
}

impl Registry {
    /// Call a hook if the record has one. Failures are reported, never raised.
    pub(crate) fn invoke(
        &mut self,
        actor_name: &str,
        component: &ComponentRef,
        name: HookName,
        arg: &HookArg,
    ) {
        let Some(hook) = component.hook(name) else {
            return;
        };
        let host: &mut dyn ScriptHost = self;
        if let Err(err) = hook(host, component, arg) {
            report_hook_failure(actor_name, name.as_str(), &err);
        }
    }

    /// Start every enabled component that has not started yet. The pending
    /// set is taken up front so components added during the pass wait for the
    /// next one.
    pub(crate) fn start_actor(&mut self, actor: &ActorRef) {
        let (name, started, pending, snapshot) = {
            let mut actor = actor.borrow_mut();
            let pending = actor.take_pending_start();
            (
                actor.name().to_owned(),
                actor.is_started(),
                pending,
                actor.snapshot(),
            )
        };

        for (key, component) in snapshot {
            if started && !pending.contains(&key) {
                continue;
            }
            if !component.is_enabled() {
                continue;
            }
            match component.native_kind() {
                Some(kind) => {
                    let Some(handle) = component.handle() else {
                        tracing::warn!(actor = %name, component = %key, "native component has no handle");
                        continue;
                    };
                    let record = component.borrow();
                    self.natives.start(handle, kind, &record);
                }
                None => self.invoke(&name, &component, HookName::OnStart, &HookArg::None),
            }
        }

        actor.borrow_mut().mark_started();
    }

    pub(crate) fn update_actor(&mut self, actor: &ActorRef) {
        let (name, snapshot) = name_and_snapshot(actor);
        for (_, component) in snapshot {
            if !component.is_enabled() {
                continue;
            }
            match component.native_kind() {
                Some(NativeKind::Emitter) => {
                    if let Some(handle) = component.handle() {
                        self.natives.update(handle, NativeKind::Emitter);
                    }
                }
                Some(NativeKind::Body) => {}
                None => self.invoke(&name, &component, HookName::OnUpdate, &HookArg::None),
            }
        }
    }

    pub(crate) fn late_update_actor(&mut self, actor: &ActorRef) {
        let (name, snapshot) = name_and_snapshot(actor);
        for (_, component) in snapshot {
            if !component.is_enabled() {
                continue;
            }
            match component.native_kind() {
                Some(NativeKind::Body) => {
                    if let Some(handle) = component.handle() {
                        self.natives.late_update(handle, NativeKind::Body);
                    }
                }
                Some(NativeKind::Emitter) => {}
                None => self.invoke(&name, &component, HookName::OnLateUpdate, &HookArg::None),
            }
        }
    }

    /// Tear down every component of an actor, enabled or not. The caller
    /// removes the actor from the live set afterwards.
    pub(crate) fn delete_actor(&mut self, actor: &ActorRef) {
        let (name, snapshot) = name_and_snapshot(actor);
        let (staged, _) = actor.borrow_mut().take_staged();
        tracing::debug!(actor = %name, components = snapshot.len(), staged = staged.len(), "deleting actor");
        for (_, component) in snapshot {
            self.teardown(&name, &component);
        }
        // Staged records never went live, so only their handles are returned.
        for (_, component) in staged {
            if let Some(handle) = component.handle() {
                self.handles.release(handle);
                component.borrow_mut().set_handle(None);
            }
        }
    }

    /// Drain one actor's staged component changes: additions join the live
    /// map, then each removal is torn down and erased.
    pub(crate) fn alter_container(&mut self, actor: &ActorRef) {
        let (name, added, removed) = {
            let mut actor = actor.borrow_mut();
            let (added, removed) = actor.take_staged();
            (actor.name().to_owned(), added, removed)
        };
        if added.is_empty() && removed.is_empty() {
            return;
        }

        {
            let mut actor = actor.borrow_mut();
            for (key, component) in added {
                actor.insert_live(key, component);
            }
        }
        for key in removed {
            let Some(component) = actor.borrow().component_by_key(&key) else {
                continue;
            };
            self.teardown(&name, &component);
            actor.borrow_mut().remove_live(&key);
        }
    }

    fn teardown(&mut self, actor_name: &str, component: &ComponentRef) {
        match component.native_kind() {
            Some(kind) => {
                if let Some(handle) = component.handle() {
                    self.natives.destroy(handle, kind);
                    self.handles.release(handle);
                    component.borrow_mut().set_handle(None);
                }
            }
            None => self.invoke(actor_name, component, HookName::OnDestroy, &HookArg::None),
        }
    }
}

fn name_and_snapshot(actor: &ActorRef) -> (String, Vec<(String, ComponentRef)>) {
    let actor = actor.borrow();
    (actor.name().to_owned(), actor.snapshot())
}
