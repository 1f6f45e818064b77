use crate::dispatch::report_hook_failure;
use crate::events::Subscription;
use crate::registry::Registry;
use stagehand_common::{ActorKey, Fields, NativeKind};
use stagehand_ecs::{ComponentRef, ComponentTarget, Hook, HookArg, ScriptHost};

impl ScriptHost for Registry {
    fn frame(&self) -> u64 {
        Registry::frame(self)
    }

    fn actor_name(&self, actor: ActorKey) -> Option<String> {
        let actor = self.lookup(actor)?;
        Some(actor.borrow().name().to_owned())
    }

    fn component_by_key(&self, actor: ActorKey, key: &str) -> Option<ComponentRef> {
        let actor = self.lookup(actor)?;
        actor.borrow().component_by_key(key)
    }

    fn component(&self, actor: ActorKey, type_name: &str) -> Option<ComponentRef> {
        let actor = self.lookup(actor)?;
        actor.borrow().component_of_type(type_name)
    }

    fn components(&self, actor: ActorKey, type_name: &str) -> Vec<ComponentRef> {
        self.lookup(actor)
            .map(|actor| actor.borrow().components_of_type(type_name))
            .unwrap_or_default()
    }

    fn add_component(&mut self, actor: ActorKey, type_name: &str) -> Option<ComponentRef> {
        let Some(target) = self.lookup(actor) else {
            tracing::warn!(%actor, type_name, "add_component on unknown actor");
            return None;
        };

        // One body and one emitter per actor.
        if let Some(kind) = NativeKind::from_type_name(type_name) {
            let existing = target.borrow().native_component(kind);
            if existing.is_some() {
                return existing;
            }
        }

        let key = self.next_component_key();
        let record = match self.component_from_type(type_name, &key, Some(actor)) {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(%actor, type_name, "{err}");
                return None;
            }
        };
        target.borrow_mut().stage_component(key, record.clone());
        Some(record)
    }

    fn remove_component(&mut self, actor: ActorKey, target: ComponentTarget) {
        let Some(owner) = self.lookup(actor) else {
            tracing::warn!(%actor, "remove_component on unknown actor");
            return;
        };
        if !owner.borrow_mut().stage_removal(&target) {
            tracing::warn!(%actor, ?target, "remove_component target not found on actor");
        }
    }

    fn find(&self, name: &str) -> Option<ActorKey> {
        self.candidates()
            .find(|a| a.borrow().name() == name)
            .map(|a| a.borrow().key())
    }

    fn find_all(&self, name: &str) -> Vec<ActorKey> {
        self.candidates()
            .filter(|a| a.borrow().name() == name)
            .map(|a| a.borrow().key())
            .collect()
    }

    fn instantiate(&mut self, template: &str) -> Option<ActorKey> {
        match self.spawn(template) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::error!(template, "{err}; stopping at the end of this phase");
                self.fatal.get_or_insert(err);
                None
            }
        }
    }

    fn destroy(&mut self, actor: ActorKey) {
        let Some(target) = self.lookup(actor) else {
            return;
        };
        {
            let mut target = target.borrow_mut();
            if !target.mark_pending_delete() {
                return;
            }
            target.disable_all();
        }
        tracing::debug!(%actor, "actor destroy staged");
        self.stage_destroy(actor);
    }

    fn dont_destroy(&mut self, actor: ActorKey) {
        if let Some(target) = self.lookup(actor) {
            target.borrow_mut().set_persistent(true);
        }
    }

    fn change_scene(&mut self, name: &str) {
        self.request_scene(name);
    }

    fn current_scene(&self) -> String {
        Registry::current_scene(self).to_owned()
    }

    fn publish(&mut self, event_type: &str, payload: &Fields) {
        let subscribers = self.events.subscribers(event_type);
        if subscribers.is_empty() {
            return;
        }
        let arg = HookArg::Event(payload.clone());
        for Subscription {
            subscriber,
            handler,
        } in subscribers
        {
            let actor_name = subscriber
                .actor()
                .and_then(|key| self.actor_name(key))
                .unwrap_or_default();
            let host: &mut dyn ScriptHost = self;
            if let Err(err) = handler(host, &subscriber, &arg) {
                report_hook_failure(&actor_name, event_type, &err);
            }
        }
    }

    fn subscribe(&mut self, event_type: &str, subscriber: ComponentRef, handler: Hook) {
        self.events
            .subscribe(event_type, Subscription::new(subscriber, handler));
    }

    fn unsubscribe(&mut self, event_type: &str, subscriber: ComponentRef, handler: Hook) {
        self.events
            .unsubscribe(event_type, Subscription::new(subscriber, handler));
    }

    fn quit(&mut self) {
        tracing::debug!(frame = self.frame(), "quit requested");
        self.request_quit();
    }

    fn log(&self, message: &str) {
        tracing::info!(frame = self.frame(), "{message}");
    }
}
