use crate::actor::ActorRef;
use crate::native::{Contact, ContactPhase};
use crate::registry::Registry;
use stagehand_common::NativeHandle;
use stagehand_ecs::{Collision, HookArg, HookName, NO_CONTACT};

/// Which hook a contact maps to. Mixed sensor/solid pairs raise nothing.
fn contact_hook(contact: &Contact) -> Option<HookName> {
    match (contact.a.sensor, contact.b.sensor, contact.phase) {
        (false, false, ContactPhase::Begin) => Some(HookName::OnCollisionEnter),
        (false, false, ContactPhase::End) => Some(HookName::OnCollisionExit),
        (true, true, ContactPhase::Begin) => Some(HookName::OnTriggerEnter),
        (true, true, ContactPhase::End) => Some(HookName::OnTriggerExit),
        _ => None,
    }
}

impl Registry {
    /// Route one backend contact to both actors' components. Each side sees
    /// the other actor; the point and normal are only real for a beginning
    /// solid contact.
    pub fn dispatch_contact(&mut self, contact: &Contact) {
        let Some(hook) = contact_hook(contact) else {
            return;
        };
        let (Some(a), Some(b)) = (
            self.contact_actor(contact.a.handle),
            self.contact_actor(contact.b.handle),
        ) else {
            tracing::trace!(?contact, "contact involves a missing or dying actor");
            return;
        };

        let (point, normal) = if hook == HookName::OnCollisionEnter {
            (contact.point, contact.normal)
        } else {
            (NO_CONTACT, NO_CONTACT)
        };
        let key_a = a.borrow().key();
        let key_b = b.borrow().key();
        let seen_from = |other| Collision {
            other,
            point,
            normal,
            relative_velocity: contact.relative_velocity,
        };

        self.collide(&a, hook, seen_from(key_b));
        self.collide(&b, hook, seen_from(key_a));
    }

    fn contact_actor(&self, handle: NativeHandle) -> Option<ActorRef> {
        let owner = self.handles.owner(handle)?;
        let actor = self.actor(owner)?;
        if actor.borrow().is_pending_delete() {
            return None;
        }
        Some(actor)
    }

    fn collide(&mut self, actor: &ActorRef, hook: HookName, collision: Collision) {
        let (name, snapshot) = {
            let actor = actor.borrow();
            (actor.name().to_owned(), actor.snapshot())
        };
        let arg = HookArg::Collision(collision);
        for (_, component) in snapshot {
            if component.is_enabled() {
                self.invoke(&name, &component, hook, &arg);
            }
        }
    }
}
