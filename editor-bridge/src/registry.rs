//! Scoped registry for the live controller and engine instance.
//!
//! Sibling widgets (header, title, tags, status bar, toolbar) receive the
//! [`BridgeContext`] from the bridge instead of reaching for a global. The
//! registry lives exactly as long as the mounted bridge: `clear` runs on
//! unmount and subscribers are told the slot is empty.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::controller::Controller;
use crate::engine::{InstanceId, SharedEngine};

pub type BridgeContext = Rc<ControllerRegistry>;

/// One atomic publication. Readers always get a controller and the engine
/// that was current alongside it.
#[derive(Clone)]
pub struct Published {
    pub controller: Rc<Controller>,
    pub editor: Option<SharedEngine>,
    pub generation: u64,
}

impl Published {
    pub fn editor_id(&self) -> Option<InstanceId> {
        self.editor.as_ref().map(|editor| editor.borrow().id())
    }
}

impl std::fmt::Debug for Published {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Published")
            .field("generation", &self.generation)
            .field("controller", &self.controller)
            .field("editor", &self.editor_id())
            .finish()
    }
}

type Listener = Rc<dyn Fn(Option<&Published>)>;

#[derive(Default)]
pub struct ControllerRegistry {
    slot: RefCell<Option<Rc<Published>>>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    generation: Cell<u64>,
}

impl ControllerRegistry {
    pub fn new_context() -> BridgeContext {
        Rc::new(Self::default())
    }

    /// Replace the published pair and notify subscribers.
    pub fn publish(&self, controller: Rc<Controller>, editor: Option<SharedEngine>) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let published = Rc::new(Published {
            controller,
            editor,
            generation,
        });
        self.slot.replace(Some(Rc::clone(&published)));
        tracing::trace!(generation, editor = ?published.editor_id(), "registry published");

        self.notify(Some(&published));
        generation
    }

    /// Swap only the engine, keeping the current controller
    pub fn publish_editor(&self, editor: Option<SharedEngine>) -> Option<u64> {
        let controller = self.controller()?;
        Some(self.publish(controller, editor))
    }

    /// Empty the slot. Called when the bridge unmounts.
    pub fn clear(&self) {
        if self.slot.borrow_mut().take().is_some() {
            tracing::debug!("registry cleared");
            self.notify(None);
        }
    }

    pub fn current(&self) -> Option<Rc<Published>> {
        self.slot.borrow().clone()
    }

    pub fn controller(&self) -> Option<Rc<Controller>> {
        self.current().map(|published| Rc::clone(&published.controller))
    }

    pub fn editor(&self) -> Option<SharedEngine> {
        self.current().and_then(|published| published.editor.clone())
    }

    pub fn is_mounted(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Listen for publications. Dropping the returned guard unsubscribes.
    pub fn subscribe(
        self: &Rc<Self>,
        listener: impl Fn(Option<&Published>) + 'static,
    ) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription {
            registry: Rc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self, published: Option<&Published>) {
        // Snapshot so listeners may subscribe or unsubscribe while notified.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(published);
        }
    }
}

#[must_use = "the subscription ends when this guard is dropped"]
pub struct Subscription {
    registry: std::rc::Weak<ControllerRegistry>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}
