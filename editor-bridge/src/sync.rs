//! Content synchronization between the host's note and the live engine.
//!
//! The synchronizer seeds each engine instance from the host and forwards
//! every engine update back, in emission order, tagged with whether it was a
//! programmatic ("ignored") edit. It never persists anything itself.

use std::cell::Cell;

use shared_types::DocumentSnapshot;

use crate::controller::Controller;

#[derive(Debug, Default)]
pub struct ContentSynchronizer {
    delivered: Cell<u64>,
    ignored: Cell<u64>,
}

impl ContentSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content to construct the engine with; no loaded note means an empty document.
    pub fn initial_content(&self, controller: &Controller) -> DocumentSnapshot {
        match controller.content() {
            Some(snapshot) => snapshot,
            None => {
                tracing::debug!("no note loaded, starting with an empty document");
                DocumentSnapshot::default()
            }
        }
    }

    /// Forward one engine update to the host.
    ///
    /// Delivery is unconditional; ignored edits are flagged, not dropped.
    pub fn on_engine_update(
        &self,
        controller: Option<&Controller>,
        snapshot: &DocumentSnapshot,
        ignore_edit: Option<bool>,
    ) {
        let ignored_edit = ignore_edit.unwrap_or(false);
        let Some(controller) = controller else {
            tracing::warn!(ignored_edit, "content change with no mounted controller");
            return;
        };

        self.delivered.set(self.delivered.get() + 1);
        if ignored_edit {
            self.ignored.set(self.ignored.get() + 1);
        }
        tracing::trace!(
            ignored_edit,
            delivered = self.delivered.get(),
            generation = controller.generation(),
            "content change"
        );
        controller.content_change(snapshot, ignored_edit);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.get()
    }

    pub fn ignored(&self) -> u64 {
        self.ignored.get()
    }
}
