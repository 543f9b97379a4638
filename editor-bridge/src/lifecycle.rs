//! Lifecycle sequencing of the engine instance.
//!
//! ```text
//!   Unready --attach_target--> Ready --deps changed--> Reconstructing
//!                                ^                          |
//!                                +-------- built -----------+
//! ```
//!
//! The dependency set is exactly `{readonly, double_spaced_lines, tick}`.
//! Font family and size are cosmetic and go through [`LifecycleSequencer::restyle`],
//! which touches the render target but never the engine, so the caret and
//! the undo history survive.

use std::rc::Rc;

use shared_types::Settings;

use crate::engine::{InstanceId, SharedEngine};
use crate::error::BridgeError;
use crate::target::{ContentStyle, RenderTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unready,
    Ready,
    Reconstructing,
}

/// Inputs whose change forces a new engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDeps {
    pub readonly: bool,
    pub double_spaced_lines: bool,
    pub tick: u64,
}

impl EngineDeps {
    pub fn new(settings: &Settings, tick: u64) -> Self {
        Self {
            readonly: settings.readonly,
            double_spaced_lines: settings.double_spaced_lines,
            tick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No render target yet; construction waits for `attach_target`
    Deferred,
    Built(InstanceId),
    Rebuilt {
        previous: InstanceId,
        current: InstanceId,
    },
    Unchanged,
    /// Construction failed; the next sync retries
    Failed,
}

impl Transition {
    /// Id of the instance this transition produced, if any
    pub fn instance(&self) -> Option<InstanceId> {
        match self {
            Transition::Built(id) | Transition::Rebuilt { current: id, .. } => Some(*id),
            _ => None,
        }
    }
}

pub struct LifecycleSequencer {
    state: LifecycleState,
    target: Option<Rc<dyn RenderTarget>>,
    engine: Option<SharedEngine>,
    deps: Option<EngineDeps>,
    style: Option<ContentStyle>,
}

impl Default for LifecycleSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSequencer {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unready,
            target: None,
            engine: None,
            deps: None,
            style: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn engine(&self) -> Option<SharedEngine> {
        self.engine.clone()
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        self.engine.as_ref().map(|engine| engine.borrow().id())
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Record the render target. Happens once per mount; later calls are ignored.
    pub fn attach_target(&mut self, target: Rc<dyn RenderTarget>) -> bool {
        if self.target.is_some() {
            tracing::warn!(target_id = target.id(), "render target already attached, ignoring");
            return false;
        }
        tracing::debug!(target_id = target.id(), "render target attached");
        if let Some(style) = &self.style {
            target.apply_style(style);
        }
        self.target = Some(target);
        self.state = LifecycleState::Ready;
        true
    }

    /// Bring the engine in line with `deps`, building through `build` when needed.
    pub fn sync<F>(&mut self, deps: EngineDeps, build: F) -> Transition
    where
        F: FnOnce(&Rc<dyn RenderTarget>) -> Result<SharedEngine, BridgeError>,
    {
        let Some(target) = self.target.clone() else {
            tracing::debug!("engine construction deferred until the render target exists");
            return Transition::Deferred;
        };

        if self.state == LifecycleState::Ready
            && self.engine.is_some()
            && self.deps == Some(deps)
        {
            return Transition::Unchanged;
        }

        let previous = self.discard();
        self.state = LifecycleState::Reconstructing;

        match build(&target) {
            Ok(engine) => {
                let current = engine.borrow().id();
                self.engine = Some(engine);
                self.deps = Some(deps);
                self.state = LifecycleState::Ready;
                tracing::debug!(
                    instance_id = %current,
                    readonly = deps.readonly,
                    double_spaced_lines = deps.double_spaced_lines,
                    tick = deps.tick,
                    "engine built"
                );
                match previous {
                    Some(previous) => Transition::Rebuilt { previous, current },
                    None => Transition::Built(current),
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "engine construction failed");
                self.deps = None;
                Transition::Failed
            }
        }
    }

    /// Apply a cosmetic style change in place. Returns whether the target was touched.
    pub fn restyle(&mut self, style: ContentStyle) -> bool {
        if self.style.as_ref() == Some(&style) {
            return false;
        }
        let applied = match &self.target {
            Some(target) => {
                target.apply_style(&style);
                true
            }
            None => false,
        };
        self.style = Some(style);
        applied
    }

    /// Drop the engine on unmount
    pub fn teardown(&mut self) -> Option<InstanceId> {
        let previous = self.discard();
        self.deps = None;
        self.target = None;
        self.state = LifecycleState::Unready;
        previous
    }

    fn discard(&mut self) -> Option<InstanceId> {
        let engine = self.engine.take()?;
        let mut engine = engine.borrow_mut();
        let id = engine.id();
        engine.destroy();
        tracing::debug!(instance_id = %id, "engine discarded");
        Some(id)
    }
}
