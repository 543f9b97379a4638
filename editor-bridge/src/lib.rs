//! Editor bridge
//!
//! Glue between a note app's host shell and the rich-text engine embedded in
//! its web view. The bridge owns no document state of its own: it seeds the
//! engine from the host, forwards every edit back, routes the engine's
//! side-channel requests (attachments, links, clipboard) to host handlers,
//! and decides when the engine has to be rebuilt.
//!
//! Everything runs on the UI thread, so shared state is `Rc` + `RefCell`.

pub mod boundary;
pub mod bridge;
pub mod chrome;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod permission;
pub mod protocol;
pub mod registry;
pub mod replay;
pub mod sync;
pub mod target;
#[doc(hidden)]
pub mod testing;

pub use boundary::{BoundaryAction, BoundaryClickResolver, Zone};
pub use bridge::{Bridge, EngineRouter};
pub use chrome::ChromeState;
pub use config::BridgeConfig;
pub use controller::Controller;
pub use dispatch::{Completion, Dispatch, SideChannelDispatcher};
pub use engine::{EditorEngine, EngineEvents, EngineFactory, EngineOptions, InstanceId, SharedEngine};
pub use error::{BridgeError, HostResult};
pub use host::{Host, HostReply};
pub use lifecycle::{EngineDeps, LifecycleSequencer, LifecycleState, Transition};
pub use protocol::PostMessageHost;
pub use registry::{BridgeContext, ControllerRegistry};
pub use sync::ContentSynchronizer;
pub use target::{ContentStyle, RenderTarget, ScrollBehavior, ScrollContainer};
