//! Contracts between the bridge and the embedded document engine.
//!
//! The engine itself (schema, parsing, formatting commands) lives outside
//! this crate. The bridge only needs to build it, ask it a few questions
//! about its first and last blocks, and issue caret commands.

pub mod memory;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, TimeFormat,
};
use uuid::Uuid;

use crate::dispatch::Dispatch;
use crate::document::BlockInfo;
use crate::error::BridgeError;
use crate::permission::Claim;
use crate::target::RenderTarget;

/// Identity of one engine instance. A rebuild always yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything an engine is constructed from
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub content: DocumentSnapshot,
    pub editable: bool,
    pub double_spaced_lines: bool,
    pub date_format: String,
    pub time_format: TimeFormat,
    pub cors_host: Option<String>,
    pub is_mobile: bool,
}

pub trait EditorEngine {
    fn id(&self) -> InstanceId;

    fn first_block(&self) -> Option<BlockInfo>;

    fn last_block(&self) -> Option<BlockInfo>;

    /// Size of the document content in engine positions
    fn content_size(&self) -> usize;

    /// Focus the surface with the caret at the end of the document
    fn focus_end(&mut self);

    /// Insert an empty paragraph at `pos` and select it
    fn insert_empty_paragraph(&mut self, pos: usize);

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;

    fn snapshot(&self) -> DocumentSnapshot;

    /// Tear down the surface. The instance is not used afterwards.
    fn destroy(&mut self);
}

pub type SharedEngine = Rc<RefCell<dyn EditorEngine>>;

/// Callbacks the engine invokes on the bridge.
///
/// Implementations must not borrow the calling engine.
pub trait EngineEvents {
    /// `ignore_edit` is the transaction's ignore marker, absent on user edits
    fn on_update(&self, snapshot: DocumentSnapshot, ignore_edit: Option<bool>);

    fn open_attachment_picker(&self, kind: AttachmentKind) -> Dispatch<()>;

    fn download_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()>;

    fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()>;

    fn get_attachment_data(&self, attachment: &AttachmentDescriptor) -> Dispatch<AttachmentData>;

    /// `true` suppresses the engine's own navigation
    fn open_link(&self, url: &str) -> bool;

    fn copy_to_clipboard(&self, text: &str);

    fn check_permission(&self, claim: Claim) -> bool;
}

pub trait EngineFactory {
    fn create(
        &self,
        target: &Rc<dyn RenderTarget>,
        options: EngineOptions,
        events: Rc<dyn EngineEvents>,
    ) -> Result<SharedEngine, BridgeError>;
}
