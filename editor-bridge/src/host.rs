//! Contract the host shell fulfils for the bridge.
//!
//! Every side-channel handler has a default body returning
//! [`BridgeError::HandlerUnavailable`], so a host only implements what it
//! supports and the dispatcher treats the rest as absent.

use futures::future::LocalBoxFuture;
use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, ScrollEvent,
};

use crate::error::{BridgeError, HostResult};

/// Answer of a host handler that may complete later.
pub enum HostReply<T> {
    /// Finished while handling the call
    Ready(T),
    /// Accepted; completes on the UI loop later
    Pending(LocalBoxFuture<'static, HostResult<T>>),
}

impl<T> HostReply<T> {
    pub fn pending<F>(future: F) -> Self
    where
        F: std::future::Future<Output = HostResult<T>> + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for HostReply<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostReply::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            HostReply::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

pub trait Host {
    /// Content of the currently loaded note, `None` when no note is loaded
    fn current_content(&self) -> Option<DocumentSnapshot>;

    /// Delivered for every engine update; the host decides whether to persist
    fn on_content_change(&self, snapshot: &DocumentSnapshot, ignored_edit: bool);

    fn open_file_picker(&self, kind: AttachmentKind) -> HostResult<HostReply<()>> {
        let _ = kind;
        Err(BridgeError::unavailable("open_file_picker"))
    }

    fn download_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        let _ = attachment;
        Err(BridgeError::unavailable("download_attachment"))
    }

    fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        let _ = attachment;
        Err(BridgeError::unavailable("preview_attachment"))
    }

    fn get_attachment_data(
        &self,
        attachment: &AttachmentDescriptor,
    ) -> HostResult<HostReply<Option<AttachmentData>>> {
        let _ = attachment;
        Err(BridgeError::unavailable("get_attachment_data"))
    }

    /// `true` when the host handled the link and the editor must not navigate
    fn open_link(&self, url: &str) -> HostResult<bool> {
        let _ = url;
        Err(BridgeError::unavailable("open_link"))
    }

    fn copy_to_clipboard(&self, text: &str) -> HostResult<()> {
        let _ = text;
        Err(BridgeError::unavailable("copy_to_clipboard"))
    }

    fn set_title_placeholder(&self, text: &str) {
        let _ = text;
    }

    fn scroll(&self, event: ScrollEvent) {
        let _ = event;
    }

    fn on_permission_denied(&self) {}

    /// The host's own diagnostic channel for contained failures
    fn report_error(&self, error: &BridgeError) {
        tracing::warn!(error = %error, handler = ?error.handler(), "host handler failure");
    }
}
