//! Host implementation that talks to a native shell over a message channel.
//!
//! Outbound requests become [`HostMessage`]s. Attachment data is the one
//! request that needs an answer: each gets a request id and a pending slot
//! that [`PostMessageHost::resolve_attachment`] fills when the shell replies.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Utc;
use futures::channel::{mpsc, oneshot};
use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, HostMessage,
    ScrollEvent,
};

use crate::error::{BridgeError, HostResult};
use crate::host::{Host, HostReply};

pub struct PostMessageHost {
    outbox: mpsc::UnboundedSender<HostMessage>,
    content: RefCell<Option<DocumentSnapshot>>,
    pending: RefCell<HashMap<u64, oneshot::Sender<Option<AttachmentData>>>>,
    next_request: Cell<u64>,
}

impl PostMessageHost {
    pub fn channel() -> (Rc<Self>, mpsc::UnboundedReceiver<HostMessage>) {
        let (outbox, inbox) = mpsc::unbounded();
        let host = Rc::new(Self {
            outbox,
            content: RefCell::new(None),
            pending: RefCell::new(HashMap::new()),
            next_request: Cell::new(1),
        });
        (host, inbox)
    }

    /// The shell loaded a note (or closed it with `None`)
    pub fn load_content(&self, snapshot: Option<DocumentSnapshot>) {
        self.content.replace(snapshot);
    }

    /// Answer an outstanding attachment request. Returns false for unknown ids.
    pub fn resolve_attachment(&self, request_id: u64, data: Option<AttachmentData>) -> bool {
        let Some(sender) = self.pending.borrow_mut().remove(&request_id) else {
            tracing::warn!(request_id, "attachment reply for unknown request");
            return false;
        };
        // The engine may have dropped the completion already
        let _ = sender.send(data);
        true
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }

    fn post(&self, message: HostMessage) -> HostResult<()> {
        let kind = message.kind();
        self.outbox.unbounded_send(message).map_err(|_| {
            tracing::warn!(kind, "host channel closed, message dropped");
            BridgeError::Disconnected
        })
    }

    fn notify(&self, message: HostMessage) {
        let _ = self.post(message);
    }
}

impl Host for PostMessageHost {
    fn current_content(&self) -> Option<DocumentSnapshot> {
        self.content.borrow().clone()
    }

    fn on_content_change(&self, snapshot: &DocumentSnapshot, ignored_edit: bool) {
        if !ignored_edit {
            self.content.replace(Some(snapshot.clone()));
        }
        self.notify(HostMessage::ContentChange {
            snapshot: snapshot.clone(),
            ignored_edit,
            at: Utc::now(),
        });
    }

    fn open_file_picker(&self, kind: AttachmentKind) -> HostResult<HostReply<()>> {
        self.post(HostMessage::FilePicker { kind })?;
        Ok(HostReply::Ready(()))
    }

    fn download_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        self.post(HostMessage::Download {
            attachment: attachment.clone(),
        })?;
        Ok(HostReply::Ready(()))
    }

    fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        self.post(HostMessage::PreviewAttachment {
            attachment: attachment.clone(),
        })?;
        Ok(HostReply::Ready(()))
    }

    fn get_attachment_data(
        &self,
        attachment: &AttachmentDescriptor,
    ) -> HostResult<HostReply<Option<AttachmentData>>> {
        let request_id = self.next_request.get();
        self.next_request.set(request_id + 1);

        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().insert(request_id, sender);
        if let Err(error) = self.post(HostMessage::GetAttachmentData {
            request_id,
            attachment: attachment.clone(),
        }) {
            self.pending.borrow_mut().remove(&request_id);
            return Err(error);
        }
        tracing::debug!(request_id, hash = %attachment.hash, "attachment data requested");

        Ok(HostReply::pending(async move {
            receiver.await.map_err(|_| BridgeError::Disconnected)
        }))
    }

    fn open_link(&self, url: &str) -> HostResult<bool> {
        self.post(HostMessage::Link {
            url: url.to_string(),
        })?;
        Ok(true)
    }

    fn copy_to_clipboard(&self, text: &str) -> HostResult<()> {
        self.post(HostMessage::CopyToClipboard {
            text: text.to_string(),
        })
    }

    fn set_title_placeholder(&self, text: &str) {
        self.notify(HostMessage::TitlePlaceholder {
            text: text.to_string(),
        });
    }

    fn scroll(&self, event: ScrollEvent) {
        self.notify(HostMessage::Scroll { event });
    }

    fn on_permission_denied(&self) {
        self.notify(HostMessage::Pro);
    }

    fn report_error(&self, error: &BridgeError) {
        tracing::warn!(error = %error, "bridge error");
        self.notify(HostMessage::Error {
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn drain(inbox: &mut mpsc::UnboundedReceiver<HostMessage>) -> Vec<HostMessage> {
        let mut messages = Vec::new();
        while let Ok(Some(message)) = inbox.try_next() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn test_attachment_request_resolves_by_id() {
        let (host, mut inbox) = PostMessageHost::channel();
        let descriptor = AttachmentDescriptor::new(AttachmentKind::Image, "abc");

        let reply = host.get_attachment_data(&descriptor).unwrap();
        let HostReply::Pending(pending) = reply else {
            panic!("attachment data should be asynchronous");
        };

        let messages = drain(&mut inbox);
        let request_id = match messages.as_slice() {
            [HostMessage::GetAttachmentData { request_id, .. }] => *request_id,
            other => panic!("unexpected messages: {other:?}"),
        };
        assert_eq!(host.pending_requests(), 1);

        let data = AttachmentData {
            hash: "abc".to_string(),
            data: "base64".to_string(),
        };
        assert!(host.resolve_attachment(request_id, Some(data.clone())));
        assert!(!host.resolve_attachment(request_id, None));

        let resolved = pending.now_or_never().unwrap().unwrap();
        assert_eq!(resolved, Some(data));
        assert_eq!(host.pending_requests(), 0);
    }

    #[test]
    fn test_closed_channel_reports_disconnected() {
        let (host, inbox) = PostMessageHost::channel();
        drop(inbox);

        let error = host.copy_to_clipboard("text").unwrap_err();
        assert!(matches!(error, BridgeError::Disconnected));

        let descriptor = AttachmentDescriptor::new(AttachmentKind::File, "f");
        assert!(host.get_attachment_data(&descriptor).is_err());
        assert_eq!(host.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_dropped_host_fails_pending_request() {
        let (host, mut inbox) = PostMessageHost::channel();
        let descriptor = AttachmentDescriptor::new(AttachmentKind::Image, "abc");

        let HostReply::Pending(pending) = host.get_attachment_data(&descriptor).unwrap() else {
            panic!("attachment data should be asynchronous");
        };
        assert_eq!(drain(&mut inbox).len(), 1);

        drop(host);

        assert!(matches!(pending.await, Err(BridgeError::Disconnected)));
    }

    #[test]
    fn test_user_edits_update_local_content() {
        let (host, mut inbox) = PostMessageHost::channel();

        host.on_content_change(&DocumentSnapshot::new("<p>a</p>"), true);
        assert_eq!(host.current_content(), None);

        host.on_content_change(&DocumentSnapshot::new("<p>b</p>"), false);
        assert_eq!(host.current_content(), Some(DocumentSnapshot::new("<p>b</p>")));

        let kinds: Vec<_> = drain(&mut inbox).iter().map(HostMessage::kind).collect();
        assert_eq!(kinds, vec!["contentChange", "contentChange"]);
    }
}
