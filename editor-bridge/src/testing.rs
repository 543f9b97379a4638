//! Recording doubles for the host and the view handles.
//!
//! Test support for this crate's unit and integration tests; not part of the API.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, ScrollEvent, TimeFormat,
};

use crate::config::DEFAULT_TITLE_PLACEHOLDER;
use crate::controller::{ControllerParts, TickCounter, TitleState};
use crate::dispatch::Dispatch;
use crate::engine::{EngineEvents, EngineOptions};
use crate::error::{BridgeError, HostResult};
use crate::host::{Host, HostReply};
use crate::permission::Claim;
use crate::target::{ContentStyle, RenderTarget, ScrollBehavior, ScrollContainer};

#[derive(Default)]
pub struct RecordingHost {
    pub content: RefCell<Option<DocumentSnapshot>>,
    pub changes: RefCell<Vec<(DocumentSnapshot, bool)>>,
    pub pickers: RefCell<Vec<AttachmentKind>>,
    pub downloads: RefCell<Vec<String>>,
    pub previews: RefCell<Vec<String>>,
    pub attachments: RefCell<HashMap<String, AttachmentData>>,
    pub links: RefCell<Vec<String>>,
    pub clipboard: RefCell<Vec<String>>,
    pub placeholders: RefCell<Vec<String>>,
    pub scrolls: RefCell<Vec<ScrollEvent>>,
    pub denied: Cell<u32>,
    pub errors: RefCell<Vec<String>>,
    /// Answer `open_link` with "handled"
    pub handles_links: bool,
    /// Leave `open_link` unimplemented
    pub links_unavailable: bool,
    pub fail_downloads: bool,
    /// Resolve attachment data asynchronously
    pub defer_attachments: bool,
    /// Accept attachment requests, then fail them
    pub fail_deferred_attachments: bool,
}

impl RecordingHost {
    pub fn with_content(html: &str) -> Self {
        Self {
            content: RefCell::new(Some(DocumentSnapshot::new(html))),
            ..Default::default()
        }
    }

    pub fn set_content(&self, html: &str) {
        self.content.replace(Some(DocumentSnapshot::new(html)));
    }
}

impl Host for RecordingHost {
    fn current_content(&self) -> Option<DocumentSnapshot> {
        self.content.borrow().clone()
    }

    fn on_content_change(&self, snapshot: &DocumentSnapshot, ignored_edit: bool) {
        self.changes.borrow_mut().push((snapshot.clone(), ignored_edit));
    }

    fn open_file_picker(&self, kind: AttachmentKind) -> HostResult<HostReply<()>> {
        self.pickers.borrow_mut().push(kind);
        Ok(HostReply::Ready(()))
    }

    fn download_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        if self.fail_downloads {
            return Err(BridgeError::failed("download_attachment", "storage is full"));
        }
        self.downloads.borrow_mut().push(attachment.hash.clone());
        Ok(HostReply::Ready(()))
    }

    fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        self.previews.borrow_mut().push(attachment.hash.clone());
        Ok(HostReply::Ready(()))
    }

    fn get_attachment_data(
        &self,
        attachment: &AttachmentDescriptor,
    ) -> HostResult<HostReply<Option<AttachmentData>>> {
        if self.fail_deferred_attachments {
            return Ok(HostReply::pending(async {
                Err(BridgeError::failed("get_attachment_data", "read failed"))
            }));
        }
        let data = self.attachments.borrow().get(&attachment.hash).cloned();
        if self.defer_attachments {
            return Ok(HostReply::pending(async move { Ok(data) }));
        }
        Ok(HostReply::Ready(data))
    }

    fn open_link(&self, url: &str) -> HostResult<bool> {
        if self.links_unavailable {
            return Err(BridgeError::unavailable("open_link"));
        }
        self.links.borrow_mut().push(url.to_string());
        Ok(self.handles_links)
    }

    fn copy_to_clipboard(&self, text: &str) -> HostResult<()> {
        self.clipboard.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn set_title_placeholder(&self, text: &str) {
        self.placeholders.borrow_mut().push(text.to_string());
    }

    fn scroll(&self, event: ScrollEvent) {
        self.scrolls.borrow_mut().push(event);
    }

    fn on_permission_denied(&self) {
        self.denied.set(self.denied.get() + 1);
    }

    fn report_error(&self, error: &BridgeError) {
        self.errors.borrow_mut().push(error.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingScroll {
    pub top: Cell<f64>,
    pub scrolls: RefCell<Vec<ScrollBehavior>>,
}

impl RecordingScroll {
    pub fn at(top: f64) -> Rc<Self> {
        Rc::new(Self {
            top: Cell::new(top),
            scrolls: RefCell::new(Vec::new()),
        })
    }
}

impl ScrollContainer for RecordingScroll {
    fn scroll_top(&self) -> f64 {
        self.top.get()
    }

    fn scroll_to_origin(&self, behavior: ScrollBehavior) {
        self.top.set(0.0);
        self.scrolls.borrow_mut().push(behavior);
    }
}

#[derive(Debug)]
pub struct RecordingTarget {
    pub id: String,
    pub styles: RefCell<Vec<ContentStyle>>,
}

impl RecordingTarget {
    pub fn new(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            styles: RefCell::new(Vec::new()),
        })
    }
}

impl RenderTarget for RecordingTarget {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply_style(&self, style: &ContentStyle) {
        self.styles.borrow_mut().push(style.clone());
    }
}

/// Engine callbacks that go nowhere
pub struct NullEvents;

impl EngineEvents for NullEvents {
    fn on_update(&self, _snapshot: DocumentSnapshot, _ignore_edit: Option<bool>) {}

    fn open_attachment_picker(&self, _kind: AttachmentKind) -> Dispatch<()> {
        Dispatch::rejected()
    }

    fn download_attachment(&self, _attachment: &AttachmentDescriptor) -> Dispatch<()> {
        Dispatch::rejected()
    }

    fn preview_attachment(&self, _attachment: &AttachmentDescriptor) -> Dispatch<()> {
        Dispatch::rejected()
    }

    fn get_attachment_data(&self, _attachment: &AttachmentDescriptor) -> Dispatch<AttachmentData> {
        Dispatch::rejected()
    }

    fn open_link(&self, _url: &str) -> bool {
        false
    }

    fn copy_to_clipboard(&self, _text: &str) {}

    fn check_permission(&self, _claim: Claim) -> bool {
        false
    }
}

pub fn engine_options(html: &str) -> EngineOptions {
    EngineOptions {
        content: DocumentSnapshot::new(html),
        editable: true,
        double_spaced_lines: false,
        date_format: "DD-MM-YYYY".to_string(),
        time_format: TimeFormat::TwelveHour,
        cors_host: None,
        is_mobile: true,
    }
}

pub fn controller_parts<H: Host + 'static>(
    host: Rc<H>,
    container: Rc<RecordingScroll>,
) -> ControllerParts {
    ControllerParts {
        host,
        generation: 1,
        tick: TickCounter::default(),
        titles: Rc::new(RefCell::new(TitleState::default())),
        container,
        default_placeholder: DEFAULT_TITLE_PLACEHOLDER.to_string(),
    }
}
