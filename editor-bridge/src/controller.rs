//! The facade the host and the sibling widgets drive the editor through.
//!
//! A new `Controller` is built on every render. State that must survive a
//! render (title, placeholder, tick) lives in shared cells owned by the
//! bridge, so a sibling holding last render's controller reads the same
//! values as one holding the new controller.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, ScrollEvent,
};

use crate::error::HostResult;
use crate::host::{Host, HostReply};
use crate::target::{ScrollBehavior, ScrollContainer};

/// Manual resync counter. Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct TickCounter(Rc<Cell<u64>>);

impl TickCounter {
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    pub fn bump(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleState {
    pub title: String,
    pub placeholder: String,
}

pub struct ControllerParts {
    pub host: Rc<dyn Host>,
    pub generation: u64,
    pub tick: TickCounter,
    pub titles: Rc<RefCell<TitleState>>,
    pub container: Rc<dyn ScrollContainer>,
    pub default_placeholder: String,
}

pub struct Controller {
    host: Rc<dyn Host>,
    generation: u64,
    tick: TickCounter,
    titles: Rc<RefCell<TitleState>>,
    container: Rc<dyn ScrollContainer>,
    default_placeholder: String,
}

impl Controller {
    pub fn new(parts: ControllerParts) -> Self {
        Self {
            host: parts.host,
            generation: parts.generation,
            tick: parts.tick,
            titles: parts.titles,
            container: parts.container,
            default_placeholder: parts.default_placeholder,
        }
    }

    /// Render that produced this controller
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    pub fn content(&self) -> Option<DocumentSnapshot> {
        self.host.current_content()
    }

    pub fn content_change(&self, snapshot: &DocumentSnapshot, ignored_edit: bool) {
        self.host.on_content_change(snapshot, ignored_edit);
    }

    pub fn title(&self) -> String {
        self.titles.borrow().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.titles.borrow_mut().title = title.into();
    }

    pub fn title_placeholder(&self) -> String {
        self.titles.borrow().placeholder.clone()
    }

    pub fn set_title_placeholder(&self, text: &str) {
        self.titles.borrow_mut().placeholder = text.to_string();
        self.host.set_title_placeholder(text);
    }

    pub fn scroll(&self, event: ScrollEvent) {
        self.host.scroll(event);
    }

    pub fn open_file_picker(&self, kind: AttachmentKind) -> HostResult<HostReply<()>> {
        self.host.open_file_picker(kind)
    }

    pub fn download_attachment(
        &self,
        attachment: &AttachmentDescriptor,
    ) -> HostResult<HostReply<()>> {
        self.host.download_attachment(attachment)
    }

    pub fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> HostResult<HostReply<()>> {
        self.host.preview_attachment(attachment)
    }

    pub fn get_attachment_data(
        &self,
        attachment: &AttachmentDescriptor,
    ) -> HostResult<HostReply<Option<AttachmentData>>> {
        self.host.get_attachment_data(attachment)
    }

    pub fn open_link(&self, url: &str) -> HostResult<bool> {
        self.host.open_link(url)
    }

    pub fn copy_to_clipboard(&self, text: &str) -> HostResult<()> {
        self.host.copy_to_clipboard(text)
    }

    pub fn tick(&self) -> u64 {
        self.tick.get()
    }

    /// Host pushed content out of band: force a resync on the next render.
    ///
    /// Only the scroll position and the title placeholder are reset; caret
    /// and focus are left to the rebuilt engine.
    pub fn update(&self) -> u64 {
        let tick = self.tick.bump();
        self.container.scroll_to_origin(ScrollBehavior::Instant);
        self.set_title_placeholder(&self.default_placeholder);
        tracing::debug!(tick, generation = self.generation, "resync requested");
        tick
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("generation", &self.generation)
            .field("tick", &self.tick.get())
            .finish_non_exhaustive()
    }
}
