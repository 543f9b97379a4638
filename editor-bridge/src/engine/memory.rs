//! In-memory document engine.
//!
//! Stands in for the real rich-text engine in tests and in the replay tool.
//! Positions follow the usual block-document arithmetic: a text block spans
//! `text_len + 2` positions (open and close token), a leaf block like an
//! image spans one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use shared_types::{AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot};

use super::{EditorEngine, EngineEvents, EngineFactory, EngineOptions, InstanceId, SharedEngine};
use crate::dispatch::Dispatch;
use crate::document::{BlockInfo, BlockKind};
use crate::error::BridgeError;
use crate::permission::Claim;
use crate::target::RenderTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    kind: BlockKind,
    text: String,
    src: Option<String>,
}

impl Block {
    fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            src: None,
        }
    }

    fn size(&self) -> usize {
        match self.kind {
            BlockKind::Image => 1,
            _ => self.text.chars().count() + 2,
        }
    }

    fn info(&self) -> BlockInfo {
        BlockInfo {
            kind: self.kind.clone(),
            text: self.text.clone(),
        }
    }

    fn to_html(&self) -> String {
        match &self.kind {
            BlockKind::Paragraph => format!("<p>{}</p>", self.text),
            BlockKind::Heading => format!("<h1>{}</h1>", self.text),
            BlockKind::Image => format!("<img src=\"{}\">", self.src.as_deref().unwrap_or_default()),
            BlockKind::Other(name) => format!("<div data-type=\"{name}\">{}</div>", self.text),
        }
    }
}

pub struct MemoryEngine {
    id: InstanceId,
    options: EngineOptions,
    events: Rc<dyn EngineEvents>,
    blocks: Vec<Block>,
    caret: Option<usize>,
    undo: Vec<Vec<Block>>,
    redo: Vec<Vec<Block>>,
    destroyed: bool,
}

impl MemoryEngine {
    pub fn new(options: EngineOptions, events: Rc<dyn EngineEvents>) -> Self {
        let blocks = parse_html(&options.content.html);
        Self {
            id: InstanceId::new(),
            options,
            events,
            blocks,
            caret: None,
            undo: Vec::new(),
            redo: Vec::new(),
            destroyed: false,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn events(&self) -> Rc<dyn EngineEvents> {
        Rc::clone(&self.events)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Caret position while focused
    pub fn caret(&self) -> Option<usize> {
        self.caret
    }

    pub fn html(&self) -> String {
        self.blocks.iter().map(Block::to_html).collect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// A user keystroke run: appended to the last text block.
    ///
    /// Rejected when the engine was built read-only.
    pub fn type_text(&mut self, text: &str) -> bool {
        if !self.options.editable || self.destroyed {
            return false;
        }
        self.checkpoint();
        let appendable =
            matches!(self.blocks.last(), Some(block) if block.kind != BlockKind::Image);
        if appendable {
            if let Some(block) = self.blocks.last_mut() {
                block.text.push_str(text);
            }
        } else {
            self.blocks.push(Block::paragraph(text));
        }
        self.caret = Some(self.end_caret());
        self.emit(None);
        true
    }

    /// Programmatic replacement flagged as an ignored edit
    pub fn set_content_silently(&mut self, html: &str) {
        self.blocks = parse_html(html);
        self.caret = None;
        self.emit(Some(true));
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.blocks, previous);
        self.redo.push(current);
        self.emit(None);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.blocks, next);
        self.undo.push(current);
        self.emit(None);
        true
    }

    /// Ask the bridge for an attachment picker, as the attachment tool does
    pub fn request_attachment(&self, kind: AttachmentKind) -> Dispatch<()> {
        self.events.open_attachment_picker(kind)
    }

    pub fn download_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        self.events.download_attachment(attachment)
    }

    pub fn preview_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<()> {
        self.events.preview_attachment(attachment)
    }

    pub fn load_attachment(&self, attachment: &AttachmentDescriptor) -> Dispatch<AttachmentData> {
        self.events.get_attachment_data(attachment)
    }

    /// Returns whether the engine should follow the link itself
    pub fn click_link(&self, url: &str) -> bool {
        !self.events.open_link(url)
    }

    pub fn copy(&self, text: &str) {
        self.events.copy_to_clipboard(text);
    }

    pub fn use_premium_feature(&self) -> bool {
        self.events.check_permission(Claim::Premium)
    }

    fn checkpoint(&mut self) {
        self.undo.push(self.blocks.clone());
        self.redo.clear();
    }

    fn end_caret(&self) -> usize {
        let size = self.content_size();
        match self.blocks.last() {
            Some(block) if block.kind != BlockKind::Image => size.saturating_sub(1),
            _ => size,
        }
    }

    fn emit(&self, ignore_edit: Option<bool>) {
        self.events.on_update(self.snapshot(), ignore_edit);
    }
}

impl EditorEngine for MemoryEngine {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn first_block(&self) -> Option<BlockInfo> {
        self.blocks.first().map(Block::info)
    }

    fn last_block(&self) -> Option<BlockInfo> {
        self.blocks.last().map(Block::info)
    }

    fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    fn focus_end(&mut self) {
        self.caret = Some(self.end_caret());
    }

    fn insert_empty_paragraph(&mut self, pos: usize) {
        self.checkpoint();
        let mut offset = 0;
        let mut index = self.blocks.len();
        for (i, block) in self.blocks.iter().enumerate() {
            if offset >= pos {
                index = i;
                break;
            }
            offset += block.size();
        }
        let start = self.blocks[..index].iter().map(Block::size).sum::<usize>();
        self.blocks.insert(index, Block::paragraph(""));
        self.caret = Some(start + 1);
        self.emit(None);
    }

    fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.html())
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.caret = None;
    }
}

/// Builds [`MemoryEngine`]s and keeps a handle to each for inspection
#[derive(Default)]
pub struct MemoryEngineFactory {
    built: RefCell<Vec<Rc<RefCell<MemoryEngine>>>>,
    fail_next: Cell<bool>,
}

impl MemoryEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn built(&self) -> usize {
        self.built.borrow().len()
    }

    pub fn latest(&self) -> Option<Rc<RefCell<MemoryEngine>>> {
        self.built.borrow().last().cloned()
    }

    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl EngineFactory for MemoryEngineFactory {
    fn create(
        &self,
        target: &Rc<dyn RenderTarget>,
        options: EngineOptions,
        events: Rc<dyn EngineEvents>,
    ) -> Result<SharedEngine, BridgeError> {
        if self.fail_next.replace(false) {
            return Err(BridgeError::EngineConstruction(format!(
                "surface for `{}` could not be created",
                target.id()
            )));
        }
        let engine = Rc::new(RefCell::new(MemoryEngine::new(options, events)));
        self.built.borrow_mut().push(Rc::clone(&engine));
        Ok(engine)
    }
}

fn parse_html(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            push_loose_text(&mut blocks, rest);
            break;
        };
        push_loose_text(&mut blocks, &rest[..open]);
        rest = &rest[open..];

        let Some(tag_end) = rest.find('>') else {
            push_loose_text(&mut blocks, rest);
            break;
        };
        let tag = &rest[1..tag_end];
        let name = tag
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        rest = &rest[tag_end + 1..];

        if name == "img" {
            blocks.push(Block {
                kind: BlockKind::Image,
                text: String::new(),
                src: attribute(tag, "src"),
            });
            continue;
        }
        if name.is_empty() || name.starts_with('/') {
            continue;
        }

        let close = format!("</{name}>");
        let (inner, after) = match rest.find(&close) {
            Some(end) => (&rest[..end], &rest[end + close.len()..]),
            None => (rest, ""),
        };
        let kind = match name.as_str() {
            "p" => BlockKind::Paragraph,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading,
            "div" => BlockKind::Other(attribute(tag, "data-type").unwrap_or_else(|| "div".to_string())),
            other => BlockKind::Other(other.to_string()),
        };
        blocks.push(Block {
            kind,
            text: strip_tags(inner),
            src: None,
        });
        rest = after;
    }

    blocks
}

fn push_loose_text(blocks: &mut Vec<Block>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        blocks.push(Block::paragraph(text));
    }
}

fn strip_tags(inner: &str) -> String {
    let mut text = String::with_capacity(inner.len());
    let mut in_tag = false;
    for c in inner.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(tag[start..start + len].to_string())
}
