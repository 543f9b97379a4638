//! Gestures that land outside the document body.
//!
//! A double tap on the header or the status bar scrolls back to the top if
//! needed, otherwise makes sure the document starts with an empty paragraph
//! and focuses the end of the document. A tap in the empty zone below the
//! document does the same at the tail.

use shared_types::{ZONE_HEADER, ZONE_STATUS_BAR};

use crate::config::BridgeConfig;
use crate::engine::SharedEngine;
use crate::target::{ScrollBehavior, ScrollContainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Header,
    StatusBar,
}

impl Zone {
    pub fn from_element_id(id: &str) -> Option<Self> {
        match id {
            ZONE_HEADER => Some(Self::Header),
            ZONE_STATUS_BAR => Some(Self::StatusBar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAction {
    /// Not a boundary zone
    Ignored,
    ScrolledToOrigin,
    FocusedEnd,
    InsertedParagraph { pos: usize },
    /// Nothing to act on: no engine, or an empty document
    NoOp,
}

#[derive(Debug, Clone)]
pub struct BoundaryClickResolver {
    scroll_behavior: ScrollBehavior,
}

impl BoundaryClickResolver {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            scroll_behavior: if config.smooth_scroll {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Instant
            },
        }
    }

    pub fn double_click(
        &self,
        element_id: &str,
        container: &dyn ScrollContainer,
        engine: Option<&SharedEngine>,
    ) -> BoundaryAction {
        let Some(zone) = Zone::from_element_id(element_id) else {
            return BoundaryAction::Ignored;
        };

        if container.scroll_top() > 0.0 {
            container.scroll_to_origin(self.scroll_behavior);
            tracing::debug!(?zone, "boundary double click scrolled to origin");
            return BoundaryAction::ScrolledToOrigin;
        }

        let Some(engine) = engine else {
            return BoundaryAction::NoOp;
        };
        let mut engine = engine.borrow_mut();
        let Some(first) = engine.first_block() else {
            return BoundaryAction::NoOp;
        };

        let action = if first.is_empty_paragraph() {
            engine.focus_end();
            BoundaryAction::FocusedEnd
        } else {
            engine.insert_empty_paragraph(0);
            engine.focus_end();
            BoundaryAction::InsertedParagraph { pos: 0 }
        };
        tracing::debug!(?zone, ?action, "boundary double click");
        action
    }

    pub fn bottom_tap(&self, engine: Option<&SharedEngine>) -> BoundaryAction {
        let Some(engine) = engine else {
            return BoundaryAction::NoOp;
        };
        let mut engine = engine.borrow_mut();
        let size = engine.content_size();
        if size == 0 {
            return BoundaryAction::NoOp;
        }
        let Some(last) = engine.last_block() else {
            return BoundaryAction::NoOp;
        };

        let action = if last.is_empty_paragraph() {
            engine.focus_end();
            BoundaryAction::FocusedEnd
        } else {
            engine.insert_empty_paragraph(size);
            engine.focus_end();
            BoundaryAction::InsertedParagraph { pos: size }
        };
        tracing::debug!(?action, "bottom zone tap");
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::testing::{engine_options, NullEvents, RecordingScroll};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(html: &str) -> (Rc<RefCell<MemoryEngine>>, SharedEngine) {
        let concrete = Rc::new(RefCell::new(MemoryEngine::new(
            engine_options(html),
            Rc::new(NullEvents),
        )));
        let shared: SharedEngine = concrete.clone();
        (concrete, shared)
    }

    fn resolver() -> BoundaryClickResolver {
        BoundaryClickResolver::new(&BridgeConfig::default())
    }

    #[test]
    fn test_header_on_empty_paragraph_focuses_end() {
        let (concrete, shared) = engine("<p></p>");
        let action = resolver().double_click("header", &*RecordingScroll::at(0.0), Some(&shared));

        assert_eq!(action, BoundaryAction::FocusedEnd);
        assert_eq!(concrete.borrow().block_count(), 1);
        assert_eq!(concrete.borrow().caret(), Some(1));
    }

    #[test]
    fn test_header_on_text_inserts_leading_paragraph() {
        let (concrete, shared) = engine("<p>Hello</p>");
        let action = resolver().double_click("statusbar", &*RecordingScroll::at(0.0), Some(&shared));

        assert_eq!(action, BoundaryAction::InsertedParagraph { pos: 0 });
        assert_eq!(concrete.borrow().html(), "<p></p><p>Hello</p>");
        // end of "Hello": 2 for the empty paragraph, 1 to enter, 5 chars
        assert_eq!(concrete.borrow().caret(), Some(8));
    }

    #[test]
    fn test_header_twice_does_not_duplicate() {
        let (concrete, shared) = engine("<p>Hello</p>");
        let scroll = RecordingScroll::at(0.0);

        resolver().double_click("header", &*scroll, Some(&shared));
        let second = resolver().double_click("header", &*scroll, Some(&shared));

        assert_eq!(second, BoundaryAction::FocusedEnd);
        assert_eq!(concrete.borrow().block_count(), 2);
    }

    #[test]
    fn test_scrolled_header_only_scrolls() {
        let (concrete, shared) = engine("<p>Hello</p>");
        let scroll = RecordingScroll::at(120.0);

        let action = resolver().double_click("header", &*scroll, Some(&shared));

        assert_eq!(action, BoundaryAction::ScrolledToOrigin);
        assert_eq!(scroll.scrolls.borrow().as_slice(), &[ScrollBehavior::Smooth]);
        assert_eq!(scroll.scroll_top(), 0.0);
        assert_eq!(concrete.borrow().caret(), None);
        assert_eq!(concrete.borrow().block_count(), 1);
    }

    #[test]
    fn test_other_zones_are_ignored() {
        let (_, shared) = engine("<p>Hello</p>");
        let action = resolver().double_click("title", &*RecordingScroll::at(0.0), Some(&shared));
        assert_eq!(action, BoundaryAction::Ignored);
    }

    #[test]
    fn test_bottom_tap_on_empty_document_is_noop() {
        let (concrete, shared) = engine("");
        assert_eq!(resolver().bottom_tap(Some(&shared)), BoundaryAction::NoOp);
        assert_eq!(concrete.borrow().block_count(), 0);
        assert_eq!(resolver().bottom_tap(None), BoundaryAction::NoOp);
    }

    #[test]
    fn test_header_on_blockless_document_is_noop() {
        let (concrete, shared) = engine("");
        let action = resolver().double_click("header", &*RecordingScroll::at(0.0), Some(&shared));
        assert_eq!(action, BoundaryAction::NoOp);
        assert_eq!(concrete.borrow().block_count(), 0);
    }

    #[test]
    fn test_bottom_tap_appends_after_text_then_focuses() {
        let (concrete, shared) = engine("<p>Hello</p>");

        assert_eq!(
            resolver().bottom_tap(Some(&shared)),
            BoundaryAction::InsertedParagraph { pos: 7 }
        );
        assert_eq!(concrete.borrow().html(), "<p>Hello</p><p></p>");
        assert_eq!(concrete.borrow().caret(), Some(8));
        assert_eq!(resolver().bottom_tap(Some(&shared)), BoundaryAction::FocusedEnd);
        assert_eq!(concrete.borrow().block_count(), 2);
    }

    #[test]
    fn test_trailing_image_is_not_an_insertion_point() {
        let (concrete, shared) = engine("<p>Hello</p><img src=\"a.png\">");

        let action = resolver().bottom_tap(Some(&shared));

        assert!(matches!(action, BoundaryAction::InsertedParagraph { .. }));
        assert_eq!(concrete.borrow().block_count(), 3);
    }
}
