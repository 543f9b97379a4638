//! End-to-end bridge behaviour against the in-memory engine.
//!
//! Covers engine reconstruction rules, content delivery, boundary gestures,
//! side-channel containment and registry lifetime.
//!
//! Run:
//!   cargo test -p editor-bridge --test bridge_scenarios_test

use std::cell::RefCell;
use std::rc::Rc;

use editor_bridge::engine::memory::{MemoryEngine, MemoryEngineFactory};
use editor_bridge::testing::{RecordingHost, RecordingScroll, RecordingTarget};
use editor_bridge::{
    BoundaryAction, Bridge, BridgeConfig, EditorEngine, LifecycleState, ScrollBehavior, Transition,
};
use shared_types::{AttachmentData, AttachmentDescriptor, AttachmentKind, ScrollEvent, Settings};

// ─── Harness ────────────────────────────────────────────────────────────────

struct Harness {
    bridge: Bridge,
    host: Rc<RecordingHost>,
    factory: Rc<MemoryEngineFactory>,
    scroll: Rc<RecordingScroll>,
    target: Rc<RecordingTarget>,
}

impl Harness {
    fn engine(&self) -> Rc<RefCell<MemoryEngine>> {
        self.factory.latest().expect("engine should have been built")
    }
}

fn mounted(host: RecordingHost) -> Harness {
    mounted_with(host, Settings::default())
}

fn mounted_with(host: RecordingHost, settings: Settings) -> Harness {
    let host = Rc::new(host);
    let factory = Rc::new(MemoryEngineFactory::new());
    let scroll = RecordingScroll::at(0.0);
    let target = RecordingTarget::new("editor-content");

    let mut bridge = Bridge::mount(
        BridgeConfig::default(),
        host.clone(),
        factory.clone(),
        scroll.clone(),
    );
    assert_eq!(bridge.render(settings), Transition::Deferred);
    assert!(matches!(
        bridge.attach_target(target.clone()),
        Transition::Built(_)
    ));

    Harness {
        bridge,
        host,
        factory,
        scroll,
        target,
    }
}

// ─── Boundary scenarios ─────────────────────────────────────────────────────

#[test]
fn test_scenario_a_empty_paragraph_gets_focus_only() {
    let h = mounted(RecordingHost::with_content("<p></p>"));

    assert_eq!(h.bridge.double_click("header"), BoundaryAction::FocusedEnd);

    let engine = h.engine();
    assert_eq!(engine.borrow().block_count(), 1);
    assert_eq!(engine.borrow().caret(), Some(1));
    assert!(h.host.changes.borrow().is_empty());
}

#[test]
fn test_scenario_b_leading_paragraph_is_inserted_and_focused() {
    let h = mounted(RecordingHost::with_content("<p>Hello</p>"));

    assert_eq!(
        h.bridge.double_click("header"),
        BoundaryAction::InsertedParagraph { pos: 0 }
    );

    let engine = h.engine();
    assert_eq!(engine.borrow().html(), "<p></p><p>Hello</p>");
    assert_eq!(engine.borrow().caret(), Some(8));
    assert_eq!(engine.borrow().caret(), Some(engine.borrow().content_size() - 1));

    let changes = h.host.changes.borrow();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0.html, "<p></p><p>Hello</p>");
    assert!(!changes[0].1);
}

#[test]
fn test_scenario_c_scrolled_content_only_scrolls_back() {
    let h = mounted(RecordingHost::with_content("<p>Hello</p>"));
    h.scroll.top.set(120.0);

    assert_eq!(
        h.bridge.double_click("statusbar"),
        BoundaryAction::ScrolledToOrigin
    );

    assert_eq!(h.scroll.top.get(), 0.0);
    assert_eq!(h.scroll.scrolls.borrow().as_slice(), &[ScrollBehavior::Smooth]);
    assert_eq!(h.engine().borrow().caret(), None);
    assert_eq!(h.engine().borrow().block_count(), 1);
}

#[test]
fn test_scenario_d_bottom_tap_on_empty_document() {
    let h = mounted(RecordingHost::with_content(""));

    assert_eq!(h.bridge.bottom_tap(), BoundaryAction::NoOp);
    assert_eq!(h.engine().borrow().block_count(), 0);
    assert!(h.host.changes.borrow().is_empty());
}

#[test]
fn test_scenario_e_no_loaded_note_starts_empty() {
    let h = mounted(RecordingHost::default());

    let engine = h.engine();
    assert!(engine.borrow().options().content.is_blank());
    assert_eq!(engine.borrow().content_size(), 0);
    assert_eq!(h.bridge.state(), LifecycleState::Ready);
    assert!(h.host.errors.borrow().is_empty());
}

#[test]
fn test_header_double_click_twice_inserts_once() {
    let h = mounted(RecordingHost::with_content("<p>Hello</p>"));

    h.bridge.double_click("header");
    assert_eq!(h.bridge.double_click("header"), BoundaryAction::FocusedEnd);
    assert_eq!(h.engine().borrow().block_count(), 2);
}

#[test]
fn test_bottom_tap_after_trailing_image_appends_paragraph() {
    let h = mounted(RecordingHost::with_content("<p>a</p><img src=\"x.png\">"));

    assert_eq!(
        h.bridge.bottom_tap(),
        BoundaryAction::InsertedParagraph { pos: 4 }
    );
    assert_eq!(
        h.engine().borrow().html(),
        "<p>a</p><img src=\"x.png\"><p></p>"
    );
    assert_eq!(h.bridge.bottom_tap(), BoundaryAction::FocusedEnd);
}

// ─── Reconstruction rules ───────────────────────────────────────────────────

#[test]
fn test_font_change_restyles_without_rebuilding() {
    let mut h = mounted(RecordingHost::with_content("<p>Hello</p>"));
    let before = h.bridge.instance_id();
    h.engine().borrow_mut().type_text("!");

    let transition = h.bridge.render(Settings {
        font_family: "serif".to_string(),
        font_size: 20,
        ..Settings::default()
    });

    assert_eq!(transition, Transition::Unchanged);
    assert_eq!(h.bridge.instance_id(), before);
    assert_eq!(h.factory.built(), 1);
    assert!(h.engine().borrow().can_undo());

    let styles = h.target.styles.borrow();
    let last = styles.last().expect("style applied");
    assert_eq!(last.font_family, "serif");
    assert_eq!(last.font_size, 20);
}

#[test]
fn test_readonly_change_rebuilds_exactly_once() {
    let mut h = mounted(RecordingHost::with_content("<p>Hello</p>"));
    let before = h.bridge.instance_id().unwrap();
    let readonly = Settings {
        readonly: true,
        ..Settings::default()
    };

    let transition = h.bridge.render(readonly.clone());
    assert_eq!(
        transition,
        Transition::Rebuilt {
            previous: before,
            current: h.bridge.instance_id().unwrap(),
        }
    );
    assert_eq!(h.bridge.render(readonly), Transition::Unchanged);
    assert_eq!(h.factory.built(), 2);

    let engine = h.engine();
    assert!(!engine.borrow().options().editable);
    assert!(!engine.borrow_mut().type_text("x"));
}

#[test]
fn test_line_spacing_change_rebuilds_and_drops_padding() {
    let mut h = mounted(RecordingHost::with_content("<p>Hello</p>"));
    let first = h.factory.latest().unwrap();

    let transition = h.bridge.render(Settings {
        double_spaced_lines: true,
        ..Settings::default()
    });

    assert!(matches!(transition, Transition::Rebuilt { .. }));
    assert!(first.borrow().is_destroyed());
    assert!(h.engine().borrow().options().double_spaced_lines);
    assert_eq!(h.target.styles.borrow().last().unwrap().padding_top, 0);
}

#[test]
fn test_update_resyncs_from_host() {
    let mut h = mounted(RecordingHost::with_content("<p>old</p>"));
    h.scroll.top.set(300.0);
    h.host.set_content("<p>new</p>");

    let transition = h.bridge.update();

    assert!(matches!(transition, Transition::Rebuilt { .. }));
    assert_eq!(h.engine().borrow().html(), "<p>new</p>");
    assert_eq!(h.scroll.top.get(), 0.0);
    assert_eq!(h.scroll.scrolls.borrow().as_slice(), &[ScrollBehavior::Instant]);
    assert_eq!(h.host.placeholders.borrow().as_slice(), &["Note title"]);
    assert_eq!(h.engine().borrow().caret(), None);

    assert_eq!(h.bridge.render(Settings::default()), Transition::Unchanged);
    assert_eq!(h.factory.built(), 2);
}

#[test]
fn test_failed_construction_retries_on_next_render() {
    let mut h = mounted(RecordingHost::with_content("<p>Hello</p>"));
    h.factory.fail_next();

    let failed = h.bridge.render(Settings {
        readonly: true,
        ..Settings::default()
    });
    assert_eq!(failed, Transition::Failed);
    assert_eq!(h.bridge.state(), LifecycleState::Reconstructing);
    assert!(h.bridge.context().editor().is_none());
    assert_eq!(h.host.errors.borrow().len(), 1);
    assert_eq!(h.bridge.bottom_tap(), BoundaryAction::NoOp);

    let retried = h.bridge.render(Settings {
        readonly: true,
        ..Settings::default()
    });
    assert!(matches!(retried, Transition::Built(_)));
    assert_eq!(h.bridge.state(), LifecycleState::Ready);
}

#[test]
fn test_second_target_is_ignored() {
    let mut h = mounted(RecordingHost::default());
    let before = h.bridge.instance_id();

    assert_eq!(
        h.bridge.attach_target(RecordingTarget::new("other")),
        Transition::Unchanged
    );
    assert_eq!(h.bridge.instance_id(), before);
}

// ─── Content delivery ───────────────────────────────────────────────────────

#[test]
fn test_ignored_edits_are_delivered_in_order() {
    let h = mounted(RecordingHost::with_content("<p>a</p>"));
    let engine = h.engine();

    engine.borrow_mut().type_text("b");
    engine.borrow_mut().set_content_silently("<p>synced</p>");
    engine.borrow_mut().type_text("!");

    let changes = h.host.changes.borrow();
    let delivered: Vec<(&str, bool)> = changes
        .iter()
        .map(|(snapshot, ignored)| (snapshot.html.as_str(), *ignored))
        .collect();
    assert_eq!(
        delivered,
        vec![
            ("<p>ab</p>", false),
            ("<p>synced</p>", true),
            ("<p>synced!</p>", false),
        ]
    );
    assert_eq!(h.bridge.router().synchronizer().delivered(), 3);
    assert_eq!(h.bridge.router().synchronizer().ignored(), 1);
}

#[test]
fn test_long_lived_engine_reaches_latest_controller() {
    let mut h = mounted(RecordingHost::with_content("<p>a</p>"));
    h.bridge.render(Settings::default());
    h.bridge.render(Settings::default());

    h.engine().borrow_mut().type_text("b");

    assert_eq!(h.factory.built(), 1);
    assert_eq!(h.bridge.controller().unwrap().generation(), 3);
    assert_eq!(h.host.changes.borrow().len(), 1);
}

#[test]
fn test_scroll_is_forwarded() {
    let h = mounted(RecordingHost::default());
    let event = ScrollEvent {
        scroll_top: 40.0,
        scroll_height: 900.0,
        client_height: 600.0,
    };

    h.bridge.scroll(event);

    assert_eq!(h.host.scrolls.borrow().as_slice(), &[event]);
}

// ─── Side channels ──────────────────────────────────────────────────────────

#[test]
fn test_failing_download_is_contained() {
    let h = mounted(RecordingHost {
        fail_downloads: true,
        ..RecordingHost::with_content("<p>a</p>")
    });
    let attachment = AttachmentDescriptor::new(AttachmentKind::File, "f1");

    let dispatch = h.engine().borrow().download_attachment(&attachment);

    assert!(!dispatch.is_accepted());
    assert_eq!(h.host.errors.borrow().len(), 1);
    assert!(h.host.errors.borrow()[0].contains("download_attachment"));
}

#[test]
fn test_link_decisions() {
    let handled = mounted(RecordingHost {
        handles_links: true,
        ..RecordingHost::default()
    });
    assert!(!handled.engine().borrow().click_link("https://example.com"));
    assert_eq!(handled.host.links.borrow().as_slice(), &["https://example.com"]);

    let missing = mounted(RecordingHost {
        links_unavailable: true,
        ..RecordingHost::default()
    });
    assert!(missing.engine().borrow().click_link("https://example.com"));
    assert_eq!(missing.host.errors.borrow().len(), 1);
}

#[test]
fn test_picker_and_clipboard_reach_host() {
    let h = mounted(RecordingHost::default());
    let engine = h.engine();

    assert!(engine.borrow().request_attachment(AttachmentKind::Camera).is_accepted());
    engine.borrow().copy("copied text");

    assert_eq!(h.host.pickers.borrow().as_slice(), &[AttachmentKind::Camera]);
    assert_eq!(h.host.clipboard.borrow().as_slice(), &["copied text"]);
}

#[tokio::test]
async fn test_deferred_attachment_data_passes_through() {
    let host = RecordingHost {
        defer_attachments: true,
        ..RecordingHost::default()
    };
    let data = AttachmentData {
        hash: "img1".to_string(),
        data: "data:image/png;base64,AAAA".to_string(),
    };
    host.attachments
        .borrow_mut()
        .insert("img1".to_string(), data.clone());
    let h = mounted(host);

    let present = h
        .engine()
        .borrow()
        .load_attachment(&AttachmentDescriptor::new(AttachmentKind::Image, "img1"));
    let missing = h
        .engine()
        .borrow()
        .load_attachment(&AttachmentDescriptor::new(AttachmentKind::Image, "nope"));

    assert!(present.is_accepted());
    assert_eq!(present.into_completion().await, Some(data));
    assert_eq!(missing.into_completion().await, None);
}

#[test]
fn test_premium_gate_follows_settings() {
    let mut h = mounted(RecordingHost::default());

    assert!(!h.engine().borrow().use_premium_feature());
    assert_eq!(h.host.denied.get(), 1);

    h.bridge.render(Settings {
        premium: true,
        ..Settings::default()
    });
    assert!(h.engine().borrow().use_premium_feature());
    assert_eq!(h.host.denied.get(), 1);
}

// ─── Registry lifetime ──────────────────────────────────────────────────────

#[test]
fn test_subscribers_see_publications_and_unmount() {
    let mut h = mounted(RecordingHost::default());
    let context = h.bridge.context();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let subscription = context.subscribe(move |published| {
        sink.borrow_mut()
            .push(published.map(|p| p.controller.generation()));
    });

    h.bridge.render(Settings::default());
    h.bridge.unmount();
    h.bridge.unmount();

    assert_eq!(seen.borrow().as_slice(), &[Some(2), None]);
    assert!(!context.is_mounted());
    assert!(context.editor().is_none());
    assert!(h.engine().borrow().is_destroyed());
    assert_eq!(h.bridge.state(), LifecycleState::Unready);
    drop(subscription);
}

#[test]
fn test_dropped_subscription_stops_notifications() {
    let mut h = mounted(RecordingHost::default());
    let context = h.bridge.context();
    let seen = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&seen);
    let subscription = context.subscribe(move |_| *sink.borrow_mut() += 1);
    h.bridge.render(Settings::default());
    drop(subscription);
    h.bridge.render(Settings::default());

    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_chrome_waits_for_layout() {
    let host = Rc::new(RecordingHost::default());
    let mut bridge = Bridge::mount(
        BridgeConfig::default(),
        host,
        Rc::new(MemoryEngineFactory::new()),
        RecordingScroll::at(0.0),
    );
    assert!(bridge.chrome().is_none());

    bridge.render(Settings::default());
    assert!(bridge.chrome().unwrap().toolbar.is_none());

    bridge.attach_target(RecordingTarget::new("editor-content"));
    let chrome = bridge.chrome().unwrap();
    assert!(chrome.toolbar.is_some());
    assert!(chrome.header.visible);
    assert!(!chrome.header.has_undo);
}
