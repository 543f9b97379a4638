//! Scripted sessions against the in-memory engine.
//!
//! A script is JSON lines, one [`ReplayStep`] per line. Blank lines and lines
//! starting with `#` are skipped. Every message the bridge posts to the shell
//! is written out as a JSON line, in order.

use std::cell::{Cell, RefCell};
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::FutureExt;
use serde::Deserialize;
use shared_types::{
    AttachmentData, AttachmentDescriptor, AttachmentKind, DocumentSnapshot, HostMessage,
    ScrollEvent, Settings,
};

use crate::boundary::BoundaryAction;
use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::dispatch::Completion;
use crate::engine::memory::{MemoryEngine, MemoryEngineFactory};
use crate::error::BridgeError;
use crate::lifecycle::Transition;
use crate::protocol::PostMessageHost;
use crate::target::{ContentStyle, RenderTarget, ScrollBehavior, ScrollContainer};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ReplayStep {
    Render {
        #[serde(default)]
        settings: Settings,
    },
    Attach {
        #[serde(default = "default_target_id")]
        target: String,
    },
    /// The shell loads a note, or closes it with `null`
    LoadContent { html: Option<String> },
    Update,
    Type { text: String },
    /// Programmatic replacement, reported as an ignored edit
    SetContent { html: String },
    Undo,
    DoubleClick { zone: String },
    BottomTap,
    Scroll {
        scroll_top: f64,
        #[serde(default)]
        scroll_height: f64,
        #[serde(default)]
        client_height: f64,
    },
    PickAttachment { kind: AttachmentKind },
    Download { attachment: AttachmentDescriptor },
    Preview { attachment: AttachmentDescriptor },
    LoadAttachment { attachment: AttachmentDescriptor },
    ResolveAttachment {
        request_id: u64,
        data: Option<AttachmentData>,
    },
    OpenLink { url: String },
    Copy { text: String },
    PremiumFeature,
    Unmount,
}

fn default_target_id() -> String {
    "editor-content".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub messages: usize,
    pub engines_built: usize,
    pub attachments_loaded: usize,
}

#[derive(Debug, Default)]
struct Viewport {
    top: Cell<f64>,
}

impl ScrollContainer for Viewport {
    fn scroll_top(&self) -> f64 {
        self.top.get()
    }

    fn scroll_to_origin(&self, behavior: ScrollBehavior) {
        tracing::debug!(?behavior, from = self.top.get(), "viewport scrolled to origin");
        self.top.set(0.0);
    }
}

struct LoggedTarget {
    id: String,
}

impl RenderTarget for LoggedTarget {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply_style(&self, style: &ContentStyle) {
        tracing::debug!(
            target_id = %self.id,
            font_family = %style.font_family,
            font_size = style.font_size,
            padding_top = style.padding_top,
            "content style applied"
        );
    }
}

pub struct ReplaySession {
    bridge: Bridge,
    host: Rc<PostMessageHost>,
    factory: Rc<MemoryEngineFactory>,
    viewport: Rc<Viewport>,
    inbox: mpsc::UnboundedReceiver<HostMessage>,
    loads: Vec<(String, Completion<AttachmentData>)>,
    attachments_loaded: usize,
}

impl ReplaySession {
    pub fn new(config: BridgeConfig) -> Self {
        let (host, inbox) = PostMessageHost::channel();
        let factory = Rc::new(MemoryEngineFactory::new());
        let viewport = Rc::new(Viewport::default());
        let bridge = Bridge::mount(config, host.clone(), factory.clone(), viewport.clone());

        Self {
            bridge,
            host,
            factory,
            viewport,
            inbox,
            loads: Vec::new(),
            attachments_loaded: 0,
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn engines_built(&self) -> usize {
        self.factory.built()
    }

    pub fn attachments_loaded(&self) -> usize {
        self.attachments_loaded
    }

    fn engine(&self) -> Option<Rc<RefCell<MemoryEngine>>> {
        self.factory
            .latest()
            .filter(|engine| !engine.borrow().is_destroyed())
    }

    pub fn apply(&mut self, step: ReplayStep) {
        match step {
            ReplayStep::Render { settings } => {
                let transition = self.bridge.render(settings);
                log_transition("render", transition);
            }
            ReplayStep::Attach { target } => {
                let transition = self.bridge.attach_target(Rc::new(LoggedTarget { id: target }));
                log_transition("attach", transition);
            }
            ReplayStep::LoadContent { html } => {
                self.host.load_content(html.map(DocumentSnapshot::new));
            }
            ReplayStep::Update => {
                let transition = self.bridge.update();
                log_transition("update", transition);
            }
            ReplayStep::Type { text } => {
                if let Some(engine) = self.engine() {
                    if !engine.borrow_mut().type_text(&text) {
                        tracing::info!("typing rejected by a read-only engine");
                    }
                }
            }
            ReplayStep::SetContent { html } => {
                if let Some(engine) = self.engine() {
                    engine.borrow_mut().set_content_silently(&html);
                }
            }
            ReplayStep::Undo => {
                if let Some(engine) = self.engine() {
                    engine.borrow_mut().undo();
                }
            }
            ReplayStep::DoubleClick { zone } => {
                log_action("double_click", self.bridge.double_click(&zone));
            }
            ReplayStep::BottomTap => {
                log_action("bottom_tap", self.bridge.bottom_tap());
            }
            ReplayStep::Scroll {
                scroll_top,
                scroll_height,
                client_height,
            } => {
                self.viewport.top.set(scroll_top);
                self.bridge.scroll(ScrollEvent {
                    scroll_top,
                    scroll_height,
                    client_height,
                });
            }
            ReplayStep::PickAttachment { kind } => {
                if let Some(engine) = self.engine() {
                    let dispatch = engine.borrow().request_attachment(kind);
                    tracing::info!(accepted = dispatch.is_accepted(), "attachment picker");
                }
            }
            ReplayStep::Download { attachment } => {
                if let Some(engine) = self.engine() {
                    let dispatch = engine.borrow().download_attachment(&attachment);
                    tracing::info!(accepted = dispatch.is_accepted(), "download");
                }
            }
            ReplayStep::Preview { attachment } => {
                if let Some(engine) = self.engine() {
                    let dispatch = engine.borrow().preview_attachment(&attachment);
                    tracing::info!(accepted = dispatch.is_accepted(), "preview");
                }
            }
            ReplayStep::LoadAttachment { attachment } => {
                if let Some(engine) = self.engine() {
                    let dispatch = engine.borrow().load_attachment(&attachment);
                    if dispatch.is_accepted() {
                        self.loads.push((attachment.hash, dispatch.into_completion()));
                    }
                }
            }
            ReplayStep::ResolveAttachment { request_id, data } => {
                self.host.resolve_attachment(request_id, data);
            }
            ReplayStep::OpenLink { url } => {
                if let Some(engine) = self.engine() {
                    let navigated = engine.borrow().click_link(&url);
                    tracing::info!(%url, navigated, "link clicked");
                }
            }
            ReplayStep::Copy { text } => {
                if let Some(engine) = self.engine() {
                    engine.borrow().copy(&text);
                }
            }
            ReplayStep::PremiumFeature => {
                if let Some(engine) = self.engine() {
                    let allowed = engine.borrow().use_premium_feature();
                    tracing::info!(allowed, "premium feature");
                }
            }
            ReplayStep::Unmount => self.bridge.unmount(),
        }
        self.poll_loads();
    }

    /// Messages posted since the last drain
    pub fn drain(&mut self) -> Vec<HostMessage> {
        let mut messages = Vec::new();
        while let Ok(Some(message)) = self.inbox.try_next() {
            messages.push(message);
        }
        messages
    }

    fn poll_loads(&mut self) {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut loaded = 0;
        self.loads.retain_mut(|(hash, completion)| {
            match completion.poll_unpin(&mut cx) {
                Poll::Ready(Some(data)) => {
                    tracing::info!(%hash, bytes = data.data.len(), "attachment loaded");
                    loaded += 1;
                    false
                }
                Poll::Ready(None) => {
                    tracing::info!(%hash, "attachment not available");
                    false
                }
                Poll::Pending => true,
            }
        });
        self.attachments_loaded += loaded;
    }
}

fn log_transition(step: &'static str, transition: Transition) {
    tracing::info!(step, ?transition, "lifecycle");
}

fn log_action(step: &'static str, action: BoundaryAction) {
    tracing::info!(step, ?action, "boundary gesture");
}

/// Run a script from `reader`, writing posted messages to `writer`.
pub fn run_script<R: BufRead, W: Write>(
    config: BridgeConfig,
    reader: R,
    mut writer: W,
) -> Result<ReplaySummary, BridgeError> {
    let mut session = ReplaySession::new(config);
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step: ReplayStep = serde_json::from_str(trimmed).map_err(|error| {
            tracing::error!(line = index + 1, error = %error, "invalid replay step");
            error
        })?;
        session.apply(step);
        summary.steps += 1;

        for message in session.drain() {
            serde_json::to_writer(&mut writer, &message)?;
            writer.write_all(b"\n")?;
            summary.messages += 1;
        }
    }
    writer.flush()?;

    summary.engines_built = session.engines_built();
    summary.attachments_loaded = session.attachments_loaded();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parsing() {
        let step: ReplayStep =
            serde_json::from_str(r#"{"step":"double_click","zone":"header"}"#).unwrap();
        assert!(matches!(step, ReplayStep::DoubleClick { zone } if zone == "header"));

        let step: ReplayStep = serde_json::from_str(r#"{"step":"attach"}"#).unwrap();
        assert!(matches!(step, ReplayStep::Attach { target } if target == "editor-content"));

        assert!(serde_json::from_str::<ReplayStep>(r#"{"step":"explode"}"#).is_err());
    }

    #[test]
    fn test_session_types_and_reports() {
        let mut session = ReplaySession::new(BridgeConfig::default());
        session.apply(ReplayStep::LoadContent {
            html: Some("<p>Hi</p>".to_string()),
        });
        session.apply(ReplayStep::Render {
            settings: Settings::default(),
        });
        session.apply(ReplayStep::Attach {
            target: default_target_id(),
        });
        session.drain();

        session.apply(ReplayStep::Type {
            text: "!".to_string(),
        });

        let messages = session.drain();
        assert!(matches!(
            messages.as_slice(),
            [HostMessage::ContentChange { snapshot, ignored_edit: false, .. }]
                if snapshot.html == "<p>Hi!</p>"
        ));
        assert_eq!(session.engines_built(), 1);
    }
}
