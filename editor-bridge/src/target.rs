//! View-side handles: the node the engine mounts into and the scroll
//! container around it.

use shared_types::Settings;

use crate::config::BridgeConfig;

/// Style of the content area. Applied to the mounted node in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStyle {
    pub font_family: String,
    pub font_size: u32,
    pub padding_top: u32,
}

impl ContentStyle {
    pub fn from_settings(settings: &Settings, config: &BridgeConfig) -> Self {
        Self {
            font_family: settings.font_family.clone(),
            font_size: settings.font_size,
            padding_top: if settings.double_spaced_lines {
                0
            } else {
                config.content_padding
            },
        }
    }
}

/// The node the editor engine attaches its surface to
pub trait RenderTarget {
    fn id(&self) -> &str;

    fn apply_style(&self, style: &ContentStyle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Scrollable container wrapping the title, the document and the bottom zone
pub trait ScrollContainer {
    fn scroll_top(&self) -> f64;

    fn scroll_to_origin(&self, behavior: ScrollBehavior);
}
