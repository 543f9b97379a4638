//! Props for the widgets around the editor surface.

use shared_types::Settings;

use crate::config::BridgeConfig;
use crate::engine::SharedEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderState {
    pub visible: bool,
    pub has_undo: bool,
    pub has_redo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    pub visible: bool,
    pub tools: Vec<String>,
    pub default_font_family: String,
    pub default_font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeState {
    pub header: HeaderState,
    /// Tags, title and status bar sit above the document unless the header is off
    pub show_title_area: bool,
    /// Mounted only once the render target exists
    pub toolbar: Option<ToolbarState>,
    pub bottom_zone_min_height: u32,
}

impl ChromeState {
    pub fn derive(
        settings: &Settings,
        engine: Option<&SharedEngine>,
        layout_ready: bool,
        config: &BridgeConfig,
    ) -> Self {
        let (has_undo, has_redo) = engine
            .and_then(|engine| {
                let engine = engine.try_borrow().ok()?;
                Some((engine.can_undo(), engine.can_redo()))
            })
            .unwrap_or((false, false));

        Self {
            header: HeaderState {
                visible: !settings.no_header,
                has_undo,
                has_redo,
            },
            show_title_area: !settings.no_header,
            toolbar: layout_ready.then(|| ToolbarState {
                visible: !settings.no_toolbar,
                tools: settings.tools.clone(),
                default_font_family: settings.font_family.clone(),
                default_font_size: settings.font_size,
            }),
            bottom_zone_min_height: config.bottom_zone_min_height,
        }
    }
}
