//! Shared types between the editor bridge and the host shell
//!
//! These types are used by both:
//! - the editor bridge (native Rust, or WASM inside the editor web view)
//! - the host shell (TypeScript, through the generated bindings)
//!
//! Serializable with serde for JSON over the post-message channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Settings
// ============================================================================

/// Editor settings supplied by the host on every render.
///
/// The bridge never persists these; a fresh copy arrives with each render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bridge.ts")]
pub struct Settings {
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub double_spaced_lines: bool,
    pub font_family: String,
    pub font_size: u32,
    pub date_format: String,
    pub time_format: TimeFormat,
    /// Tool ids shown in the toolbar, in display order
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub no_header: bool,
    #[serde(default)]
    pub no_toolbar: bool,
    #[serde(default)]
    pub premium: bool,
    /// CORS proxy host used by the engine when downloading remote media
    #[serde(default)]
    pub cors_proxy: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            readonly: false,
            double_spaced_lines: false,
            font_family: "sans-serif".to_string(),
            font_size: 16,
            date_format: "DD-MM-YYYY".to_string(),
            time_format: TimeFormat::TwelveHour,
            tools: Vec::new(),
            no_header: false,
            no_toolbar: false,
            premium: false,
            cors_proxy: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bridge.ts")]
pub enum TimeFormat {
    #[serde(rename = "12-hour")]
    TwelveHour,
    #[serde(rename = "24-hour")]
    TwentyFourHour,
}

// ============================================================================
// Documents
// ============================================================================

/// Serialized state of the note document at one point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "bridge.ts")]
pub struct DocumentSnapshot {
    pub html: String,
}

impl DocumentSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.html.trim().is_empty()
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// What the attachment picker should open
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bridge.ts")]
pub enum AttachmentKind {
    File,
    Image,
    Camera,
}

/// Attachment reference as the editor knows it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bridge.ts")]
pub struct AttachmentDescriptor {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub hash: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub size: Option<u64>,
}

impl AttachmentDescriptor {
    pub fn new(kind: AttachmentKind, hash: impl Into<String>) -> Self {
        Self {
            kind,
            hash: hash.into(),
            filename: None,
            mime: None,
            size: None,
        }
    }
}

/// Attachment payload resolved by the host. Passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "bridge.ts")]
pub struct AttachmentData {
    pub hash: String,
    pub data: String,
}

// ============================================================================
// Interaction
// ============================================================================

/// Scroll position of the content container
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bridge.ts")]
pub struct ScrollEvent {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

/// Element ids of the regions outside the document body
pub const ZONE_HEADER: &str = "header";
pub const ZONE_STATUS_BAR: &str = "statusbar";

// ============================================================================
// Host Protocol
// ============================================================================

/// Messages posted from the editor to the native host shell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export, export_to = "bridge.ts")]
pub enum HostMessage {
    ContentChange {
        snapshot: DocumentSnapshot,
        #[serde(rename = "ignoredEdit")]
        ignored_edit: bool,
        at: DateTime<Utc>,
    },
    FilePicker {
        kind: AttachmentKind,
    },
    Download {
        attachment: AttachmentDescriptor,
    },
    PreviewAttachment {
        attachment: AttachmentDescriptor,
    },
    GetAttachmentData {
        #[serde(rename = "requestId")]
        #[ts(type = "number")]
        request_id: u64,
        attachment: AttachmentDescriptor,
    },
    Link {
        url: String,
    },
    CopyToClipboard {
        text: String,
    },
    TitlePlaceholder {
        text: String,
    },
    Scroll {
        event: ScrollEvent,
    },
    /// A premium-gated feature was attempted without the claim
    Pro,
    Error {
        message: String,
    },
}

impl HostMessage {
    /// Wire name of the message type, as the host dispatches on it
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::ContentChange { .. } => "contentChange",
            HostMessage::FilePicker { .. } => "filePicker",
            HostMessage::Download { .. } => "download",
            HostMessage::PreviewAttachment { .. } => "previewAttachment",
            HostMessage::GetAttachmentData { .. } => "getAttachmentData",
            HostMessage::Link { .. } => "link",
            HostMessage::CopyToClipboard { .. } => "copyToClipboard",
            HostMessage::TitlePlaceholder { .. } => "titlePlaceholder",
            HostMessage::Scroll { .. } => "scroll",
            HostMessage::Pro => "pro",
            HostMessage::Error { .. } => "error",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
