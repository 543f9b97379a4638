use crate::error::BridgeError;

pub const DEFAULT_TITLE_PLACEHOLDER: &str = "Note title";
pub const DEFAULT_LOG_FILTER: &str = "editor_bridge=info";

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Placeholder pushed to the title widget when the host forces a resync
    pub title_placeholder: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Top padding of the content area for single-spaced lines
    pub content_padding: u32,
    /// Animate the header double-click scroll back to the origin
    pub smooth_scroll: bool,
    /// Minimum height of the tappable zone below the last block
    pub bottom_zone_min_height: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            title_placeholder: DEFAULT_TITLE_PLACEHOLDER.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            content_padding: 6,
            smooth_scroll: true,
            bottom_zone_min_height: 250,
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            title_placeholder: env_str(
                "EDITOR_BRIDGE_TITLE_PLACEHOLDER",
                &defaults.title_placeholder,
            ),
            log_filter: env_str("EDITOR_BRIDGE_LOG", &defaults.log_filter),
            content_padding: env_parse("EDITOR_BRIDGE_CONTENT_PADDING", defaults.content_padding)?,
            smooth_scroll: env_parse("EDITOR_BRIDGE_SMOOTH_SCROLL", defaults.smooth_scroll)?,
            bottom_zone_min_height: env_parse(
                "EDITOR_BRIDGE_BOTTOM_ZONE_MIN_HEIGHT",
                defaults.bottom_zone_min_height,
            )?,
        })
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, BridgeError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| BridgeError::Config(format!("Failed to parse env var {key}={val}: {e}"))),
        Err(_) => Ok(default),
    }
}
