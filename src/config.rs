//! Viewer configuration.
//! Every field has a default so a partial JSON document (or none at all) is valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DELAY_LONG_PRESS_MS: u32 = 800;
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid viewer config: {field} {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Upper zoom bound as a multiple of the fit scale.
    pub max_scale_factor: f64,
    /// Double-tap target as a multiple of the fit scale.
    pub double_tap_scale_factor: f64,
    pub double_tap_delay_ms: f64,
    /// Max distance between two taps that still count as a double tap.
    pub double_tap_slop_px: f64,
    /// Movement under which a touch sequence is still a tap.
    pub tap_slop_px: f64,
    pub long_press_slop_px: f64,
    /// Empty viewport allowed beyond the image edge while panning a zoomed image.
    pub pan_margin_px: f64,
    /// Scale ratio (to fit) above which the image counts as zoomed.
    pub zoom_enter_ratio: f64,
    /// Scale ratio (to fit) at or below which a zoomed image counts as unzoomed again.
    pub zoom_exit_ratio: f64,
    /// Pinch baselines shorter than this do not change scale.
    pub pinch_epsilon_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_scale_factor: 3.0,
            double_tap_scale_factor: 2.0,
            double_tap_delay_ms: 300.0,
            double_tap_slop_px: 30.0,
            tap_slop_px: 10.0,
            long_press_slop_px: 10.0,
            pan_margin_px: 0.0,
            zoom_enter_ratio: 1.01,
            zoom_exit_ratio: 1.001,
            pinch_epsilon_px: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissConfig {
    pub close_offset: f64,
    /// px per ms.
    pub close_velocity: f64,
    pub min_opacity: f64,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            close_offset: 75.0,
            close_velocity: 1.75,
            min_opacity: 0.7,
        }
    }
}

/// Which index the pager returns to after a viewport width change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageAnchor {
    /// The index the viewer was opened at.
    #[default]
    RequestedIndex,
    /// Whatever page was current when the width changed.
    LastVisited,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub settle_delay_ms: f64,
    pub anchor: PageAnchor,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 100.0,
            anchor: PageAnchor::RequestedIndex,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub swipe_to_close_enabled: bool,
    pub double_tap_to_zoom_enabled: bool,
    pub delay_long_press_ms: u32,
    pub image_index: usize,
    pub background_color: String,
    pub asset_base: String,
    pub dimension_cache_capacity: usize,
    pub gesture: GestureConfig,
    pub dismiss: DismissConfig,
    pub page: PageConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            swipe_to_close_enabled: true,
            double_tap_to_zoom_enabled: true,
            delay_long_press_ms: DEFAULT_DELAY_LONG_PRESS_MS,
            image_index: 0,
            background_color: "#000".to_string(),
            asset_base: "assets".to_string(),
            dimension_cache_capacity: DEFAULT_CACHE_CAPACITY,
            gesture: GestureConfig::default(),
            dismiss: DismissConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gesture;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(g.max_scale_factor) || g.max_scale_factor < 1.0 {
            return Err(ConfigError::Invalid {
                field: "gesture.max_scale_factor",
                reason: "must be a finite number >= 1",
            });
        }
        if !positive(g.double_tap_scale_factor) || g.double_tap_scale_factor > g.max_scale_factor {
            return Err(ConfigError::Invalid {
                field: "gesture.double_tap_scale_factor",
                reason: "must be positive and not above max_scale_factor",
            });
        }
        if !(g.zoom_exit_ratio >= 1.0 && g.zoom_exit_ratio <= g.zoom_enter_ratio) {
            return Err(ConfigError::Invalid {
                field: "gesture.zoom_exit_ratio",
                reason: "must lie between 1 and zoom_enter_ratio",
            });
        }
        if !(0.0..=1.0).contains(&self.dismiss.min_opacity) {
            return Err(ConfigError::Invalid {
                field: "dismiss.min_opacity",
                reason: "must lie in [0, 1]",
            });
        }
        if !positive(self.dismiss.close_offset) {
            return Err(ConfigError::Invalid {
                field: "dismiss.close_offset",
                reason: "must be positive",
            });
        }
        if self.dimension_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "dimension_cache_capacity",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
