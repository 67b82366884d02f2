//! Configuration types for Drilldown.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and dimension settings.
//! - [`LayoutConfig`] - Global layout options, responsive overrides and the resize debounce.
//! - [`DimensionTable`] - Style-class to node size table (from `drilldown-core`).
//!
//! # Example
//!
//! ```
//! # use drilldown::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [layout]
//!     resize_debounce_ms = 100
//!     options = { direction = "RIGHT" }
//! "#).unwrap();
//!
//! assert_eq!(config.layout().resize_debounce().as_millis(), 100);
//! assert_eq!(config.layout().global_options().get("direction"), Some("RIGHT"));
//! assert_eq!(config.layout().global_options().get("algorithm"), Some("mrtree"));
//! ```

use std::time::Duration;

use serde::Deserialize;

use drilldown_core::{
    dimension::DimensionTable,
    options::{LayoutOptions, merge_layers},
};

use crate::layout::{
    DEFAULT_RESPONSIVE_THRESHOLD, ResponsivePolicy, default_layout_options,
    default_responsive_options,
};

/// Default quiet window for resize notifications, in milliseconds.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Node dimension section.
    #[serde(default)]
    dimensions: DimensionTable,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, dimensions: DimensionTable) -> Self {
        Self { layout, dimensions }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the dimension lookup table.
    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }
}

/// Layout settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Global options, layered over the built-in defaults.
    #[serde(default)]
    options: LayoutOptions,

    /// Containers narrower than this get `responsive_options`.
    #[serde(default = "default_threshold")]
    responsive_threshold: f32,

    #[serde(default = "default_responsive_options")]
    responsive_options: LayoutOptions,

    #[serde(default = "default_debounce_ms")]
    resize_debounce_ms: u64,
}

fn default_threshold() -> f32 {
    DEFAULT_RESPONSIVE_THRESHOLD
}

fn default_debounce_ms() -> u64 {
    DEFAULT_RESIZE_DEBOUNCE_MS
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            options: LayoutOptions::new(),
            responsive_threshold: default_threshold(),
            responsive_options: default_responsive_options(),
            resize_debounce_ms: default_debounce_ms(),
        }
    }
}

impl LayoutConfig {
    /// Returns the configured options merged over the built-in defaults.
    pub fn global_options(&self) -> LayoutOptions {
        merge_layers([&default_layout_options(), &self.options])
    }

    /// Returns the responsive override policy.
    pub fn responsive_policy(&self) -> ResponsivePolicy {
        ResponsivePolicy::new(self.responsive_threshold, self.responsive_options.clone())
    }

    /// Returns the quiet window applied to resize notifications.
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}
