//! Engine configuration (reelkit.toml)
//!
//! Every section and field is optional; missing values fall back to the
//! defaults of the classic five-reel demo.
//!
//! ```toml
//! [scheduler]
//! zero_duration = "complete_immediately"
//! default_easing = "ease_out_cubic"
//!
//! [blur]
//! strength = 8.0
//! max_intensity = 48.0
//!
//! [spin]
//! base_duration_ms = 2000
//! easing = { back_out = 0.5 }
//! ```

use crate::easing::Easing;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How `start` treats a zero-length tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDurationPolicy {
    /// Fail with `TweenError::ZeroDuration`
    #[default]
    Reject,
    /// Register it; the next step writes the end value and completes it
    CompleteImmediately,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub zero_duration: ZeroDurationPolicy,
    /// Easing for tweens that do not pick one
    pub default_easing: Easing,
}

/// Velocity-to-blur mapping
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Blur per position unit moved in one reference interval
    pub strength: f32,
    /// Upper bound on blur intensity
    pub max_intensity: f32,
    /// Intensity of a reel at rest
    pub rest_intensity: f32,
    /// Frame interval the strength is calibrated for
    pub reference_interval_ms: f32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            strength: 8.0,
            max_intensity: 64.0,
            rest_intensity: 0.0,
            reference_interval_ms: 1_000.0 / 60.0,
        }
    }
}

/// Staggering of a full spin across reels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Symbols every reel travels at minimum
    pub base_distance: f32,
    /// Extra symbols per reel index
    pub per_reel_distance: f32,
    pub base_duration_ms: u64,
    pub per_reel_duration_ms: u64,
    /// Extra time per caller-supplied extra symbol
    pub per_extra_duration_ms: u64,
    pub easing: Easing,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            base_distance: 10.0,
            per_reel_distance: 5.0,
            base_duration_ms: 2_500,
            per_reel_duration_ms: 600,
            per_extra_duration_ms: 600,
            easing: Easing::reel_stop(),
        }
    }
}

impl SpinConfig {
    /// Distance and duration for reel `index` with `extra` additional symbols
    pub fn leg(&self, index: usize, extra: u32) -> (f32, Duration) {
        let distance =
            self.base_distance + index as f32 * self.per_reel_distance + extra as f32;
        let millis = self
            .base_duration_ms
            .saturating_add((index as u64).saturating_mul(self.per_reel_duration_ms))
            .saturating_add(u64::from(extra).saturating_mul(self.per_extra_duration_ms));
        (distance, Duration::from_millis(millis))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of one symbol cell in pixels
    pub symbol_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { symbol_size: 150.0 }
    }
}

/// Top-level configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub blur: BlurConfig,
    pub spin: SpinConfig,
    pub layout: LayoutConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.as_ref().display(), "engine config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let blur = &self.blur;
        non_negative("blur.strength", blur.strength)?;
        non_negative("blur.max_intensity", blur.max_intensity)?;
        non_negative("blur.rest_intensity", blur.rest_intensity)?;
        positive("blur.reference_interval_ms", blur.reference_interval_ms)?;
        if blur.max_intensity < blur.rest_intensity {
            return Err(ConfigError::Invalid(format!(
                "blur.max_intensity ({}) is below blur.rest_intensity ({})",
                blur.max_intensity, blur.rest_intensity
            )));
        }

        non_negative("spin.base_distance", self.spin.base_distance)?;
        non_negative("spin.per_reel_distance", self.spin.per_reel_distance)?;
        if self.spin.base_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "spin.base_duration_ms must be greater than zero".to_string(),
            ));
        }

        positive("layout.symbol_size", self.layout.symbol_size)?;
        Ok(())
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be a finite non-negative number, got {value}"
        )))
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be a finite positive number, got {value}"
        )))
    }
}
