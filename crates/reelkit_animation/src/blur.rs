//! Motion blur driven by reel velocity

use crate::config::BlurConfig;
use std::time::Duration;

impl BlurConfig {
    /// Blur intensity for a position change of `delta` over `interval`.
    ///
    /// Velocity is normalized to the reference interval, so a reel moving at
    /// the same speed blurs the same at 30 or 144 frames per second. A zero
    /// interval (first write of a tween) counts as one reference interval.
    pub fn intensity_for(&self, delta: f32, interval: Duration) -> f32 {
        if !delta.is_finite() {
            return self.max_intensity;
        }

        let interval_ms = interval.as_secs_f32() * 1_000.0;
        let frames = if interval_ms > 0.0 {
            interval_ms / self.reference_interval_ms
        } else {
            1.0
        };

        let raw = delta.abs() * self.strength / frames;
        // inverted or NaN bounds must not panic mid-step
        raw.max(self.rest_intensity).min(self.max_intensity)
    }
}

/// Blur state attached to a reel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionBlur {
    config: BlurConfig,
    intensity: f32,
}

impl MotionBlur {
    pub fn new(config: BlurConfig) -> Self {
        Self {
            config,
            intensity: config.rest_intensity,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn config(&self) -> &BlurConfig {
        &self.config
    }

    /// Recompute from the latest position change
    pub fn update(&mut self, delta: f32, interval: Duration) {
        self.intensity = self.config.intensity_for(delta, interval);
    }

    /// Back to the resting intensity
    pub fn reset(&mut self) {
        self.intensity = self.config.rest_intensity;
    }

    pub fn is_at_rest(&self) -> bool {
        self.intensity == self.config.rest_intensity
    }
}

impl Default for MotionBlur {
    fn default() -> Self {
        Self::new(BlurConfig::default())
    }
}
