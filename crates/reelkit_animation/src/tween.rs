//! Tween descriptions and in-flight tween state

use crate::clock::Timestamp;
use crate::easing::Easing;
use crate::property::{Property, Targets};
use crate::scheduler::HookContext;
use std::fmt;
use std::time::Duration;

/// Called after every processed step with the value just written.
pub type ChangeHook<S> = Box<dyn FnMut(&mut HookContext<'_, S>, f32) -> anyhow::Result<()>>;

/// Called once, after the final write of a tween.
pub type CompleteHook<S> = Box<dyn FnOnce(&mut HookContext<'_, S>) -> anyhow::Result<()>>;

/// A tween waiting to be registered with a scheduler.
///
/// # Example
///
/// ```ignore
/// let handle = scheduler.start(
///     Tween::new(reel_id, Reel::POSITION, 30.0, Duration::from_millis(2500))
///         .easing(Easing::reel_stop())
///         .on_complete(|_| Ok(())),
///     &reels,
/// )?;
/// ```
pub struct Tween<S: Targets> {
    pub(crate) target: S::Key,
    pub(crate) property: Property<S::Target>,
    pub(crate) from: Option<f32>,
    pub(crate) to: f32,
    pub(crate) duration: Duration,
    pub(crate) easing: Option<Easing>,
    pub(crate) start_at: Option<Timestamp>,
    pub(crate) on_change: Option<ChangeHook<S>>,
    pub(crate) on_complete: Option<CompleteHook<S>>,
}

impl<S: Targets> Tween<S> {
    pub fn new(target: S::Key, property: Property<S::Target>, to: f32, duration: Duration) -> Self {
        Self {
            target,
            property,
            from: None,
            to,
            duration,
            easing: None,
            start_at: None,
            on_change: None,
            on_complete: None,
        }
    }

    /// Interpolate from `value` instead of the property's value at registration
    pub fn from(mut self, value: f32) -> Self {
        self.from = Some(value);
        self
    }

    /// Easing curve (defaults to the scheduler's configured easing)
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Start time (defaults to the scheduler's clock at registration)
    pub fn starting_at(mut self, at: Timestamp) -> Self {
        self.start_at = Some(at);
        self
    }

    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut HookContext<'_, S>, f32) -> anyhow::Result<()> + 'static,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut HookContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn target(&self) -> S::Key {
        self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<S: Targets> fmt::Debug for Tween<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("target", &self.target)
            .field("property", &self.property)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("start_at", &self.start_at)
            .finish_non_exhaustive()
    }
}

/// Value produced by sampling a tween at a timestamp
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Sample {
    pub value: f32,
    pub finished: bool,
}

/// A registered tween
pub(crate) struct ActiveTween<S: Targets> {
    pub target: S::Key,
    pub property: Property<S::Target>,
    /// Interpolation origin, captured once at registration
    pub begin: f32,
    pub end: f32,
    pub duration: Duration,
    pub easing: Easing,
    pub start_time: Timestamp,
    /// Timestamp of the last processed step
    pub last_step: Option<Timestamp>,
    pub on_change: Option<ChangeHook<S>>,
    pub on_complete: Option<CompleteHook<S>>,
}

impl<S: Targets> ActiveTween<S> {
    /// Normalized time at `now`, clamped to `[0, 1]`
    pub fn progress(&self, now: Timestamp) -> f32 {
        let elapsed = now.saturating_since(self.start_time);
        if elapsed >= self.duration {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32
    }

    pub fn sample(&self, now: Timestamp) -> Sample {
        let elapsed = now.saturating_since(self.start_time);
        if elapsed >= self.duration {
            // exact end value, never the eased approximation
            return Sample {
                value: self.end,
                finished: true,
            };
        }

        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        let progress = self.easing.apply(t);
        Sample {
            value: self.begin + (self.end - self.begin) * progress,
            finished: false,
        }
    }

    /// Interval since the previous write (or since the start on the first write)
    pub fn interval_to(&self, now: Timestamp) -> Duration {
        now.saturating_since(self.last_step.unwrap_or(self.start_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Frame;

    struct Dial {
        angle: f32,
    }

    const ANGLE: Property<Dial> = Property::new(
        "angle",
        |dial: &Dial| dial.angle,
        |dial: &mut Dial, value: f32, _: Frame| dial.angle = value,
    );

    fn active(begin: f32, end: f32, millis: u64, easing: Easing) -> ActiveTween<Vec<Dial>> {
        ActiveTween {
            target: 0,
            property: ANGLE,
            begin,
            end,
            duration: Duration::from_millis(millis),
            easing,
            start_time: Timestamp::from_millis(100),
            last_step: None,
            on_change: None,
            on_complete: None,
        }
    }

    #[test]
    fn test_sample_linear_midpoint() {
        let tween = active(10.0, 20.0, 1000, Easing::Linear);
        let sample = tween.sample(Timestamp::from_millis(600));
        assert!(!sample.finished);
        assert!((sample.value - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_before_start_is_begin() {
        let tween = active(10.0, 20.0, 1000, Easing::EaseOutCubic);
        let sample = tween.sample(Timestamp::from_millis(50));
        assert_eq!(sample.value, 10.0);
        assert!(!sample.finished);
    }

    #[test]
    fn test_sample_at_duration_is_exact_end() {
        let tween = active(0.1, 0.7, 300, Easing::BackOut(0.5));
        let sample = tween.sample(Timestamp::from_millis(400));
        assert!(sample.finished);
        assert_eq!(sample.value, 0.7);
        assert_eq!(tween.progress(Timestamp::from_millis(900)), 1.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let tween = active(0.0, 5.0, 0, Easing::Linear);
        assert!(tween.sample(Timestamp::from_millis(100)).finished);
    }

    #[test]
    fn test_interval_to() {
        let mut tween = active(0.0, 1.0, 1000, Easing::Linear);
        assert_eq!(
            tween.interval_to(Timestamp::from_millis(116)),
            Duration::from_millis(16)
        );
        tween.last_step = Some(Timestamp::from_millis(116));
        assert_eq!(
            tween.interval_to(Timestamp::from_millis(150)),
            Duration::from_millis(34)
        );
    }

    #[test]
    fn test_builder_defaults() {
        let tween: Tween<Vec<Dial>> = Tween::new(3, ANGLE, 90.0, Duration::from_millis(250));
        assert_eq!(tween.target(), 3);
        assert_eq!(tween.duration(), Duration::from_millis(250));
        assert!(tween.from.is_none());
        assert!(tween.easing.is_none());
        assert!(tween.on_change.is_none());
        assert!(tween.on_complete.is_none());
    }
}
