//! Tween scheduler
//!
//! Owns every in-flight tween and advances them once per frame. The host
//! render loop drives it: one `step(now, &mut targets)` per frame with a
//! non-decreasing timestamp. There is no internal timer or thread.
//!
//! Hooks run with mutable access to the scheduler and the target store
//! through a [`HookContext`]. `step` snapshots the active handles before
//! processing, so a hook may start or cancel tweens freely: new tweens are
//! first advanced on the next step, and canceled tweens that were not yet
//! processed are skipped.

use crate::clock::Timestamp;
use crate::config::{SchedulerConfig, ZeroDurationPolicy};
use crate::error::{HookError, Result, TweenError};
use crate::property::{Frame, Targets};
use crate::tween::{ActiveTween, Tween};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::panic::{self, AssertUnwindSafe};

new_key_type! {
    /// Handle to a registered tween, used for cancellation and queries.
    pub struct TweenHandle;
}

/// Which hook of a tween failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    Change,
    Complete,
}

/// A hook failure isolated during a step
#[derive(Debug)]
pub struct HookFailure {
    pub handle: TweenHandle,
    pub hook: HookKind,
    pub error: HookError,
}

/// What happened during one `step` call
#[derive(Debug, Default)]
pub struct StepReport {
    pub now: Timestamp,
    /// Tweens that wrote a value this step (including completing ones)
    pub advanced: SmallVec<[TweenHandle; 8]>,
    /// Tweens that reached their end value and were retired
    pub completed: SmallVec<[TweenHandle; 8]>,
    /// Tweens retired because their target is no longer in the store
    pub orphaned: SmallVec<[TweenHandle; 2]>,
    pub failures: Vec<HookFailure>,
}

impl StepReport {
    fn new(now: Timestamp) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Access handed to a hook while it runs.
pub struct HookContext<'a, S: Targets> {
    /// The tween whose hook is running
    pub handle: TweenHandle,
    /// The tween's target key
    pub target: S::Key,
    pub scheduler: &'a mut TweenScheduler<S>,
    pub targets: &'a mut S,
}

impl<S: Targets> HookContext<'_, S> {
    /// The animated target, if it is still in the store
    pub fn target_mut(&mut self) -> Option<&mut S::Target> {
        self.targets.target_mut(self.target)
    }
}

/// The scheduler that steps all active tweens
pub struct TweenScheduler<S: Targets> {
    tweens: SlotMap<TweenHandle, ActiveTween<S>>,
    clock: Timestamp,
    config: SchedulerConfig,
}

impl<S: Targets> TweenScheduler<S> {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            tweens: SlotMap::with_key(),
            clock: Timestamp::zero(),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Timestamp of the latest step; new tweens start here by default
    pub fn now(&self) -> Timestamp {
        self.clock
    }

    /// Register a tween.
    ///
    /// Fails without registering anything if the duration is zero (under
    /// [`ZeroDurationPolicy::Reject`]), the target key does not resolve, or
    /// the begin or end value is not finite.
    pub fn start(&mut self, tween: Tween<S>, targets: &S) -> Result<TweenHandle> {
        let property = tween.property.name();

        if tween.duration.is_zero() && self.config.zero_duration == ZeroDurationPolicy::Reject {
            return Err(TweenError::ZeroDuration { property });
        }

        let target = targets
            .target(tween.target)
            .ok_or(TweenError::MissingTarget { property })?;
        let begin = tween
            .from
            .unwrap_or_else(|| tween.property.get(target));

        for value in [begin, tween.to] {
            if !value.is_finite() {
                return Err(TweenError::NonFiniteValue { property, value });
            }
        }

        let start_time = tween.start_at.unwrap_or(self.clock);
        let easing = tween.easing.unwrap_or(self.config.default_easing);
        let handle = self.tweens.insert(ActiveTween {
            target: tween.target,
            property: tween.property,
            begin,
            end: tween.to,
            duration: tween.duration,
            easing,
            start_time,
            last_step: None,
            on_change: tween.on_change,
            on_complete: tween.on_complete,
        });

        tracing::debug!(
            ?handle,
            property,
            begin,
            end = tween.to,
            duration_ms = tween.duration.as_secs_f64() * 1_000.0,
            ?easing,
            %start_time,
            "tween started"
        );

        Ok(handle)
    }

    /// Remove a tween without completing it.
    ///
    /// The target keeps the last value written. Returns false if the handle
    /// was already completed or canceled.
    pub fn cancel(&mut self, handle: TweenHandle) -> bool {
        let removed = self.tweens.remove(handle).is_some();
        if removed {
            tracing::debug!(?handle, "tween canceled");
        }
        removed
    }

    /// Cancel every tween animating `target`. Returns how many were removed.
    pub fn cancel_target(&mut self, target: S::Key) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|_, tween| tween.target != target);
        let removed = before - self.tweens.len();
        if removed > 0 {
            tracing::debug!(?target, removed, "tweens canceled for target");
        }
        removed
    }

    /// Cancel all tweens
    pub fn clear(&mut self) {
        let count = self.tweens.len();
        self.tweens.clear();
        tracing::debug!(count, "all tweens cleared");
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.tweens.contains_key(handle)
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn has_active_tweens(&self) -> bool {
        !self.tweens.is_empty()
    }

    pub fn active_handles(&self) -> impl Iterator<Item = TweenHandle> + '_ {
        self.tweens.keys()
    }

    /// Normalized time of a tween at the scheduler's clock
    pub fn progress(&self, handle: TweenHandle) -> Option<f32> {
        self.tweens
            .get(handle)
            .map(|tween| tween.progress(self.clock))
    }

    /// Advance every active tween to `now`.
    ///
    /// A tween already processed at `now` or later is left untouched, so
    /// repeating a step with the same timestamp changes nothing.
    pub fn step(&mut self, now: Timestamp, targets: &mut S) -> StepReport {
        if now < self.clock {
            tracing::warn!(%now, clock = %self.clock, "animation clock moved backwards");
        } else {
            self.clock = now;
        }

        let mut report = StepReport::new(now);
        let handles: SmallVec<[TweenHandle; 16]> = self.tweens.keys().collect();
        for handle in handles {
            self.advance(handle, now, targets, &mut report);
        }

        tracing::trace!(
            %now,
            advanced = report.advanced.len(),
            completed = report.completed.len(),
            active = self.tweens.len(),
            "scheduler step"
        );

        report
    }

    fn advance(&mut self, handle: TweenHandle, now: Timestamp, targets: &mut S, report: &mut StepReport) {
        // Canceled by a hook earlier in this step
        let Some(tween) = self.tweens.get_mut(handle) else {
            return;
        };
        if tween.last_step.is_some_and(|last| now <= last) {
            return;
        }
        // Not started yet: leave the property to whatever drives it now
        if now < tween.start_time {
            return;
        }

        let sample = tween.sample(now);
        let frame = if sample.finished {
            Frame::Settle
        } else {
            Frame::Advance {
                interval: tween.interval_to(now),
            }
        };

        let key = tween.target;
        let Some(target) = targets.target_mut(key) else {
            tracing::warn!(?handle, ?key, property = tween.property.name(), "tween target vanished");
            self.tweens.remove(handle);
            report.orphaned.push(handle);
            return;
        };

        tween.property.set(target, sample.value, frame);
        tween.last_step = Some(now);
        report.advanced.push(handle);

        if let Some(mut hook) = tween.on_change.take() {
            self.call_hook(targets, handle, key, HookKind::Change, report, |ctx| {
                hook(ctx, sample.value)
            });
            if !sample.finished {
                if let Some(tween) = self.tweens.get_mut(handle) {
                    tween.on_change = Some(hook);
                }
            }
        }

        if !sample.finished {
            return;
        }

        // A change hook that canceled its own tween suppresses completion
        let Some(mut finished) = self.tweens.remove(handle) else {
            return;
        };
        report.completed.push(handle);
        tracing::debug!(?handle, property = finished.property.name(), end = finished.end, "tween completed");

        if let Some(hook) = finished.on_complete.take() {
            self.call_hook(targets, handle, key, HookKind::Complete, report, hook);
        }
    }

    fn call_hook<F>(
        &mut self,
        targets: &mut S,
        handle: TweenHandle,
        target: S::Key,
        kind: HookKind,
        report: &mut StepReport,
        hook: F,
    ) where
        F: FnOnce(&mut HookContext<'_, S>) -> anyhow::Result<()>,
    {
        let mut ctx = HookContext {
            handle,
            target,
            scheduler: self,
            targets,
        };

        let error = match panic::catch_unwind(AssertUnwindSafe(|| hook(&mut ctx))) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => HookError::Failed(err),
            Err(payload) => HookError::from_panic(payload),
        };

        tracing::warn!(?handle, hook = ?kind, %error, "animation hook failed");
        report.failures.push(HookFailure {
            handle,
            hook: kind,
            error,
        });
    }
}

impl<S: Targets> Default for TweenScheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}
