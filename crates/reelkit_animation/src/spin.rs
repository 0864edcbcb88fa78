//! Staggered multi-reel spins
//!
//! A spin starts one position tween per reel. Reels further right travel
//! further and take longer, so they stop one after another. How far past
//! the minimum each reel travels (`extras`) is supplied by the caller; the
//! engine never picks outcomes.

use crate::config::SpinConfig;
use crate::error::TweenError;
use crate::property::Targets;
use crate::reel::Reel;
use crate::scheduler::{HookContext, TweenHandle, TweenScheduler};
use crate::tween::Tween;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpinError {
    #[error("a spin is already running")]
    AlreadyRunning,

    #[error("no reels to spin")]
    NoReels,

    #[error("{extras} extra offsets given for {reels} reels")]
    ExtrasMismatch { reels: usize, extras: usize },

    #[error(transparent)]
    Tween(#[from] TweenError),
}

/// One reel's part of a spin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinLeg<K> {
    pub reel: K,
    pub handle: TweenHandle,
    /// Resting position the reel will land on
    pub target: f32,
    pub duration: Duration,
}

/// The tweens of one spin
#[derive(Clone, Debug)]
pub struct SpinHandle<K> {
    legs: Vec<SpinLeg<K>>,
}

impl<K: Copy> SpinHandle<K> {
    pub fn legs(&self) -> &[SpinLeg<K>] {
        &self.legs
    }

    /// Whether any reel of this spin is still moving
    pub fn is_running<S: Targets<Key = K>>(&self, scheduler: &TweenScheduler<S>) -> bool {
        self.legs.iter().any(|leg| scheduler.is_active(leg.handle))
    }

    /// Stop every reel where it is. The all-complete callback will not run.
    pub fn cancel<S: Targets<Key = K>>(&self, scheduler: &mut TweenScheduler<S>) -> usize {
        self.legs
            .iter()
            .filter(|leg| scheduler.cancel(leg.handle))
            .count()
    }
}

/// Starts spins and refuses to overlap them
#[derive(Debug)]
pub struct Spinner<K> {
    config: SpinConfig,
    current: Option<SpinHandle<K>>,
}

impl<K: Copy> Spinner<K> {
    pub fn new(config: SpinConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&SpinHandle<K>> {
        self.current.as_ref()
    }

    pub fn is_running<S: Targets<Key = K>>(&self, scheduler: &TweenScheduler<S>) -> bool {
        self.current
            .as_ref()
            .is_some_and(|spin| spin.is_running(scheduler))
    }

    /// Spin `reels` in order. `extras[i]` adds symbols (and time) to reel `i`.
    ///
    /// `on_all_complete` runs once, from the completion hook of whichever
    /// reel stops last. Either every reel starts or none does.
    pub fn start<S, F>(
        &mut self,
        scheduler: &mut TweenScheduler<S>,
        targets: &S,
        reels: &[K],
        extras: &[u32],
        on_all_complete: Option<F>,
    ) -> Result<SpinHandle<K>, SpinError>
    where
        S: Targets<Key = K, Target = Reel>,
        F: FnOnce(&mut HookContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        if self.is_running(scheduler) {
            return Err(SpinError::AlreadyRunning);
        }
        if reels.is_empty() {
            return Err(SpinError::NoReels);
        }
        if reels.len() != extras.len() {
            return Err(SpinError::ExtrasMismatch {
                reels: reels.len(),
                extras: extras.len(),
            });
        }

        let remaining = Rc::new(Cell::new(reels.len()));
        let finale = Rc::new(RefCell::new(on_all_complete));
        let mut legs = Vec::with_capacity(reels.len());

        for (index, (&reel, &extra)) in reels.iter().zip(extras).enumerate() {
            let Some(state) = targets.target(reel) else {
                rollback(scheduler, &legs);
                return Err(TweenError::MissingTarget {
                    property: Reel::POSITION.name(),
                }
                .into());
            };

            let (distance, duration) = self.config.leg(index, extra);
            let target = state.position() + distance;
            let remaining = remaining.clone();
            let finale = finale.clone();
            let tween: Tween<S> = Tween::new(reel, Reel::POSITION, target, duration)
                .easing(self.config.easing)
                .on_complete(move |ctx| {
                    remaining.set(remaining.get() - 1);
                    if remaining.get() > 0 {
                        return Ok(());
                    }
                    tracing::debug!("all reels stopped");
                    let hook = finale.borrow_mut().take();
                    match hook {
                        Some(hook) => hook(ctx),
                        None => Ok(()),
                    }
                });

            match scheduler.start(tween, targets) {
                Ok(handle) => legs.push(SpinLeg {
                    reel,
                    handle,
                    target,
                    duration,
                }),
                Err(err) => {
                    rollback(scheduler, &legs);
                    return Err(err.into());
                }
            }
        }

        tracing::debug!(reels = legs.len(), "spin started");
        let spin = SpinHandle { legs };
        self.current = Some(spin.clone());
        Ok(spin)
    }
}

fn rollback<S: Targets>(scheduler: &mut TweenScheduler<S>, legs: &[SpinLeg<S::Key>]) {
    for leg in legs {
        scheduler.cancel(leg.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::config::BlurConfig;
    use crate::reel::SpriteId;

    type Reels = Vec<Reel>;
    type NoHook = fn(&mut HookContext<'_, Reels>) -> anyhow::Result<()>;

    fn reels(count: usize) -> Reels {
        (0..count)
            .map(|i| Reel::new((0..4).map(|s| SpriteId((i * 4 + s) as u64)), BlurConfig::default()))
            .collect()
    }

    #[test]
    fn test_legs_are_staggered() {
        let reels = reels(3);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        let spin = spinner
            .start(&mut scheduler, &reels, &[0, 1, 2], &[0, 0, 2], None::<NoHook>)
            .unwrap();

        let targets: Vec<f32> = spin.legs().iter().map(|leg| leg.target).collect();
        let durations: Vec<u128> = spin
            .legs()
            .iter()
            .map(|leg| leg.duration.as_millis())
            .collect();
        assert_eq!(targets, vec![10.0, 15.0, 22.0]);
        assert_eq!(durations, vec![2_500, 3_100, 4_900]);
        assert_eq!(scheduler.active_count(), 3);
    }

    #[test]
    fn test_overlapping_spin_rejected() {
        let mut reels = reels(2);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        spinner
            .start(&mut scheduler, &reels, &[0, 1], &[0, 0], None::<NoHook>)
            .unwrap();
        let err = spinner
            .start(&mut scheduler, &reels, &[0, 1], &[0, 0], None::<NoHook>)
            .unwrap_err();
        assert_eq!(err, SpinError::AlreadyRunning);

        scheduler.step(Timestamp::from_millis(10_000), &mut reels);
        assert!(!spinner.is_running(&scheduler));
        assert!(spinner
            .start(&mut scheduler, &reels, &[0, 1], &[0, 0], None::<NoHook>)
            .is_ok());
    }

    #[test]
    fn test_argument_errors() {
        let reels = reels(2);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        assert_eq!(
            spinner
                .start(&mut scheduler, &reels, &[], &[], None::<NoHook>)
                .unwrap_err(),
            SpinError::NoReels
        );
        assert_eq!(
            spinner
                .start(&mut scheduler, &reels, &[0, 1], &[0], None::<NoHook>)
                .unwrap_err(),
            SpinError::ExtrasMismatch {
                reels: 2,
                extras: 1
            }
        );
    }

    #[test]
    fn test_missing_reel_registers_nothing() {
        let reels = reels(2);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        let err = spinner
            .start(&mut scheduler, &reels, &[0, 1, 7], &[0, 0, 0], None::<NoHook>)
            .unwrap_err();
        assert!(matches!(
            err,
            SpinError::Tween(TweenError::MissingTarget { .. })
        ));
        assert_eq!(scheduler.active_count(), 0);
        assert!(!spinner.is_running(&scheduler));
    }

    #[test]
    fn test_all_complete_fires_once_after_last_reel() {
        let mut reels = reels(3);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        // reel 0 gets enough extras to stop last
        spinner
            .start(
                &mut scheduler,
                &reels,
                &[0, 1, 2],
                &[3, 0, 0],
                Some(move |_: &mut HookContext<'_, Reels>| {
                    counter.set(counter.get() + 1);
                    Ok(())
                }),
            )
            .unwrap();

        scheduler.step(Timestamp::from_millis(3_800), &mut reels);
        assert_eq!(fired.get(), 0);
        scheduler.step(Timestamp::from_millis(4_300), &mut reels);
        assert_eq!(fired.get(), 1);
        scheduler.step(Timestamp::from_millis(9_000), &mut reels);
        assert_eq!(fired.get(), 1);
        assert_eq!(reels[0].position(), 13.0);
        assert_eq!(reels[2].position(), 20.0);
    }

    #[test]
    fn test_cancel_spin() {
        let mut reels = reels(2);
        let mut scheduler = TweenScheduler::new();
        let mut spinner = Spinner::new(SpinConfig::default());
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let spin = spinner
            .start(
                &mut scheduler,
                &reels,
                &[0, 1],
                &[0, 0],
                Some(move |_: &mut HookContext<'_, Reels>| {
                    flag.set(true);
                    Ok(())
                }),
            )
            .unwrap();

        scheduler.step(Timestamp::from_millis(1_000), &mut reels);
        assert_eq!(spin.cancel(&mut scheduler), 2);
        scheduler.step(Timestamp::from_millis(10_000), &mut reels);
        assert!(!fired.get());
        assert!(reels[0].position() < 10.0);
    }
}
