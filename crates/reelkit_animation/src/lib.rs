//! Reelkit Animation
//!
//! Tween scheduling for spinning slot-machine reels.
//!
//! # Features
//!
//! - **Easing**: deceleration, back and bounce curves, CSS cubic beziers
//! - **Tweens**: typed property accessors into caller-owned targets
//! - **Scheduler**: frame-driven stepping with exactly-once completion and
//!   per-tween hook isolation
//! - **Reels**: two-slot position tracking, velocity blur, symbol wrapping
//! - **Spins**: staggered multi-reel spins with an all-stopped callback

pub mod blur;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod property;
pub mod reel;
pub mod scheduler;
pub mod spin;
pub mod tween;

pub use blur::MotionBlur;
pub use clock::{FrameClock, Timestamp};
pub use config::{
    BlurConfig, EngineConfig, LayoutConfig, SchedulerConfig, SpinConfig, ZeroDurationPolicy,
};
pub use easing::Easing;
pub use error::{ConfigError, HookError, TweenError};
pub use property::{Frame, Property, Targets};
pub use reel::{PositionRing, Reel, SpriteId, SymbolSlot};
pub use scheduler::{
    HookContext, HookFailure, HookKind, StepReport, TweenHandle, TweenScheduler,
};
pub use spin::{SpinError, SpinHandle, SpinLeg, Spinner};
pub use tween::Tween;
