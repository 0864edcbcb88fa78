//! Typed property accessors and target stores
//!
//! A tween never holds its target. It holds a key into a caller-owned
//! [`Targets`] store and a [`Property`] describing how to read and write one
//! numeric field of the target.

use slotmap::{Key, SlotMap};
use std::fmt;
use std::time::Duration;

/// What kind of write the scheduler is performing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// An intermediate eased value. `interval` is the time since this
    /// tween's previous write, or since its start time on the first write
    /// (zero only when that write lands exactly on the start time).
    Advance { interval: Duration },
    /// The final write of a finished tween, always the exact end value.
    Settle,
}

/// Accessor pair into one `f32` field of `T`.
///
/// ```ignore
/// const OPACITY: Property<Card> = Property::new(
///     "opacity",
///     |card: &Card| card.opacity,
///     |card: &mut Card, value: f32, _: Frame| card.opacity = value,
/// );
/// ```
pub struct Property<T> {
    name: &'static str,
    get: fn(&T) -> f32,
    set: fn(&mut T, f32, Frame),
}

impl<T> Property<T> {
    pub const fn new(name: &'static str, get: fn(&T) -> f32, set: fn(&mut T, f32, Frame)) -> Self {
        Self { name, get, set }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, target: &T) -> f32 {
        (self.get)(target)
    }

    pub fn set(&self, target: &mut T, value: f32, frame: Frame) {
        (self.set)(target, value, frame)
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}

/// A caller-owned collection of animation targets.
pub trait Targets {
    type Key: Copy + PartialEq + fmt::Debug;
    type Target;

    fn target(&self, key: Self::Key) -> Option<&Self::Target>;

    fn target_mut(&mut self, key: Self::Key) -> Option<&mut Self::Target>;
}

impl<K: Key, T> Targets for SlotMap<K, T> {
    type Key = K;
    type Target = T;

    fn target(&self, key: K) -> Option<&T> {
        self.get(key)
    }

    fn target_mut(&mut self, key: K) -> Option<&mut T> {
        self.get_mut(key)
    }
}

impl<T> Targets for Vec<T> {
    type Key = usize;
    type Target = T;

    fn target(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    fn target_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Card {
        opacity: f32,
        settled: bool,
    }

    const OPACITY: Property<Card> = Property::new(
        "opacity",
        |card: &Card| card.opacity,
        |card: &mut Card, value: f32, frame: Frame| {
            card.opacity = value;
            card.settled = frame == Frame::Settle;
        },
    );

    #[test]
    fn test_property_reads_and_writes() {
        let mut card = Card {
            opacity: 0.25,
            settled: false,
        };
        assert_eq!(OPACITY.name(), "opacity");
        assert_eq!(OPACITY.get(&card), 0.25);

        OPACITY.set(
            &mut card,
            0.5,
            Frame::Advance {
                interval: Duration::from_millis(16),
            },
        );
        assert_eq!(card.opacity, 0.5);
        assert!(!card.settled);

        OPACITY.set(&mut card, 1.0, Frame::Settle);
        assert_eq!(card.opacity, 1.0);
        assert!(card.settled);
    }

    #[test]
    fn test_vec_targets() {
        let mut cards = vec![Card {
            opacity: 0.0,
            settled: false,
        }];
        assert!(cards.target(0).is_some());
        assert!(cards.target(1).is_none());
        cards.target_mut(0).unwrap().opacity = 1.0;
        assert_eq!(cards[0].opacity, 1.0);
    }
}
