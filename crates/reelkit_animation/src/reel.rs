//! Reel state
//!
//! A reel is one spinning column of symbols. The renderer owns the sprites
//! and reads back `position`, symbol offsets and blur intensity each frame;
//! the scheduler writes `position` through [`Reel::POSITION`].

use crate::blur::MotionBlur;
use crate::config::BlurConfig;
use crate::property::{Frame, Property};
use smallvec::SmallVec;

/// Opaque handle to a sprite owned by the renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u64);

/// One symbol on a reel and its laid-out vertical offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolSlot {
    pub sprite: SpriteId,
    /// Offset from the top of the reel in pixels
    pub y: f32,
}

/// Current and previous scroll position.
///
/// Both slots change together in [`PositionRing::push`], so `delta` always
/// describes exactly one write.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionRing {
    current: f32,
    previous: f32,
}

impl PositionRing {
    pub fn at(position: f32) -> Self {
        Self {
            current: position,
            previous: position,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn previous(&self) -> f32 {
        self.previous
    }

    pub fn delta(&self) -> f32 {
        self.current - self.previous
    }

    pub fn push(&mut self, position: f32) {
        self.previous = self.current;
        self.current = position;
    }
}

#[derive(Clone, Debug)]
pub struct Reel {
    motion: PositionRing,
    symbols: Vec<SymbolSlot>,
    blur: MotionBlur,
}

impl Reel {
    /// The scroll position, in symbols.
    ///
    /// Intermediate writes update the blur from the position change;
    /// the settle write returns the blur to rest.
    pub const POSITION: Property<Reel> = Property::new(
        "position",
        |reel: &Reel| reel.position(),
        |reel: &mut Reel, value: f32, frame: Frame| reel.apply_position(value, frame),
    );

    pub fn new(sprites: impl IntoIterator<Item = SpriteId>, blur: BlurConfig) -> Self {
        let symbols = sprites
            .into_iter()
            .map(|sprite| SymbolSlot { sprite, y: 0.0 })
            .collect();
        Self {
            motion: PositionRing::default(),
            symbols,
            blur: MotionBlur::new(blur),
        }
    }

    /// Start at a given position instead of zero
    pub fn with_position(mut self, position: f32) -> Self {
        self.motion = PositionRing::at(position);
        self
    }

    pub fn position(&self) -> f32 {
        self.motion.current()
    }

    pub fn previous_position(&self) -> f32 {
        self.motion.previous()
    }

    pub fn motion(&self) -> PositionRing {
        self.motion
    }

    pub fn blur(&self) -> &MotionBlur {
        &self.blur
    }

    pub fn blur_intensity(&self) -> f32 {
        self.blur.intensity()
    }

    pub fn symbols(&self) -> &[SymbolSlot] {
        &self.symbols
    }

    /// Return the blur to rest, e.g. after canceling a spin mid-flight
    pub fn stop_blur(&mut self) {
        self.blur.reset();
    }

    fn apply_position(&mut self, value: f32, frame: Frame) {
        self.motion.push(value);
        match frame {
            Frame::Advance { interval } => self.blur.update(self.motion.delta(), interval),
            Frame::Settle => self.blur.reset(),
        }
    }

    /// Lay symbols out for the current position.
    ///
    /// Each symbol sits at `((position + index) mod count) * size - size`,
    /// so one symbol is always parked above the visible window. Returns the
    /// indices of symbols that wrapped from the bottom back to the top since
    /// the previous layout; the renderer swaps their texture.
    pub fn layout_symbols(&mut self, symbol_size: f32) -> SmallVec<[usize; 4]> {
        let mut wrapped = SmallVec::new();
        let count = self.symbols.len() as f32;
        if count == 0.0 {
            return wrapped;
        }

        let position = self.motion.current();
        for (index, slot) in self.symbols.iter_mut().enumerate() {
            let previous_y = slot.y;
            slot.y = (position + index as f32).rem_euclid(count) * symbol_size - symbol_size;
            if slot.y < 0.0 && previous_y > symbol_size {
                wrapped.push(index);
            }
        }

        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reel(count: u64) -> Reel {
        Reel::new((0..count).map(SpriteId), BlurConfig::default())
    }

    #[test]
    fn test_ring_push() {
        let mut ring = PositionRing::at(2.0);
        assert_eq!(ring.delta(), 0.0);
        ring.push(2.5);
        assert_eq!(ring.previous(), 2.0);
        assert_eq!(ring.current(), 2.5);
        assert_eq!(ring.delta(), 0.5);
    }

    #[test]
    fn test_position_write_updates_previous_and_blur() {
        let mut reel = reel(4).with_position(1.0);
        Reel::POSITION.set(
            &mut reel,
            1.5,
            Frame::Advance {
                interval: Duration::from_micros(16_667),
            },
        );
        assert_eq!(reel.previous_position(), 1.0);
        assert_eq!(reel.position(), 1.5);
        assert!((reel.blur_intensity() - 4.0).abs() < 0.01);

        Reel::POSITION.set(
            &mut reel,
            1.75,
            Frame::Advance {
                interval: Duration::from_micros(16_667),
            },
        );
        assert_eq!(reel.previous_position(), 1.5);
        assert!((reel.blur_intensity() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_settle_resets_blur() {
        let mut reel = reel(4);
        Reel::POSITION.set(
            &mut reel,
            3.0,
            Frame::Advance {
                interval: Duration::from_micros(16_667),
            },
        );
        assert!(reel.blur_intensity() > 0.0);
        Reel::POSITION.set(&mut reel, 3.2, Frame::Settle);
        assert_eq!(reel.position(), 3.2);
        assert_eq!(reel.blur_intensity(), 0.0);
    }

    #[test]
    fn test_layout_positions() {
        let mut reel = reel(4);
        reel.layout_symbols(100.0);
        let ys: Vec<f32> = reel.symbols().iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![-100.0, 0.0, 100.0, 200.0]);

        reel = reel.with_position(1.5);
        reel.layout_symbols(100.0);
        let ys: Vec<f32> = reel.symbols().iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![50.0, 150.0, 250.0, -50.0]);
    }

    #[test]
    fn test_layout_reports_wrapped_symbols() {
        let mut reel = reel(4);
        reel.layout_symbols(100.0);
        // symbol 3 sits at the bottom (200); one more symbol wraps it to the top
        reel = reel.with_position(1.25);
        let wrapped = reel.layout_symbols(100.0);
        assert_eq!(wrapped.as_slice(), &[3]);
        assert_eq!(reel.symbols()[3].y, -75.0);
    }

    #[test]
    fn test_layout_negative_position_wraps_euclidean() {
        let mut reel = reel(3).with_position(-1.0);
        reel.layout_symbols(10.0);
        let ys: Vec<f32> = reel.symbols().iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![10.0, -10.0, 0.0]);
    }

    #[test]
    fn test_empty_reel_layout() {
        let mut reel = Reel::new(Vec::new(), BlurConfig::default());
        assert!(reel.layout_symbols(100.0).is_empty());
    }
}
