//! Fixed-rate spin simulation

use anyhow::{bail, Result};
use reelkit_animation::{
    EngineConfig, HookContext, Reel, SpinHandle, Spinner, SpriteId, Timestamp, TweenScheduler,
};
use slotmap::{new_key_type, SlotMap};
use std::time::Duration;

new_key_type! {
    pub struct ReelId;
}

type Reels = SlotMap<ReelId, Reel>;

/// Upper bound on simulated time, in case a config never settles
const MAX_SIMULATED: Duration = Duration::from_secs(120);

pub struct Summary {
    pub frames: u64,
    pub elapsed: Timestamp,
    pub wraps: usize,
    pub positions: Vec<f32>,
}

pub struct Simulation {
    config: EngineConfig,
    reels: Reels,
    order: Vec<ReelId>,
    scheduler: TweenScheduler<Reels>,
    spinner: Spinner<ReelId>,
    spin: Option<SpinHandle<ReelId>>,
}

impl Simulation {
    pub fn new(config: EngineConfig, reel_count: usize, symbols: u64) -> Self {
        let mut reels = Reels::with_key();
        let order = (0..reel_count as u64)
            .map(|r| {
                let sprites = (0..symbols).map(move |s| SpriteId(r * symbols + s));
                reels.insert(Reel::new(sprites, config.blur))
            })
            .collect();

        Self {
            scheduler: TweenScheduler::with_config(config.scheduler),
            spinner: Spinner::new(config.spin),
            spin: None,
            config,
            reels,
            order,
        }
    }

    pub fn spin(&mut self, extras: &[u32]) -> Result<()> {
        let spin = self.spinner.start(
            &mut self.scheduler,
            &self.reels,
            &self.order,
            extras,
            Some(|ctx: &mut HookContext<'_, Reels>| {
                tracing::info!(at = %ctx.scheduler.now(), "all reels stopped");
                Ok(())
            }),
        )?;

        for (index, leg) in spin.legs().iter().enumerate() {
            tracing::info!(
                reel = index,
                target = leg.target,
                duration_ms = leg.duration.as_millis() as u64,
                "reel spinning"
            );
        }
        self.spin = Some(spin);
        Ok(())
    }

    pub fn run(&mut self, fps: u32, report_every: u64) -> Result<Summary> {
        let Some(spin) = self.spin.clone() else {
            bail!("no spin started");
        };

        let frame_micros = 1_000_000 / u64::from(fps);
        let symbol_size = self.config.layout.symbol_size;
        let mut frames = 0;
        let mut wraps = 0;
        let mut now = Timestamp::zero();

        while spin.is_running(&self.scheduler) {
            frames += 1;
            now = Timestamp::from_micros(frames * frame_micros);
            if now.saturating_since(Timestamp::zero()) > MAX_SIMULATED {
                bail!("spin did not finish within {}s", MAX_SIMULATED.as_secs());
            }

            let report = self.scheduler.step(now, &mut self.reels);
            for failure in &report.failures {
                tracing::warn!(hook = ?failure.hook, error = %failure.error, "hook failed");
            }

            for (index, id) in self.order.iter().enumerate() {
                let reel = &mut self.reels[*id];
                let wrapped = reel.layout_symbols(symbol_size);
                for symbol in &wrapped {
                    tracing::trace!(reel = index, symbol, "symbol wrapped, swap texture");
                }
                wraps += wrapped.len();
            }

            if frames % report_every == 0 {
                for (index, id) in self.order.iter().enumerate() {
                    let reel = &self.reels[*id];
                    tracing::info!(
                        frame = frames,
                        reel = index,
                        position = reel.position(),
                        blur = reel.blur_intensity(),
                        "reel state"
                    );
                }
            }
        }

        Ok(Summary {
            frames,
            elapsed: now,
            wraps,
            positions: self
                .order
                .iter()
                .map(|id| self.reels[*id].position())
                .collect(),
        })
    }
}
