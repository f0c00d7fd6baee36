//! The particle field.
//!
//! A fixed population of ambient streaks plus at most one highlight. The
//! field knows nothing about the host: it is stepped with the host time of
//! each frame and drawn onto whatever [`Surface`] the caller hands it.
//!
//! ## Per-frame order
//!
//! 1. Advance every ambient streak (recycling those past the bottom edge)
//! 2. If a highlight exists, advance it and drop it once retired
//! 3. Otherwise run one spawn trial; a new highlight waits for the next frame
//! 4. Draw

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use starfall_core::{FieldConfig, Surface, Viewport};

use crate::spawn::SpawnGate;
use crate::streak::{Advance, Particle};

/// Counters accumulated over the field's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Frames stepped.
    pub frames: u64,
    /// Ambient streaks recycled.
    pub recycled: u64,
    /// Highlights spawned.
    pub highlights_spawned: u64,
    /// Highlights retired.
    pub highlights_retired: u64,
}

/// What one step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Ambient streaks recycled this frame.
    pub recycled: usize,
    /// A highlight was spawned this frame.
    pub spawned: bool,
    /// The highlight retired this frame.
    pub retired: bool,
}

/// Ambient streaks plus the optional highlight.
#[derive(Debug, Clone)]
pub struct ParticleField<R: Rng = ChaCha8Rng> {
    config: FieldConfig,
    bounds: Viewport,
    ambient: Vec<Particle>,
    highlight: Option<Particle>,
    /// Set on the spawning frame; the highlight is not drawn until stepped.
    highlight_fresh: bool,
    gate: SpawnGate,
    rng: R,
    stats: FieldStats,
}

impl ParticleField<ChaCha8Rng> {
    /// Creates a field seeded from `config.seed`, or from OS entropy when no
    /// seed is set.
    #[must_use]
    pub fn new(config: FieldConfig, bounds: Viewport) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, bounds, rng)
    }
}

impl<R: Rng> ParticleField<R> {
    /// Creates a field drawing from `rng`.
    #[must_use]
    pub fn with_rng(config: FieldConfig, bounds: Viewport, mut rng: R) -> Self {
        let ambient = (0..config.population)
            .map(|_| Particle::ambient(&config.ambient, bounds, &mut rng))
            .collect();
        tracing::debug!(
            "Particle field created: {} ambient streaks in {}x{}",
            config.population,
            bounds.width,
            bounds.height
        );
        Self {
            gate: SpawnGate::new(config.highlight.spawn),
            config,
            bounds,
            ambient,
            highlight: None,
            highlight_fresh: false,
            rng,
            stats: FieldStats::default(),
        }
    }

    /// Changes the off-screen bounds. Particle positions are untouched.
    pub fn resize(&mut self, bounds: Viewport) {
        tracing::debug!(
            "Field bounds {}x{} -> {}x{}",
            self.bounds.width,
            self.bounds.height,
            bounds.width,
            bounds.height
        );
        self.bounds = bounds;
    }

    /// Redraws every ambient streak's starting position across `bounds` and
    /// drops any highlight. Counters are kept.
    pub fn repopulate(&mut self, bounds: Viewport) {
        tracing::debug!(
            "Field repopulated for {}x{}",
            bounds.width,
            bounds.height
        );
        self.bounds = bounds;
        for particle in &mut self.ambient {
            *particle = Particle::ambient(&self.config.ambient, bounds, &mut self.rng);
        }
        self.highlight = None;
        self.highlight_fresh = false;
    }

    /// Advances the simulation by one frame at host time `now`.
    pub fn step(&mut self, now: Duration) -> FrameReport {
        let mut report = FrameReport::default();
        self.gate.observe(now);
        self.highlight_fresh = false;

        for particle in &mut self.ambient {
            if particle.advance(&self.config, self.bounds, &mut self.rng) == Advance::Recycled {
                report.recycled += 1;
            }
        }

        if let Some(highlight) = self.highlight.as_mut() {
            if highlight.advance(&self.config, self.bounds, &mut self.rng) == Advance::Retired {
                tracing::debug!("Highlight retired at y={:.1}", highlight.streak.y);
                self.highlight = None;
                report.retired = true;
            }
        } else if self.gate.trial(&mut self.rng) {
            self.spawn_highlight();
            report.spawned = true;
        }

        self.stats.frames += 1;
        self.stats.recycled += report.recycled as u64;
        if report.retired {
            self.stats.highlights_retired += 1;
        }
        report
    }

    /// Draws every ambient streak, then the highlight if it has been stepped
    /// at least once.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for particle in &self.ambient {
            particle.draw(&self.config, surface);
        }
        if let Some(highlight) = &self.highlight {
            if !self.highlight_fresh {
                highlight.draw(&self.config, surface);
            }
        }
    }

    /// Clears `surface`, steps, and draws: one full frame.
    pub fn frame<S: Surface + ?Sized>(&mut self, now: Duration, surface: &mut S) -> FrameReport {
        surface.clear(surface.bounds());
        let report = self.step(now);
        self.draw(surface);
        report
    }

    /// Spawns a highlight if none exists. Returns false if one was already
    /// live.
    pub fn spawn_highlight(&mut self) -> bool {
        if self.highlight.is_some() {
            return false;
        }
        let highlight = Particle::highlight(&self.config.highlight, self.bounds, &mut self.rng);
        tracing::debug!(
            "Highlight spawned at x={:.1} speed={:.2}",
            highlight.streak.x,
            highlight.streak.speed
        );
        self.highlight = Some(highlight);
        self.highlight_fresh = true;
        self.stats.highlights_spawned += 1;
        true
    }

    /// Ambient streaks.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.ambient
    }

    /// The live highlight, if any.
    #[must_use]
    pub const fn highlight(&self) -> Option<&Particle> {
        self.highlight.as_ref()
    }

    /// Number of ambient streaks.
    #[must_use]
    pub fn population(&self) -> usize {
        self.ambient.len()
    }

    /// Current off-screen bounds.
    #[must_use]
    pub const fn bounds(&self) -> Viewport {
        self.bounds
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> FieldStats {
        self.stats
    }

    /// Field configuration.
    #[must_use]
    pub const fn config(&self) -> &FieldConfig {
        &self.config
    }
}
