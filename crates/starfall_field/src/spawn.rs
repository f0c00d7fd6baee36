//! Highlight spawn gate.
//!
//! Turns a [`SpawnPolicy`] into one Bernoulli trial per frame. The gate is
//! fed the host time of every frame (trial or not) so the wall-clock policy
//! always sees the true frame delta.

use std::time::Duration;

use rand::Rng;
use starfall_core::SpawnPolicy;

/// Per-frame spawn decision.
#[derive(Debug, Clone)]
pub struct SpawnGate {
    policy: SpawnPolicy,
    last_frame: Option<Duration>,
    delta: Duration,
}

impl SpawnGate {
    /// Creates a gate for `policy`.
    #[must_use]
    pub const fn new(policy: SpawnPolicy) -> Self {
        Self {
            policy,
            last_frame: None,
            delta: Duration::ZERO,
        }
    }

    /// Records a frame at host time `now`.
    ///
    /// The first frame after construction has a zero delta.
    pub fn observe(&mut self, now: Duration) {
        self.delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame = Some(now);
    }

    /// Time since the previous observed frame.
    #[must_use]
    pub const fn delta(&self) -> Duration {
        self.delta
    }

    /// Chance of spawning on the current frame, always within `[0, 1]`.
    #[must_use]
    pub fn probability(&self) -> f64 {
        let p = match self.policy {
            SpawnPolicy::PerFrame { probability } => probability,
            SpawnPolicy::WallClock { per_second } => {
                1.0 - (-per_second * self.delta.as_secs_f64()).exp()
            }
        };
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    /// Runs the trial for the current frame.
    pub fn trial<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen_bool(self.probability())
    }
}
