//! Streak entities.
//!
//! Ambient and highlight streaks share one shape (a head point, a fall
//! speed, a length and an opacity) and differ only in the payload carried
//! by [`StreakKind`]. Neither variant keeps an identity across a reset:
//! recycling redraws every attribute.

use rand::Rng;
use starfall_core::{
    AmbientConfig, Color, FieldConfig, HighlightConfig, Point, Surface, ValueRange, Viewport,
};

/// Common moving-streak shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    /// Head x coordinate.
    pub x: f32,
    /// Head y coordinate.
    pub y: f32,
    /// Fall speed in px/frame.
    pub speed: f32,
    /// Length in px.
    pub length: f32,
    /// Opacity (0-1).
    pub opacity: f32,
}

/// Variant payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreakKind {
    /// Continuously recycled background streak.
    Ambient,
    /// The rare gold streak.
    Highlight {
        /// Lateral movement per frame.
        drift: f32,
        /// Cleared once the streak has left the surface.
        live: bool,
    },
}

/// What a single update did to a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved and still in play.
    Moved,
    /// Ambient streak fell off the bottom and was reset above the top.
    Recycled,
    /// Highlight streak passed the exit margin and is no longer live.
    Retired,
}

/// A streak plus its variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Shared shape.
    pub streak: Streak,
    /// Variant payload.
    pub kind: StreakKind,
}

impl Particle {
    /// A fresh ambient streak somewhere above the top edge.
    pub fn ambient<R: Rng + ?Sized>(config: &AmbientConfig, bounds: Viewport, rng: &mut R) -> Self {
        let x = ValueRange::new(0.0, bounds.width_f32()).sample(rng);
        // Strictly negative even on a zero-height surface.
        let y = ValueRange::new(-bounds.height_f32().max(1.0), 0.0).sample(rng);
        Self {
            streak: Streak {
                x,
                y,
                speed: config.speed.sample(rng),
                length: config.length.sample(rng),
                opacity: config.opacity.sample(rng),
            },
            kind: StreakKind::Ambient,
        }
    }

    /// A fresh highlight streak at the configured entry height.
    pub fn highlight<R: Rng + ?Sized>(
        config: &HighlightConfig,
        bounds: Viewport,
        rng: &mut R,
    ) -> Self {
        let speed = config.speed.sample(rng);
        Self {
            streak: Streak {
                x: ValueRange::new(0.0, bounds.width_f32()).sample(rng),
                y: config.start_y,
                speed,
                length: config.length.sample(rng),
                opacity: config.opacity,
            },
            kind: StreakKind::Highlight {
                drift: speed * config.drift_factor,
                live: true,
            },
        }
    }

    /// Returns true for the highlight variant.
    #[must_use]
    pub const fn is_highlight(&self) -> bool {
        matches!(self.kind, StreakKind::Highlight { .. })
    }

    /// Returns false only for a retired highlight.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        match self.kind {
            StreakKind::Ambient => true,
            StreakKind::Highlight { live, .. } => live,
        }
    }

    /// Advances one frame against the current bounds.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        config: &FieldConfig,
        bounds: Viewport,
        rng: &mut R,
    ) -> Advance {
        self.streak.y += self.streak.speed;

        match self.kind {
            StreakKind::Ambient => {
                if self.streak.y > bounds.height_f32() {
                    *self = Self::ambient(&config.ambient, bounds, rng);
                    Advance::Recycled
                } else {
                    Advance::Moved
                }
            }
            StreakKind::Highlight { drift, .. } => {
                self.streak.x += drift;
                if self.streak.y > bounds.height_f32() + config.highlight.exit_margin {
                    self.kind = StreakKind::Highlight { drift, live: false };
                    Advance::Retired
                } else {
                    Advance::Moved
                }
            }
        }
    }

    /// Head point, tail point, colour and stroke width.
    #[must_use]
    pub fn segment(&self, config: &FieldConfig) -> (Point, Point, Color, f32) {
        let s = &self.streak;
        let (slant, color, width) = match self.kind {
            StreakKind::Ambient => {
                let a = &config.ambient;
                (a.slant, a.color.scale_alpha(a.base_opacity * s.opacity), a.line_width)
            }
            StreakKind::Highlight { .. } => {
                let h = &config.highlight;
                (h.slant, h.color.scale_alpha(s.opacity), h.line_width)
            }
        };
        let head = Point::new(s.x, s.y);
        let tail = Point::new(s.x - s.length * slant, s.y - s.length);
        (head, tail, color, width)
    }

    /// Strokes the streak onto `surface`.
    pub fn draw<S: Surface + ?Sized>(&self, config: &FieldConfig, surface: &mut S) {
        let (head, tail, color, width) = self.segment(config);
        surface.stroke_line(head, tail, color, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_ambient_spawns_above_top_edge() {
        let config = FieldConfig::default();
        let bounds = Viewport::new(800, 600);
        let mut rng = rng();
        for _ in 0..500 {
            let p = Particle::ambient(&config.ambient, bounds, &mut rng);
            assert!(p.streak.y < 0.0 && p.streak.y >= -600.0);
            assert!(p.streak.x >= 0.0 && p.streak.x < 800.0);
            assert!(config.ambient.speed.contains(p.streak.speed));
            assert!(config.ambient.length.contains(p.streak.length));
            assert!(config.ambient.opacity.contains(p.streak.opacity));
        }
    }

    #[test]
    fn test_ambient_recycles_past_bottom() {
        let config = FieldConfig::default();
        let bounds = Viewport::new(800, 600);
        let mut rng = rng();
        let mut p = Particle::ambient(&config.ambient, bounds, &mut rng);
        p.streak.y = 599.0;
        p.streak.speed = 5.0;

        assert_eq!(p.advance(&config, bounds, &mut rng), Advance::Recycled);
        assert!(p.streak.y < 0.0);
        assert_eq!(p.kind, StreakKind::Ambient);
    }

    #[test]
    fn test_ambient_at_exact_height_is_not_recycled() {
        let config = FieldConfig::default();
        let bounds = Viewport::new(800, 600);
        let mut rng = rng();
        let mut p = Particle::ambient(&config.ambient, bounds, &mut rng);
        p.streak.y = 596.0;
        p.streak.speed = 4.0;
        assert_eq!(p.advance(&config, bounds, &mut rng), Advance::Moved);
        assert!((p.streak.y - 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_highlight_drifts_and_retires() {
        let config = FieldConfig::default();
        let bounds = Viewport::new(800, 600);
        let mut rng = rng();
        let mut p = Particle::highlight(&config.highlight, bounds, &mut rng);
        assert!((p.streak.y + 50.0).abs() < f32::EPSILON);
        let StreakKind::Highlight { drift, live } = p.kind else {
            panic!("expected highlight");
        };
        assert!(live);
        assert!((drift - p.streak.speed * 0.4).abs() < 1e-5);

        let x0 = p.streak.x;
        assert_eq!(p.advance(&config, bounds, &mut rng), Advance::Moved);
        assert!((p.streak.x - (x0 + drift)).abs() < 1e-4);

        let mut frames = 1;
        while p.advance(&config, bounds, &mut rng) != Advance::Retired {
            frames += 1;
            assert!(frames < 200, "highlight never retired");
        }
        assert!(!p.is_live());
        assert!(p.streak.y > 700.0);
    }

    #[test]
    fn test_segment_geometry() {
        let config = FieldConfig::default();
        let p = Particle {
            streak: Streak {
                x: 100.0,
                y: 50.0,
                speed: 3.0,
                length: 20.0,
                opacity: 0.5,
            },
            kind: StreakKind::Ambient,
        };
        let (head, tail, color, width) = p.segment(&config);
        assert_eq!(head, Point::new(100.0, 50.0));
        assert!((tail.x - 92.0).abs() < 1e-4 && (tail.y - 30.0).abs() < 1e-4);
        assert!((color.a - 0.5).abs() < f32::EPSILON);
        assert!((width - 2.0).abs() < f32::EPSILON);

        let h = Particle {
            kind: StreakKind::Highlight { drift: 4.0, live: true },
            ..p
        };
        let (_, tail, color, width) = h.segment(&config);
        assert!((tail.x - 88.0).abs() < 1e-4 && (tail.y - 30.0).abs() < 1e-4);
        let [r, g, b, _] = color.to_rgba8();
        assert_eq!((r, g, b), (255, 215, 0));
        assert!((width - 3.0).abs() < f32::EPSILON);
    }
}
