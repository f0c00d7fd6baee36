//! # Engine Configuration
//!
//! Every tunable of the field and the reveal sequence, loaded once from TOML.
//! Defaults reproduce the shipping look: 120 white streaks, a 2.5% per-frame
//! chance of a gold streak, and a 20-card spread at 80ms per card followed by
//! an 800ms pause before moving to `/result`.
//!
//! Any key may be omitted; missing keys take their default.
//!
//! ```toml
//! [field]
//! population = 200
//! seed = 7
//!
//! [field.highlight.spawn]
//! mode = "wall_clock"
//! per_second = 1.5
//!
//! [reveal]
//! count = 12
//! retrigger = "restart"
//! ```

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{StarfallError, StarfallResult};
use crate::geometry::Viewport;

/// Half-open uniform range `[min, max)`. A degenerate range always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound.
    pub min: f32,
    /// Exclusive upper bound.
    pub max: f32,
}

impl ValueRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform value from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Returns true if `value` could have been drawn from this range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        if self.max > self.min {
            value >= self.min && value < self.max
        } else {
            (value - self.min).abs() <= f32::EPSILON
        }
    }

    fn validate(&self, name: &str) -> StarfallResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(StarfallError::InvalidConfig(format!(
                "{name}: bounds must be finite"
            )));
        }
        if self.min > self.max {
            return Err(StarfallError::InvalidConfig(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// How the highlight streak's spawn chance is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// One Bernoulli trial per rendered frame. Perceived rate scales with
    /// frame rate.
    PerFrame {
        /// Chance per frame (0-1).
        probability: f64,
    },
    /// Poisson rate in spawns per second, converted to a per-frame chance
    /// from the measured frame delta.
    WallClock {
        /// Expected spawns per second while no highlight is live.
        per_second: f64,
    },
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self::PerFrame { probability: 0.025 }
    }
}

/// Ambient streak population parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Fall speed in px/frame.
    pub speed: ValueRange,
    /// Streak length in px.
    pub length: ValueRange,
    /// Per-streak opacity.
    pub opacity: ValueRange,
    /// Base opacity multiplied into every streak's own opacity.
    pub base_opacity: f32,
    /// Horizontal tail offset as a fraction of length.
    pub slant: f32,
    /// Stroke width in px.
    pub line_width: f32,
    /// Stroke colour before opacity is applied.
    pub color: Color,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            speed: ValueRange::new(2.0, 6.0),
            length: ValueRange::new(10.0, 30.0),
            opacity: ValueRange::new(0.5, 1.0),
            base_opacity: 1.0,
            slant: 0.4,
            line_width: 2.0,
            color: Color::WHITE,
        }
    }
}

/// Highlight streak parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Spawn chance evaluation.
    pub spawn: SpawnPolicy,
    /// Entry y coordinate (above the top edge).
    pub start_y: f32,
    /// Fall speed in px/frame.
    pub speed: ValueRange,
    /// Streak length in px.
    pub length: ValueRange,
    /// Opacity of the highlight.
    pub opacity: f32,
    /// Lateral drift per frame as a fraction of speed.
    pub drift_factor: f32,
    /// Horizontal tail offset as a fraction of length.
    pub slant: f32,
    /// Stroke width in px.
    pub line_width: f32,
    /// Distance below the bottom edge at which the highlight retires.
    pub exit_margin: f32,
    /// Stroke colour before opacity is applied.
    pub color: Color,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            spawn: SpawnPolicy::default(),
            start_y: -50.0,
            speed: ValueRange::new(8.0, 12.0),
            length: ValueRange::new(40.0, 70.0),
            opacity: 1.0,
            drift_factor: 0.4,
            slant: 0.6,
            line_width: 3.0,
            exit_margin: 100.0,
            color: Color::GOLD,
        }
    }
}

/// Particle field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of ambient streaks, fixed for the field's lifetime.
    pub population: usize,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Ambient streak parameters.
    pub ambient: AmbientConfig,
    /// Highlight streak parameters.
    pub highlight: HighlightConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            population: 120,
            seed: None,
            ambient: AmbientConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

/// What a second trigger does while a reveal is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// Keep the current run; drop the new trigger.
    #[default]
    Ignore,
    /// Cancel the current run's timers, clear the revealed set, start over.
    Restart,
}

/// Reveal sequence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Number of slots revealed per run.
    pub count: usize,
    /// Width of each revealed element in px.
    pub element_width: f32,
    /// Fraction of the viewport width the spread occupies.
    pub spread_fraction: f32,
    /// Extra leftward shift applied to every slot in px.
    pub left_bias: f32,
    /// Interval between reveals in milliseconds.
    pub cadence_ms: u64,
    /// Pause after the last reveal before navigating, in milliseconds.
    pub settle_ms: u64,
    /// Route navigated to when the run completes.
    pub destination: String,
    /// Behaviour on re-trigger while running.
    pub retrigger: RetriggerPolicy,
}

impl RevealConfig {
    /// Interval between reveals.
    #[must_use]
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Pause after the last reveal.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            count: 20,
            element_width: 160.0,
            spread_fraction: 0.9,
            left_bias: 100.0,
            cadence_ms: 80,
            settle_ms: 800,
            destination: "/result".to_string(),
            retrigger: RetriggerPolicy::Ignore,
        }
    }
}

/// Parameters of the simulated host used by the headless driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Initial viewport.
    pub viewport: Viewport,
    /// Frame period in milliseconds.
    pub frame_period_ms: u64,
}

impl HostConfig {
    /// Frame period.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            frame_period_ms: 16,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfallConfig {
    /// Simulated host parameters.
    pub host: HostConfig,
    /// Particle field parameters.
    pub field: FieldConfig,
    /// Reveal sequence parameters.
    pub reveal: RevealConfig,
}

impl StarfallConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::ConfigParse`] for malformed TOML and
    /// [`StarfallError::InvalidConfig`] for out-of-domain values.
    pub fn from_toml_str(text: &str) -> StarfallResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| StarfallError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> StarfallResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| StarfallError::io(path, &e))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Checks every value against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> StarfallResult<()> {
        if self.host.frame_period_ms == 0 {
            return Err(StarfallError::InvalidConfig(
                "host.frame_period_ms must be positive".into(),
            ));
        }

        let ambient = &self.field.ambient;
        ambient.speed.validate("field.ambient.speed")?;
        ambient.length.validate("field.ambient.length")?;
        ambient.opacity.validate("field.ambient.opacity")?;
        if ambient.opacity.min < 0.0 || ambient.opacity.max > 1.0 {
            return Err(StarfallError::InvalidConfig(
                "field.ambient.opacity must lie within [0, 1]".into(),
            ));
        }
        if ambient.speed.min <= 0.0 {
            return Err(StarfallError::InvalidConfig(
                "field.ambient.speed must be positive".into(),
            ));
        }
        unit("field.ambient.base_opacity", ambient.base_opacity)?;
        finite("field.ambient.slant", ambient.slant)?;
        stroke_width("field.ambient.line_width", ambient.line_width)?;

        let highlight = &self.field.highlight;
        highlight.speed.validate("field.highlight.speed")?;
        highlight.length.validate("field.highlight.length")?;
        if highlight.speed.min <= 0.0 {
            return Err(StarfallError::InvalidConfig(
                "field.highlight.speed must be positive".into(),
            ));
        }
        unit("field.highlight.opacity", highlight.opacity)?;
        finite("field.highlight.start_y", highlight.start_y)?;
        finite("field.highlight.drift_factor", highlight.drift_factor)?;
        finite("field.highlight.slant", highlight.slant)?;
        stroke_width("field.highlight.line_width", highlight.line_width)?;
        if !(highlight.exit_margin >= 0.0 && highlight.exit_margin.is_finite()) {
            return Err(StarfallError::InvalidConfig(format!(
                "field.highlight.exit_margin {} must be finite and non-negative",
                highlight.exit_margin
            )));
        }
        match highlight.spawn {
            SpawnPolicy::PerFrame { probability } if !(0.0..=1.0).contains(&probability) => {
                return Err(StarfallError::InvalidConfig(format!(
                    "field.highlight.spawn.probability {probability} outside [0, 1]"
                )));
            }
            SpawnPolicy::WallClock { per_second } if !(per_second >= 0.0 && per_second.is_finite()) => {
                return Err(StarfallError::InvalidConfig(format!(
                    "field.highlight.spawn.per_second {per_second} must be a non-negative rate"
                )));
            }
            _ => {}
        }

        let reveal = &self.reveal;
        if reveal.count == 0 {
            return Err(StarfallError::InvalidConfig("reveal.count must be at least 1".into()));
        }
        if reveal.cadence_ms == 0 {
            return Err(StarfallError::InvalidConfig(
                "reveal.cadence_ms must be positive".into(),
            ));
        }
        if !(reveal.spread_fraction > 0.0 && reveal.spread_fraction <= 1.0) {
            return Err(StarfallError::InvalidConfig(format!(
                "reveal.spread_fraction {} outside (0, 1]",
                reveal.spread_fraction
            )));
        }
        if !(reveal.element_width >= 0.0 && reveal.element_width.is_finite()) {
            return Err(StarfallError::InvalidConfig(format!(
                "reveal.element_width {} must be finite and non-negative",
                reveal.element_width
            )));
        }
        finite("reveal.left_bias", reveal.left_bias)?;

        Ok(())
    }
}

/// Widest stroke the surfaces accept, in px.
const MAX_LINE_WIDTH: f32 = 64.0;

fn finite(name: &str, value: f32) -> StarfallResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StarfallError::InvalidConfig(format!("{name} must be finite")))
    }
}

fn unit(name: &str, value: f32) -> StarfallResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(StarfallError::InvalidConfig(format!(
            "{name} {value} outside [0, 1]"
        )))
    }
}

fn stroke_width(name: &str, value: f32) -> StarfallResult<()> {
    if value > 0.0 && value <= MAX_LINE_WIDTH {
        Ok(())
    } else {
        Err(StarfallError::InvalidConfig(format!(
            "{name} {value} outside (0, {MAX_LINE_WIDTH}]"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_defaults_are_valid() {
        StarfallConfig::default().validate().unwrap();
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config =
            StarfallConfig::from_toml_str(include_str!("../../../config/starfall.toml")).unwrap();
        let defaults = StarfallConfig::default();
        assert_eq!(config.host, defaults.host);
        assert_eq!(config.field.ambient, defaults.field.ambient);
        assert_eq!(config.field.highlight.spawn, defaults.field.highlight.spawn);
        assert_eq!(config.field.highlight.speed, defaults.field.highlight.speed);
        assert_eq!(config.reveal, defaults.reveal);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StarfallConfig::from_toml_str(
            r#"
            [field]
            population = 40
            seed = 9

            [reveal]
            retrigger = "restart"
            "#,
        )
        .unwrap();

        assert_eq!(config.field.population, 40);
        assert_eq!(config.field.seed, Some(9));
        assert_eq!(config.field.ambient, AmbientConfig::default());
        assert_eq!(config.reveal.count, 20);
        assert_eq!(config.reveal.retrigger, RetriggerPolicy::Restart);
    }

    #[test]
    fn test_wall_clock_policy_parses() {
        let config = StarfallConfig::from_toml_str(
            r#"
            [field.highlight.spawn]
            mode = "wall_clock"
            per_second = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(
            config.field.highlight.spawn,
            SpawnPolicy::WallClock { per_second: 1.5 }
        );
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = StarfallConfig::from_toml_str(
            r#"
            [field.highlight.spawn]
            mode = "per_frame"
            probability = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, StarfallError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = StarfallConfig::default();
        config.field.ambient.length = ValueRange::new(30.0, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_line_width() {
        let mut config = StarfallConfig::default();
        config.field.ambient.line_width = 1e5;
        assert!(config.validate().is_err());

        let mut config = StarfallConfig::default();
        config.field.highlight.line_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let cases: [fn(&mut StarfallConfig); 6] = [
            |c| c.reveal.left_bias = f32::NAN,
            |c| c.reveal.element_width = f32::NAN,
            |c| c.field.ambient.slant = f32::INFINITY,
            |c| c.field.ambient.base_opacity = f32::NAN,
            |c| c.field.highlight.exit_margin = f32::NAN,
            |c| c.field.highlight.opacity = 2.0,
        ];
        for apply in cases {
            let mut config = StarfallConfig::default();
            apply(&mut config);
            assert!(
                matches!(config.validate(), Err(StarfallError::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_rejects_zero_count() {
        let mut config = StarfallConfig::default();
        config.reveal.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = StarfallConfig::from_toml_str("[field\npopulation = ").unwrap_err();
        assert!(matches!(err, StarfallError::ConfigParse(_)));
    }

    #[test]
    fn test_range_sampling_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = ValueRange::new(2.0, 6.0);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
        let fixed = ValueRange::new(1.0, 1.0);
        assert!((fixed.sample(&mut rng) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_durations() {
        let reveal = RevealConfig::default();
        assert_eq!(reveal.cadence(), Duration::from_millis(80));
        assert_eq!(reveal.settle_delay(), Duration::from_millis(800));
    }
}
