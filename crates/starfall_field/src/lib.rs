//! # Starfall Field
//!
//! Particle field renderer: a fixed population of falling white streaks and,
//! every so often, a single gold highlight streak drifting across them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ FieldRenderer  (frame request + resize listener)     │
//! │   ├─ ParticleField                                   │
//! │   │    ├─ ambient: Vec<Particle>   (fixed size)      │
//! │   │    ├─ highlight: Option<Particle>  (0 or 1)      │
//! │   │    └─ SpawnGate  (per-frame or wall-clock)       │
//! │   └─ Surface  (clear + stroke_line)                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## RULES
//!
//! - The ambient population never changes after construction
//! - Streaks are recycled in place, never reallocated
//! - Resize touches bounds only

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod field;
pub mod renderer;
pub mod spawn;
pub mod streak;

pub use field::{FieldStats, FrameReport, ParticleField};
pub use renderer::FieldRenderer;
pub use spawn::SpawnGate;
pub use streak::{Advance, Particle, Streak, StreakKind};
