//! # Starfall
//!
//! Real-time visual feedback engine: a continuously falling particle field
//! with a rare highlight streak, plus a timed reveal sequence that ends in a
//! page transition.
//!
//! ```text
//! ┌──────────────────────────── FeedbackView ────────────────────────────┐
//! │  FieldRenderer ── ParticleField ── Surface                           │
//! │  RevealScheduler ── RevealLayout ── Navigator                        │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │ HostEvent
//!                               Host
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod telemetry;
pub mod view;

pub use view::{FeedbackView, ViewState};
pub use telemetry::init_tracing;
