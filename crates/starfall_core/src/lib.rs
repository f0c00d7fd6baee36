//! # Starfall Core
//!
//! Shared types for the Starfall visual feedback engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      HOST (shell)                        │
//! │  frame clock · interval/timeout timers · viewport size   │
//! └───────────┬──────────────────────────────┬───────────────┘
//!             │ HostEvent::Frame / Resize     │ HostEvent::Timer
//!             ▼                               ▼
//!   ┌───────────────────┐           ┌────────────────────┐
//!   │  Particle Field   │           │  Reveal Scheduler  │
//!   │  (starfall_field) │           │ (starfall_reveal)  │
//!   └─────────┬─────────┘           └─────────┬──────────┘
//!             ▼                               ▼
//!          Surface                        Navigator
//! ```
//!
//! This crate defines the seams ([`Host`], [`Surface`], [`Navigator`]),
//! the configuration schema, and test doubles for all three.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod navigation;
pub mod raster;
pub mod sim_host;
pub mod surface;

pub use color::Color;
pub use config::{
    AmbientConfig, FieldConfig, HighlightConfig, HostConfig, RetriggerPolicy, RevealConfig,
    SpawnPolicy, StarfallConfig, ValueRange,
};
pub use error::{StarfallError, StarfallResult};
pub use geometry::{Point, Rect, Viewport};
pub use host::{FrameRequestId, Host, HostEvent, ListenerId, TimerId};
pub use navigation::{Navigation, NavigationState, Navigator, RecordingNavigator};
pub use raster::RasterSurface;
pub use sim_host::{HostStats, Outstanding, SimulatedHost};
pub use surface::{DrawCommand, RecordingSurface, Surface};
