//! # Starfall Reveal
//!
//! Sequenced reveal scheduler: lays out a fixed row of elements across the
//! viewport, reveals them one at a time on a fixed cadence, then navigates
//! to the successor view after a settle delay.
//!
//! ```text
//! IDLE ──trigger──▶ RUNNING ──last tick──▶ SETTLING ──settle delay──▶ COMPLETE
//!                    │  ▲                                                │
//!                    └──┘ tick: reveal next slot           trigger ◀─────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod layout;
pub mod scheduler;

pub use layout::{RevealLayout, RevealSlot};
pub use scheduler::{RevealEvent, RevealPhase, RevealScheduler, TriggerOutcome};
