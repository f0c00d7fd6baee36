//! # Host Interface
//!
//! The rendering/timing service the engine runs on. A browser shell maps
//! these onto `requestAnimationFrame`, `setInterval`, `setTimeout` and
//! `window` resize listeners; the [`SimulatedHost`](crate::SimulatedHost)
//! drives them from a virtual clock.
//!
//! ## Callback Model
//!
//! Registrations return opaque handles. The host never calls back into the
//! engine directly; instead the host loop delivers a [`HostEvent`] carrying
//! the handle, and the owner of that handle reacts. A frame request fires
//! once; re-registering for the next frame is the owner's job, which keeps
//! the "render, then ask for another frame" loop explicit and cancellable.

use std::fmt;
use std::time::Duration;

use crate::geometry::Viewport;

/// Handle of a pending frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// Handle of a repeating or one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Handle of a resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for FrameRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Something the host delivers to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// A requested frame is due.
    Frame {
        /// The request being fulfilled.
        id: FrameRequestId,
        /// Host time at the frame.
        now: Duration,
    },
    /// A timer fired (an interval keeps firing until cleared).
    Timer {
        /// The timer that fired.
        id: TimerId,
        /// Host time at the firing.
        now: Duration,
    },
    /// The viewport changed size.
    Resize {
        /// The listener being notified.
        listener: ListenerId,
        /// New viewport dimensions.
        viewport: Viewport,
    },
}

/// Rendering and timing service.
///
/// Cancelling a handle that already fired or was already cancelled is a
/// no-op.
pub trait Host {
    /// Current host time.
    fn now(&self) -> Duration;

    /// Current viewport dimensions.
    fn viewport(&self) -> Viewport;

    /// Requests a single callback at the next frame.
    fn request_frame(&mut self) -> FrameRequestId;

    /// Cancels a pending frame callback.
    fn cancel_frame(&mut self, id: FrameRequestId);

    /// Starts a timer firing every `period` until cleared.
    fn set_interval(&mut self, period: Duration) -> TimerId;

    /// Stops a repeating timer.
    fn clear_interval(&mut self, id: TimerId);

    /// Starts a timer firing once after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Cancels a one-shot timer that has not fired yet.
    fn clear_timeout(&mut self, id: TimerId);

    /// Subscribes to viewport changes.
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Unsubscribes from viewport changes.
    fn remove_resize_listener(&mut self, id: ListenerId);
}
