//! # Simulated Host
//!
//! Deterministic implementation of [`Host`] on a virtual clock.
//!
//! ## Timing Model
//!
//! - Frames fire on fixed boundaries (multiples of the frame period). A
//!   frame requested at time `t` fires at the first boundary after `t`.
//! - Intervals fire every period from registration until cleared.
//! - Timeouts fire once.
//! - Resize notifications are delivered before anything scheduled.
//!
//! Events with the same due time fire in registration order. Time only
//! moves forward inside [`SimulatedHost::poll_until`].
//!
//! Every registration is tracked, so a test can end with
//! [`SimulatedHost::assert_quiescent`] and fail on anything its owner
//! forgot to cancel.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{StarfallError, StarfallResult};
use crate::geometry::Viewport;
use crate::host::{FrameRequestId, Host, HostEvent, ListenerId, TimerId};

/// Shortest interval the host will schedule.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Frame,
    Interval(Duration),
    Timeout,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    handle: u64,
    due: Duration,
    seq: u64,
    kind: Kind,
}

/// Registrations currently held by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outstanding {
    /// Pending frame requests.
    pub frames: usize,
    /// Active repeating timers.
    pub intervals: usize,
    /// Pending one-shot timers.
    pub timeouts: usize,
    /// Registered resize listeners.
    pub listeners: usize,
}

impl Outstanding {
    /// Returns true if nothing is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.frames == 0 && self.intervals == 0 && self.timeouts == 0 && self.listeners == 0
    }
}

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Frame callbacks delivered.
    pub frames_delivered: u64,
    /// Timer firings delivered (each interval tick counts).
    pub timers_fired: u64,
    /// Resize notifications delivered.
    pub resizes_delivered: u64,
}

/// Virtual-clock host.
#[derive(Debug)]
pub struct SimulatedHost {
    now: Duration,
    frame_period: Duration,
    viewport: Viewport,
    next_handle: u64,
    next_seq: u64,
    scheduled: Vec<Scheduled>,
    listeners: Vec<ListenerId>,
    pending_resizes: VecDeque<HostEvent>,
    stats: HostStats,
}

impl SimulatedHost {
    /// Creates a host at time zero.
    #[must_use]
    pub fn new(viewport: Viewport, frame_period: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_period: frame_period.max(MIN_INTERVAL),
            viewport,
            next_handle: 1,
            next_seq: 0,
            scheduled: Vec::with_capacity(8),
            listeners: Vec::with_capacity(2),
            pending_resizes: VecDeque::new(),
            stats: HostStats::default(),
        }
    }

    /// Creates a 60Hz host (16ms frames).
    #[must_use]
    pub fn sixty_hz(viewport: Viewport) -> Self {
        Self::new(viewport, Duration::from_millis(16))
    }

    /// The frame period.
    #[must_use]
    pub const fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Delivery counters.
    #[must_use]
    pub const fn stats(&self) -> HostStats {
        self.stats
    }

    /// Changes the viewport and queues a notification for every listener.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for &listener in &self.listeners {
            self.pending_resizes
                .push_back(HostEvent::Resize { listener, viewport });
        }
    }

    /// Returns the next event due at or before `deadline`.
    ///
    /// When nothing is due the clock moves to `deadline` and `None` is
    /// returned.
    pub fn poll_until(&mut self, deadline: Duration) -> Option<HostEvent> {
        if let Some(event) = self.pending_resizes.pop_front() {
            self.stats.resizes_delivered += 1;
            return Some(event);
        }

        let next = self
            .scheduled
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= deadline)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i);

        let Some(index) = next else {
            self.now = self.now.max(deadline);
            return None;
        };

        let entry = self.scheduled[index];
        self.now = self.now.max(entry.due);

        match entry.kind {
            Kind::Frame => {
                self.scheduled.swap_remove(index);
                self.stats.frames_delivered += 1;
                Some(HostEvent::Frame {
                    id: FrameRequestId(entry.handle),
                    now: self.now,
                })
            }
            Kind::Timeout => {
                self.scheduled.swap_remove(index);
                self.stats.timers_fired += 1;
                Some(HostEvent::Timer {
                    id: TimerId(entry.handle),
                    now: self.now,
                })
            }
            Kind::Interval(period) => {
                let seq = self.bump_seq();
                let slot = &mut self.scheduled[index];
                slot.due += period;
                slot.seq = seq;
                self.stats.timers_fired += 1;
                Some(HostEvent::Timer {
                    id: TimerId(entry.handle),
                    now: self.now,
                })
            }
        }
    }

    /// Runs the host for `duration`, handing every due event to `dispatch`.
    ///
    /// The dispatcher receives the host so it can register or cancel
    /// callbacks; anything it schedules inside the window also fires.
    pub fn run_for<F>(&mut self, duration: Duration, mut dispatch: F)
    where
        F: FnMut(&mut Self, HostEvent),
    {
        let deadline = self.now + duration;
        while let Some(event) = self.poll_until(deadline) {
            dispatch(self, event);
        }
    }

    /// Counts live registrations.
    #[must_use]
    pub fn outstanding(&self) -> Outstanding {
        let mut out = Outstanding {
            listeners: self.listeners.len(),
            ..Outstanding::default()
        };
        for s in &self.scheduled {
            match s.kind {
                Kind::Frame => out.frames += 1,
                Kind::Interval(_) => out.intervals += 1,
                Kind::Timeout => out.timeouts += 1,
            }
        }
        out
    }

    /// Fails if any frame request, timer or listener is still registered.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::ResourceLeak`] with the outstanding counts.
    pub fn assert_quiescent(&self) -> StarfallResult<()> {
        let out = self.outstanding();
        if out.is_empty() {
            Ok(())
        } else {
            tracing::warn!("Host still holds registrations: {:?}", out);
            Err(StarfallError::ResourceLeak {
                frames: out.frames,
                intervals: out.intervals,
                timeouts: out.timeouts,
                listeners: out.listeners,
            })
        }
    }

    /// Returns true if the frame request has not fired or been cancelled.
    #[must_use]
    pub fn is_frame_pending(&self, id: FrameRequestId) -> bool {
        self.scheduled
            .iter()
            .any(|s| s.handle == id.0 && s.kind == Kind::Frame)
    }

    /// Returns true if the timer is still scheduled.
    #[must_use]
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.scheduled
            .iter()
            .any(|s| s.handle == id.0 && s.kind != Kind::Frame)
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn schedule(&mut self, due: Duration, kind: Kind) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.scheduled.push(Scheduled {
            handle,
            due,
            seq,
            kind,
        });
        handle
    }

    fn next_frame_boundary(&self) -> Duration {
        let period = self.frame_period.as_nanos();
        let next = (self.now.as_nanos() / period + 1) * period;
        Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX))
    }

    fn unschedule(&mut self, handle: u64, matches: impl Fn(Kind) -> bool) -> bool {
        let before = self.scheduled.len();
        self.scheduled
            .retain(|s| !(s.handle == handle && matches(s.kind)));
        before != self.scheduled.len()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::sixty_hz(Viewport::default())
    }
}

impl Host for SimulatedHost {
    fn now(&self) -> Duration {
        self.now
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn request_frame(&mut self) -> FrameRequestId {
        let due = self.next_frame_boundary();
        FrameRequestId(self.schedule(due, Kind::Frame))
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if !self.unschedule(id.0, |k| k == Kind::Frame) {
            tracing::trace!("cancel_frame: {} was not pending", id);
        }
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        let due = self.now + period;
        TimerId(self.schedule(due, Kind::Interval(period)))
    }

    fn clear_interval(&mut self, id: TimerId) {
        if !self.unschedule(id.0, |k| matches!(k, Kind::Interval(_))) {
            tracing::trace!("clear_interval: {} was not active", id);
        }
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let due = self.now + delay;
        TimerId(self.schedule(due, Kind::Timeout))
    }

    fn clear_timeout(&mut self, id: TimerId) {
        if !self.unschedule(id.0, |k| k == Kind::Timeout) {
            tracing::trace!("clear_timeout: {} was not pending", id);
        }
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_handle);
        self.next_handle += 1;
        self.listeners.push(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|&l| l != id);
        self.pending_resizes
            .retain(|e| !matches!(e, HostEvent::Resize { listener, .. } if *listener == id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_frame_fires_on_next_boundary() {
        let mut host = SimulatedHost::sixty_hz(Viewport::new(100, 100));
        let id = host.request_frame();

        assert_eq!(host.poll_until(ms(15)), None);
        assert_eq!(host.now(), ms(15));
        assert_eq!(
            host.poll_until(ms(100)),
            Some(HostEvent::Frame { id, now: ms(16) })
        );
        // Fired once, gone.
        assert_eq!(host.poll_until(ms(100)), None);
        assert!(host.assert_quiescent().is_ok());
    }

    #[test]
    fn test_interval_repeats_until_cleared() {
        let mut host = SimulatedHost::sixty_hz(Viewport::new(100, 100));
        let timer = host.set_interval(ms(80));

        let mut fired = Vec::new();
        host.run_for(ms(250), |_, event| {
            if let HostEvent::Timer { now, .. } = event {
                fired.push(now);
            }
        });
        assert_eq!(fired, vec![ms(80), ms(160), ms(240)]);

        host.clear_interval(timer);
        assert!(!host.is_timer_active(timer));
        assert!(host.assert_quiescent().is_ok());
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut host = SimulatedHost::default();
        let timer = host.set_timeout(ms(800));
        let mut count = 0;
        host.run_for(ms(2000), |_, event| {
            assert_eq!(event, HostEvent::Timer { id: timer, now: ms(800) });
            count += 1;
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_same_due_time_fires_in_registration_order() {
        let mut host = SimulatedHost::default();
        let a = host.set_timeout(ms(32));
        let b = host.request_frame();
        let _ = host.poll_until(ms(16));
        let c = host.request_frame();

        let mut order = Vec::new();
        host.run_for(ms(40), |_, event| order.push(event));
        assert_eq!(
            order,
            vec![
                HostEvent::Timer { id: a, now: ms(32) },
                HostEvent::Frame { id: c, now: ms(32) },
            ]
        );
        assert!(!host.is_frame_pending(b));
    }

    #[test]
    fn test_resize_notifies_listeners_first() {
        let mut host = SimulatedHost::default();
        let listener = host.add_resize_listener();
        let _frame = host.request_frame();

        host.resize(Viewport::new(640, 480));
        assert_eq!(host.viewport(), Viewport::new(640, 480));
        assert_eq!(
            host.poll_until(ms(100)),
            Some(HostEvent::Resize {
                listener,
                viewport: Viewport::new(640, 480)
            })
        );
    }

    #[test]
    fn test_removed_listener_gets_nothing() {
        let mut host = SimulatedHost::default();
        let listener = host.add_resize_listener();
        host.resize(Viewport::new(10, 10));
        host.remove_resize_listener(listener);
        assert_eq!(host.poll_until(ms(0)), None);
    }

    #[test]
    fn test_leak_report() {
        let mut host = SimulatedHost::default();
        let _ = host.request_frame();
        let _ = host.set_interval(ms(80));
        let _ = host.add_resize_listener();

        assert_eq!(
            host.assert_quiescent(),
            Err(StarfallError::ResourceLeak {
                frames: 1,
                intervals: 1,
                timeouts: 0,
                listeners: 1,
            })
        );
    }

    #[test]
    fn test_mismatched_cancel_is_noop() {
        let mut host = SimulatedHost::default();
        let timer = host.set_interval(ms(10));
        host.clear_timeout(timer);
        assert!(host.is_timer_active(timer));
        host.clear_interval(timer);
        host.clear_interval(timer);
        assert!(!host.is_timer_active(timer));
    }
}
