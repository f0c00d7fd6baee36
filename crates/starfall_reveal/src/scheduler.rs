//! # Reveal State Machine
//!
//! ## States
//!
//! - **IDLE**: Nothing scheduled. A trigger starts a run.
//! - **RUNNING**: One repeating timer; each tick reveals the next slot.
//! - **SETTLING**: Every slot revealed, the interval is gone and a one-shot
//!   timer counts down the settle delay.
//! - **COMPLETE**: Navigation has fired. A new trigger starts a fresh run.
//!
//! At any moment the scheduler holds at most one host timer. Every
//! transition that leaves RUNNING or SETTLING clears the timer it owned.

use std::fmt;
use std::time::Duration;

use starfall_core::{
    Host, HostEvent, NavigationState, Navigator, RetriggerPolicy, RevealConfig, StarfallError,
    StarfallResult, TimerId,
};

use crate::layout::{RevealLayout, RevealSlot};

/// Observable phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// No run in progress.
    Idle,
    /// Revealing slots on the cadence timer.
    Running,
    /// Waiting out the settle delay.
    Settling,
    /// Navigation has fired.
    Complete,
}

impl fmt::Display for RevealPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Settling => "SETTLING",
            Self::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

/// Internal state, carrying the timer each phase owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running { interval: TimerId, next: usize },
    Settling { timeout: TimerId },
    Complete,
}

impl State {
    const fn phase(self) -> RevealPhase {
        match self {
            Self::Idle => RevealPhase::Idle,
            Self::Running { .. } => RevealPhase::Running,
            Self::Settling { .. } => RevealPhase::Settling,
            Self::Complete => RevealPhase::Complete,
        }
    }
}

/// Result of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new run began.
    Started,
    /// A run was already in flight and the trigger was dropped.
    Ignored,
    /// The in-flight run was cancelled and a new one began.
    Restarted,
}

/// Something the scheduler did in response to a host event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealEvent {
    /// A slot became visible.
    Revealed(RevealSlot),
    /// The run finished and navigation fired.
    Navigated {
        /// Host time of the navigation.
        at: Duration,
    },
}

/// Sequenced reveal scheduler.
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    layout: RevealLayout,
    state: State,
    revealed: Vec<usize>,
    carry: Option<NavigationState>,
    last_tick_at: Option<Duration>,
}

impl RevealScheduler {
    /// Creates an idle scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::InvalidConfig`] if `count` is zero or the
    /// cadence is zero.
    pub fn new(config: RevealConfig) -> StarfallResult<Self> {
        if config.count == 0 {
            return Err(StarfallError::InvalidConfig(
                "reveal.count must be at least 1".into(),
            ));
        }
        if config.cadence_ms == 0 {
            return Err(StarfallError::InvalidConfig(
                "reveal.cadence_ms must be positive".into(),
            ));
        }
        Ok(Self {
            revealed: Vec::with_capacity(config.count),
            config,
            layout: RevealLayout::default(),
            state: State::Idle,
            carry: None,
            last_tick_at: None,
        })
    }

    /// State handed to the navigator when the run completes.
    #[must_use]
    pub fn with_navigation_state(mut self, state: NavigationState) -> Self {
        self.carry = Some(state);
        self
    }

    /// Replaces the state handed to the navigator.
    pub fn set_navigation_state(&mut self, state: Option<NavigationState>) {
        self.carry = state;
    }

    /// Starts a run, or applies the re-trigger policy if one is in flight.
    ///
    /// The layout is recomputed from the host's current viewport width.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::InvalidLayout`] if the layout cannot be
    /// computed; the scheduler is left idle.
    pub fn trigger<H: Host + ?Sized>(&mut self, host: &mut H) -> StarfallResult<TriggerOutcome> {
        let in_flight = matches!(self.state, State::Running { .. } | State::Settling { .. });
        let outcome = match (in_flight, self.config.retrigger) {
            (false, _) => TriggerOutcome::Started,
            (true, RetriggerPolicy::Ignore) => {
                tracing::debug!("Reveal trigger ignored while {}", self.phase());
                return Ok(TriggerOutcome::Ignored);
            }
            (true, RetriggerPolicy::Restart) => {
                tracing::info!("Reveal restarted from {}", self.phase());
                self.release(host);
                TriggerOutcome::Restarted
            }
        };

        self.start(host)?;
        Ok(outcome)
    }

    /// Handles a host event. Events for timers this scheduler does not own
    /// are ignored.
    pub fn handle_event<H, N>(
        &mut self,
        host: &mut H,
        navigator: &mut N,
        event: &HostEvent,
    ) -> Option<RevealEvent>
    where
        H: Host + ?Sized,
        N: Navigator + ?Sized,
    {
        let HostEvent::Timer { id, now } = *event else {
            return None;
        };

        match self.state {
            State::Running { interval, next } if interval == id => {
                let Some(slot) = self.layout.slot(next) else {
                    tracing::warn!("Reveal slot {next} missing from layout; stopping");
                    host.clear_interval(interval);
                    self.transition(State::Idle);
                    return None;
                };
                self.revealed.push(next);
                tracing::trace!("Revealed slot {} at {:.1}px", slot.index, slot.offset);

                if next + 1 >= self.layout.len() {
                    host.clear_interval(interval);
                    let timeout = host.set_timeout(self.config.settle_delay());
                    self.last_tick_at = Some(now);
                    self.transition(State::Settling { timeout });
                } else {
                    self.state = State::Running {
                        interval,
                        next: next + 1,
                    };
                }
                Some(RevealEvent::Revealed(slot))
            }
            State::Settling { timeout } if timeout == id => {
                self.transition(State::Complete);
                navigator.navigate(&self.config.destination, self.carry.clone());
                tracing::info!(
                    "Reveal complete; navigated to {} at {:?}",
                    self.config.destination,
                    now
                );
                Some(RevealEvent::Navigated { at: now })
            }
            _ => None,
        }
    }

    /// Cancels any in-flight run. Returns true if a timer was cleared.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let had_timer = self.release(host);
        if had_timer {
            self.transition(State::Idle);
        }
        had_timer
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RevealPhase {
        self.state.phase()
    }

    /// Revealed slot indices, in reveal order.
    #[must_use]
    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    /// Revealed slots with their offsets.
    pub fn visible_slots(&self) -> impl Iterator<Item = RevealSlot> + '_ {
        self.revealed.iter().filter_map(|&i| self.layout.slot(i))
    }

    /// Layout of the current (or last) run.
    #[must_use]
    pub const fn layout(&self) -> &RevealLayout {
        &self.layout
    }

    /// Host time of the final reveal tick of the current run.
    #[must_use]
    pub const fn last_tick_at(&self) -> Option<Duration> {
        self.last_tick_at
    }

    fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> StarfallResult<()> {
        let layout = RevealLayout::compute(host.viewport().width_f32(), &self.config);
        let layout = match layout {
            Ok(layout) => layout,
            Err(e) => {
                self.transition(State::Idle);
                return Err(e);
            }
        };
        self.layout = layout;
        self.revealed.clear();
        self.last_tick_at = None;
        let interval = host.set_interval(self.config.cadence());
        self.transition(State::Running { interval, next: 0 });
        Ok(())
    }

    /// Clears whichever timer the current state owns.
    fn release<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.state {
            State::Running { interval, .. } => {
                host.clear_interval(interval);
                true
            }
            State::Settling { timeout } => {
                host.clear_timeout(timeout);
                true
            }
            State::Idle | State::Complete => false,
        }
    }

    fn transition(&mut self, next: State) {
        let from = self.state.phase();
        self.state = next;
        if from != next.phase() {
            tracing::info!(
                "Reveal state transition: {} -> {} ({}/{} revealed)",
                from,
                next.phase(),
                self.revealed.len(),
                self.config.count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfall_core::{RecordingNavigator, SimulatedHost, Viewport};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn host() -> SimulatedHost {
        SimulatedHost::sixty_hz(Viewport::new(1000, 800))
    }

    fn small(count: usize) -> RevealConfig {
        RevealConfig {
            count,
            ..RevealConfig::default()
        }
    }

    #[test]
    fn test_rejects_zero_count() {
        assert!(RevealScheduler::new(small(0)).is_err());
    }

    #[test]
    fn test_trigger_starts_one_interval() {
        let mut host = host();
        let mut s = RevealScheduler::new(small(3)).unwrap();
        assert_eq!(s.trigger(&mut host).unwrap(), TriggerOutcome::Started);
        assert_eq!(s.phase(), RevealPhase::Running);
        assert_eq!(host.outstanding().intervals, 1);
        assert_eq!(s.layout().len(), 3);
    }

    #[test]
    fn test_full_run_reveals_then_navigates() {
        let mut host = host();
        let mut nav = RecordingNavigator::new();
        let mut s = RevealScheduler::new(small(3)).unwrap();
        s.trigger(&mut host).unwrap();

        let mut events = Vec::new();
        host.run_for(ms(2_000), |host, event| {
            if let Some(e) = s.handle_event(host, &mut nav, &event) {
                events.push(e);
            }
        });

        assert_eq!(s.revealed(), &[0, 1, 2]);
        assert_eq!(s.phase(), RevealPhase::Complete);
        assert_eq!(s.last_tick_at(), Some(ms(240)));
        assert_eq!(events.last(), Some(&RevealEvent::Navigated { at: ms(1_040) }));
        assert_eq!(nav.visits().len(), 1);
        assert_eq!(nav.visits()[0].route, "/result");
        assert!(host.assert_quiescent().is_ok());
    }

    #[test]
    fn test_missing_slot_releases_interval() {
        let mut host = host();
        let mut nav = RecordingNavigator::new();
        let mut s = RevealScheduler::new(small(3)).unwrap();
        s.trigger(&mut host).unwrap();
        s.layout = RevealLayout::compute(1000.0, &small(1)).unwrap();

        host.run_for(ms(500), |host, event| {
            s.handle_event(host, &mut nav, &event);
        });

        assert_eq!(s.revealed(), &[0]);
        assert_eq!(s.phase(), RevealPhase::Idle);
        assert!(nav.visits().is_empty());
        assert!(host.assert_quiescent().is_ok());
    }

    #[test]
    fn test_ignore_policy_keeps_single_timer() {
        let mut host = host();
        let mut s = RevealScheduler::new(small(5)).unwrap();
        s.trigger(&mut host).unwrap();
        assert_eq!(s.trigger(&mut host).unwrap(), TriggerOutcome::Ignored);
        assert_eq!(host.outstanding().intervals, 1);
    }

    #[test]
    fn test_restart_policy_replaces_timer() {
        let mut host = host();
        let mut nav = RecordingNavigator::new();
        let config = RevealConfig {
            count: 5,
            retrigger: RetriggerPolicy::Restart,
            ..RevealConfig::default()
        };
        let mut s = RevealScheduler::new(config).unwrap();
        s.trigger(&mut host).unwrap();
        host.run_for(ms(170), |host, event| {
            s.handle_event(host, &mut nav, &event);
        });
        assert_eq!(s.revealed(), &[0, 1]);

        assert_eq!(s.trigger(&mut host).unwrap(), TriggerOutcome::Restarted);
        assert!(s.revealed().is_empty());
        assert_eq!(host.outstanding().intervals, 1);
    }

    #[test]
    fn test_cancel_while_settling() {
        let mut host = host();
        let mut nav = RecordingNavigator::new();
        let mut s = RevealScheduler::new(small(2)).unwrap();
        s.trigger(&mut host).unwrap();
        host.run_for(ms(200), |host, event| {
            s.handle_event(host, &mut nav, &event);
        });
        assert_eq!(s.phase(), RevealPhase::Settling);

        assert!(s.cancel(&mut host));
        assert!(!s.cancel(&mut host));
        assert_eq!(s.phase(), RevealPhase::Idle);
        assert!(host.assert_quiescent().is_ok());
        assert!(nav.visits().is_empty());
    }

    #[test]
    fn test_navigation_carries_state() {
        let mut host = host();
        let mut nav = RecordingNavigator::new();
        let mut s = RevealScheduler::new(small(1))
            .unwrap()
            .with_navigation_state(NavigationState::new().with("imageUrl", "/img/42.png"));
        s.trigger(&mut host).unwrap();
        host.run_for(ms(1_000), |host, event| {
            s.handle_event(host, &mut nav, &event);
        });

        let carried = nav.visits()[0].state.as_ref().and_then(|st| st.get("imageUrl"));
        assert_eq!(carried, Some("/img/42.png"));
    }
}
