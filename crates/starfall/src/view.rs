//! # Feedback View
//!
//! The particle field and the reveal scheduler under one lifecycle.
//!
//! ```text
//! mount ─▶ frames ─▶ analysis_complete ─▶ reveal ticks ─▶ navigate ─▶ dismiss
//!   │                                                                   ▲
//!   └──────────────────────── dismiss (any time) ───────────────────────┘
//! ```
//!
//! The two subsystems share no state. The view only routes host events and
//! makes sure both release their registrations when it goes away.

use starfall_core::{
    Host, HostEvent, NavigationState, Navigator, StarfallConfig, StarfallResult, Surface,
};
use starfall_field::{FieldRenderer, ParticleField};
use starfall_reveal::{RevealEvent, RevealScheduler, TriggerOutcome};

/// Lifecycle of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Constructed, nothing registered.
    Created,
    /// Frame loop running.
    Mounted,
    /// Everything released.
    Dismissed,
}

/// Particle field plus reveal sequence, driven by one host.
#[derive(Debug)]
pub struct FeedbackView<S: Surface, N: Navigator> {
    renderer: FieldRenderer<S>,
    reveal: RevealScheduler,
    navigator: N,
    state: ViewState,
}

impl<S: Surface, N: Navigator> FeedbackView<S, N> {
    /// Builds a view from validated configuration. The field starts sized
    /// to `config.host.viewport` and is spread over the host's real viewport
    /// when mounted.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in `config`.
    pub fn new(
        config: &StarfallConfig,
        surface: S,
        navigator: N,
    ) -> StarfallResult<Self> {
        config.validate()?;
        let field = ParticleField::new(config.field.clone(), config.host.viewport);
        Ok(Self {
            renderer: FieldRenderer::new(field, surface),
            reveal: RevealScheduler::new(config.reveal.clone())?,
            navigator,
            state: ViewState::Created,
        })
    }

    /// Starts the frame loop.
    pub fn mount<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.state != ViewState::Created {
            tracing::warn!("Feedback view mount ignored in state {:?}", self.state);
            return;
        }
        self.renderer.mount(host);
        self.state = ViewState::Mounted;
    }

    /// Starts the reveal sequence, carrying `state` to the result view.
    ///
    /// Ignored once the view is dismissed.
    ///
    /// # Errors
    ///
    /// Returns the layout error if the reveal cannot be laid out at the
    /// current viewport.
    pub fn analysis_complete<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        state: Option<NavigationState>,
    ) -> StarfallResult<TriggerOutcome> {
        if self.state != ViewState::Mounted {
            tracing::debug!("Analysis result arrived after dismissal; dropped");
            return Ok(TriggerOutcome::Ignored);
        }
        self.reveal.set_navigation_state(state);
        self.reveal.trigger(host)
    }

    /// Routes a host event to whichever subsystem owns it.
    ///
    /// Navigation tears the view down: the result view replaces this one.
    pub fn dispatch<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &HostEvent,
    ) -> Option<RevealEvent> {
        if self.state != ViewState::Mounted {
            return None;
        }
        if self.renderer.handle_event(host, event) {
            return None;
        }
        let outcome = self.reveal.handle_event(host, &mut self.navigator, event);
        if matches!(outcome, Some(RevealEvent::Navigated { .. })) {
            self.dismiss(host);
        }
        outcome
    }

    /// Cancels the frame loop, any reveal timer and the resize listener.
    /// Safe to call repeatedly, including after navigation.
    pub fn dismiss<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.state == ViewState::Dismissed {
            return;
        }
        self.renderer.unmount(host);
        self.reveal.cancel(host);
        self.state = ViewState::Dismissed;
        tracing::info!("Feedback view dismissed");
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ViewState {
        self.state
    }

    /// The field renderer.
    #[must_use]
    pub const fn renderer(&self) -> &FieldRenderer<S> {
        &self.renderer
    }

    /// The reveal scheduler.
    #[must_use]
    pub const fn reveal(&self) -> &RevealScheduler {
        &self.reveal
    }

    /// The navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }
}
