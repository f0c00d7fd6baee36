//! Host-driven frame loop for the particle field.
//!
//! The renderer owns the field and its surface and holds the two host
//! registrations it needs: the pending frame request and the resize
//! listener. Each delivered frame re-requests the next one, so the loop is
//! stopped by cancelling a single stored handle.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use starfall_core::{FrameRequestId, Host, HostEvent, ListenerId, Surface, Viewport};

use crate::field::ParticleField;

/// Particle field bound to a surface and a host.
#[derive(Debug)]
pub struct FieldRenderer<S: Surface, R: Rng = ChaCha8Rng> {
    field: ParticleField<R>,
    surface: S,
    frame: Option<FrameRequestId>,
    listener: Option<ListenerId>,
}

impl<S: Surface, R: Rng> FieldRenderer<S, R> {
    /// Wraps a field and the surface it draws on. Nothing is registered
    /// until [`FieldRenderer::mount`].
    pub const fn new(field: ParticleField<R>, surface: S) -> Self {
        Self {
            field,
            surface,
            frame: None,
            listener: None,
        }
    }

    /// Sizes the surface to the viewport, subscribes to resizes and starts
    /// the frame loop. A field built for other bounds that has not run yet
    /// is repopulated across the host viewport. Mounting twice is a no-op.
    pub fn mount<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.is_mounted() {
            tracing::warn!("Field renderer already mounted");
            return;
        }
        let viewport = host.viewport();
        if self.field.stats().frames == 0 && self.field.bounds() != viewport {
            self.field.repopulate(viewport);
        }
        self.apply_viewport(viewport);
        self.listener = Some(host.add_resize_listener());
        self.frame = Some(host.request_frame());
        tracing::info!(
            "Field renderer mounted at {}x{} ({} streaks)",
            viewport.width,
            viewport.height,
            self.field.population()
        );
    }

    /// Handles a host event. Returns true if the event belonged to this
    /// renderer.
    pub fn handle_event<H: Host + ?Sized>(&mut self, host: &mut H, event: &HostEvent) -> bool {
        match *event {
            HostEvent::Frame { id, now } if self.frame == Some(id) => {
                self.field.frame(now, &mut self.surface);
                self.frame = Some(host.request_frame());
                true
            }
            HostEvent::Resize { listener, viewport } if self.listener == Some(listener) => {
                self.apply_viewport(viewport);
                true
            }
            _ => false,
        }
    }

    /// Cancels the pending frame and removes the resize listener. Safe to
    /// call more than once.
    pub fn unmount<H: Host + ?Sized>(&mut self, host: &mut H) {
        let frame = self.frame.take();
        let listener = self.listener.take();
        if let Some(id) = frame {
            host.cancel_frame(id);
        }
        if let Some(id) = listener {
            host.remove_resize_listener(id);
        }
        if frame.is_some() || listener.is_some() {
            tracing::info!(
                "Field renderer unmounted after {} frames",
                self.field.stats().frames
            );
        }
    }

    /// Returns true between mount and unmount.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// The simulated field.
    #[must_use]
    pub const fn field(&self) -> &ParticleField<R> {
        &self.field
    }

    /// The drawing surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.surface.resize(viewport.width, viewport.height);
        self.field.resize(viewport);
    }
}
