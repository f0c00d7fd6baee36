//! # Field Lifecycle Integration Test
//!
//! Drives the renderer through a simulated host: mount, frames, resize,
//! unmount.

use std::time::Duration;

use starfall_core::{
    FieldConfig, Host, HostEvent, RasterSurface, RecordingSurface, SimulatedHost, SpawnPolicy,
    Surface, Viewport,
};
use starfall_field::{FieldRenderer, ParticleField};

fn config(seed: u64) -> FieldConfig {
    FieldConfig {
        seed: Some(seed),
        ..FieldConfig::default()
    }
}

/// Test: a resize changes surface dimensions and bounds, never positions.
#[test]
fn test_resize_follows_viewport_and_keeps_positions() {
    let start = Viewport::new(800, 600);
    let mut host = SimulatedHost::sixty_hz(start);
    let mut renderer = FieldRenderer::new(
        ParticleField::new(config(1), start),
        RasterSurface::new(1, 1),
    );
    renderer.mount(&mut host);
    host.run_for(Duration::from_millis(500), |host, event| {
        renderer.handle_event(host, &event);
    });

    let before = renderer.field().particles().to_vec();
    host.resize(Viewport::new(400, 300));

    // The resize notification is delivered ahead of any frame.
    let now = host.now();
    let event = host.poll_until(now).expect("resize event");
    assert!(matches!(event, HostEvent::Resize { .. }));
    assert!(renderer.handle_event(&mut host, &event));

    assert_eq!(renderer.surface().size(), (400, 300));
    assert_eq!(renderer.field().bounds(), Viewport::new(400, 300));
    assert_eq!(renderer.field().particles(), before.as_slice());

    // Drawing against the smaller surface stays in bounds.
    host.run_for(Duration::from_millis(200), |host, event| {
        renderer.handle_event(host, &event);
    });
    assert_eq!(renderer.surface().pixel(500, 500), None);

    renderer.unmount(&mut host);
    host.assert_quiescent().expect("no leaks");
}

/// Test: recycled streaks always come back above the top edge with
/// attributes inside the configured ranges.
#[test]
fn test_recycled_attributes_stay_in_range() {
    let viewport = Viewport::new(640, 360);
    let mut field = ParticleField::new(config(2), viewport);
    let ambient = field.config().ambient.clone();

    for frame in 0..3_000_u64 {
        let before: Vec<f32> = field.particles().iter().map(|p| p.streak.y).collect();
        field.step(Duration::from_millis(16 * frame));

        for (old_y, p) in before.iter().zip(field.particles()) {
            let s = p.streak;
            if s.y < *old_y {
                assert!(s.y < 0.0, "recycled streak at y={}", s.y);
                assert!(s.x >= 0.0 && s.x < 640.0);
                assert!(ambient.speed.contains(s.speed));
                assert!(ambient.length.contains(s.length));
                assert!(ambient.opacity.contains(s.opacity));
            }
        }
    }
    assert!(field.stats().recycled > 100);
}

/// Test: a high wall-clock rate still never yields two highlights.
#[test]
fn test_wall_clock_policy_single_highlight() {
    let viewport = Viewport::new(800, 600);
    let mut cfg = config(3);
    cfg.highlight.spawn = SpawnPolicy::WallClock { per_second: 50.0 };
    let mut host = SimulatedHost::sixty_hz(viewport);
    let mut renderer =
        FieldRenderer::new(ParticleField::new(cfg, viewport), RecordingSurface::new(1, 1));
    renderer.mount(&mut host);

    let mut max_gold = 0;
    for _ in 0..600 {
        host.run_for(Duration::from_millis(16), |host, event| {
            renderer.handle_event(host, &event);
        });
        let stats = renderer.field().stats();
        max_gold = max_gold.max(stats.highlights_spawned - stats.highlights_retired);
    }

    assert_eq!(max_gold, 1);
    assert!(renderer.field().stats().highlights_retired > 0);
    renderer.unmount(&mut host);
    host.assert_quiescent().expect("no leaks");
}

/// Test: once unmounted, the host delivers nothing more to the renderer.
#[test]
fn test_unmount_stops_frames() {
    let viewport = Viewport::new(800, 600);
    let mut host = SimulatedHost::sixty_hz(viewport);
    let mut renderer = FieldRenderer::new(
        ParticleField::new(config(4), viewport),
        RecordingSurface::new(1, 1),
    );
    renderer.mount(&mut host);
    host.run_for(Duration::from_millis(100), |host, event| {
        renderer.handle_event(host, &event);
    });
    let frames = renderer.field().stats().frames;
    assert!(frames > 0);

    renderer.unmount(&mut host);
    host.assert_quiescent().expect("no leaks");

    let mut delivered = 0;
    host.resize(Viewport::new(100, 100));
    host.run_for(Duration::from_secs(1), |_, _| delivered += 1);
    assert_eq!(delivered, 0);
    assert_eq!(renderer.field().stats().frames, frames);
}

/// Test: after a couple of seconds the raster shows falling streaks.
#[test]
fn test_raster_shows_streaks() {
    let viewport = Viewport::new(320, 240);
    let mut host = SimulatedHost::sixty_hz(viewport);
    let mut renderer = FieldRenderer::new(
        ParticleField::new(config(5), viewport),
        RasterSurface::new(1, 1),
    );
    renderer.mount(&mut host);
    host.run_for(Duration::from_secs(2), |host, event| {
        renderer.handle_event(host, &event);
    });

    assert!(renderer.surface().lit_pixels() > 0);
    renderer.unmount(&mut host);
}
