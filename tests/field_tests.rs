//! Integration tests for the particle field.
//!
//! These drive a [`ParticleField`] through its public API the way a host
//! does: initialize, fire the scheduler, run frames, resize and stop.

#![cfg(not(target_arch = "wasm32"))]

use particle_field::connections::{draw_connections, for_each_connection};
use particle_field::prelude::*;
use particle_field::{connection_opacity, ConnectionStyle, DrawCommand, FieldError};
use proptest::prelude::*;

fn recording_field(config: FieldConfig) -> (ParticleField<RecordingSurface>, ManualScheduler) {
    let field = ParticleField::new(RecordingSurface::new(800, 600), config.with_seed(7)).unwrap();
    (field, ManualScheduler::new())
}

fn run_frames<S: Surface>(field: &mut ParticleField<S>, scheduler: &mut ManualScheduler, n: usize) {
    for _ in 0..n {
        assert!(scheduler.fire(), "a frame should always be pending while running");
        field.frame(scheduler);
    }
}

// ============================================================================
// Particle motion
// ============================================================================

proptest! {
    #[test]
    fn prop_update_stays_in_bounds(
        width in 10.0f32..2000.0,
        height in 10.0f32..2000.0,
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
        vx in -5.0f32..5.0,
        vy in -5.0f32..5.0,
    ) {
        let bounds = Bounds::new(width, height);
        let mut p = Particle::new(Vec2::new(fx * width, fy * height), Vec2::new(vx, vy), 2.0);
        for _ in 0..50 {
            p.update(bounds);
            prop_assert!(p.position.x >= 0.0 && p.position.x <= width, "x = {}", p.position.x);
            prop_assert!(p.position.y >= 0.0 && p.position.y <= height, "y = {}", p.position.y);
        }
    }

    #[test]
    fn prop_update_preserves_speed(
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
        vx in -5.0f32..5.0,
        vy in -5.0f32..5.0,
    ) {
        let bounds = Bounds::new(300.0, 200.0);
        let mut p = Particle::new(Vec2::new(fx * 300.0, fy * 200.0), Vec2::new(vx, vy), 1.0);
        for _ in 0..50 {
            p.update(bounds);
            prop_assert_eq!(p.velocity.x.abs(), vx.abs());
            prop_assert_eq!(p.velocity.y.abs(), vy.abs());
        }
    }

    #[test]
    fn prop_velocity_flips_only_at_walls(
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
        vx in -5.0f32..5.0,
        vy in -5.0f32..5.0,
    ) {
        let (width, height) = (300.0f32, 200.0f32);
        let bounds = Bounds::new(width, height);
        let mut p = Particle::new(Vec2::new(fx * width, fy * height), Vec2::new(vx, vy), 1.0);
        for _ in 0..50 {
            let before = p;
            p.update(bounds);

            let next = before.position + before.velocity;
            let leaves_x = !(0.0..=width).contains(&next.x);
            let leaves_y = !(0.0..=height).contains(&next.y);
            let flipped_x = p.velocity.x.signum() != before.velocity.x.signum();
            let flipped_y = p.velocity.y.signum() != before.velocity.y.signum();

            prop_assert_eq!(flipped_x, leaves_x, "x: {:?} -> {:?}", before, p);
            prop_assert_eq!(flipped_y, leaves_y, "y: {:?} -> {:?}", before, p);
        }
    }

    #[test]
    fn prop_opacity_fades_with_distance(
        threshold in 1.0f32..500.0,
        max_opacity in 0.0f32..=1.0,
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let near_op = connection_opacity(near * threshold, threshold, max_opacity);
        let far_op = connection_opacity(far * threshold, threshold, max_opacity);
        match (near_op, far_op) {
            (Some(n), Some(f)) => {
                prop_assert!(n >= f);
                prop_assert!(n <= max_opacity);
                prop_assert!(f >= 0.0);
            }
            (Some(_), None) | (None, None) => {}
            (None, Some(_)) => prop_assert!(false, "nearer pair lost its line"),
        }
    }
}

#[test]
fn test_particle_leaves_wall_after_bounce() {
    let bounds = Bounds::new(100.0, 100.0);
    let mut p = Particle::new(Vec2::new(99.9, 50.0), Vec2::new(0.25, 0.0), 1.0);
    p.update(bounds);
    assert!(p.velocity.x < 0.0);
    let x = p.position.x;
    p.update(bounds);
    assert!(p.position.x < x);
}

// ============================================================================
// Connections
// ============================================================================

#[test]
fn test_opacity_endpoints() {
    assert_eq!(connection_opacity(0.0, 150.0, 0.3), Some(0.3));
    assert_eq!(connection_opacity(150.0, 150.0, 0.3), None);
    assert_eq!(connection_opacity(200.0, 150.0, 0.3), None);
    let half = connection_opacity(75.0, 150.0, 0.3).unwrap();
    assert!((half - 0.15).abs() < 1e-6);
}

#[test]
fn test_three_particles_one_connection() {
    let particles = [
        Particle::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 1.0),
        Particle::new(Vec2::new(10.0, 0.0), Vec2::ZERO, 1.0),
        Particle::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 1.0),
    ];
    let style = ConnectionStyle {
        threshold: 150.0,
        max_opacity: 0.3,
        color: Rgba::from_rgb8(99, 102, 241, 1.0),
        width: 1.0,
    };
    let mut surface = RecordingSurface::new(1200, 1200);

    assert_eq!(draw_connections(&particles, &style, &mut surface), 1);

    let lines: Vec<_> = surface.lines().collect();
    assert_eq!(lines.len(), 1);
    match lines[0] {
        DrawCommand::Line { from, to, color, width } => {
            assert_eq!(*from, Vec2::new(0.0, 0.0));
            assert_eq!(*to, Vec2::new(10.0, 0.0));
            assert!((color.a - (1.0 - 10.0 / 150.0) * 0.3).abs() < 1e-6);
            assert_eq!(*width, 1.0);
        }
        other => panic!("expected a line, got {:?}", other),
    }
}

#[test]
fn test_each_pair_visited_once() {
    let particles: Vec<_> = (0..5)
        .map(|i| Particle::new(Vec2::new(i as f32, 0.0), Vec2::ZERO, 1.0))
        .collect();
    let mut pairs = Vec::new();
    let count = for_each_connection(&particles, 100.0, |i, j, _| pairs.push((i, j)));
    assert_eq!(count, 10);
    assert!(pairs.iter().all(|&(i, j)| i < j));
}

#[test]
fn test_coincident_particles_connect_at_full_opacity() {
    let p = Particle::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 1.0);
    let style = ConnectionStyle {
        threshold: 150.0,
        max_opacity: 0.3,
        color: Rgba::BLACK,
        width: 1.0,
    };
    let mut surface = RecordingSurface::new(10, 10);
    assert_eq!(draw_connections(&[p, p], &style, &mut surface), 1);
    match surface.lines().next() {
        Some(DrawCommand::Line { color, .. }) => assert!((color.a - 0.3).abs() < 1e-6),
        other => panic!("expected a line, got {:?}", other),
    };
}

// ============================================================================
// Animator lifecycle
// ============================================================================

#[test]
fn test_frames_keep_particle_count() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default().with_particle_count(50));
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 100);

    assert_eq!(field.particles().len(), 50);
    assert_eq!(field.frames(), 100);
    assert_eq!(field.surface().circles().count(), 50);
    let bounds = field.bounds();
    assert!(field.particles().iter().all(|p| bounds.contains(p.position)));
}

#[test]
fn test_only_one_frame_pending() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 10);
    assert_eq!(scheduler.requested(), 11);
    assert_eq!(field.pending_frame(), scheduler.pending());
}

#[test]
fn test_resize_keeps_particles() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 5);

    let before = field.particles().to_vec();
    field.on_resize(400, 300);

    assert_eq!(field.particles(), &before[..]);
    assert_eq!(field.bounds(), Bounds::new(400.0, 300.0));
    assert_eq!(field.surface().size(), Bounds::new(400.0, 300.0));
    assert_eq!(field.state(), FieldState::Running);
}

#[test]
fn test_shrink_then_particles_return() {
    let config = FieldConfig::default().with_max_speed(2.0);
    let (mut field, mut scheduler) = recording_field(config);
    field.initialize(&mut scheduler).unwrap();
    field.on_resize(100, 100);

    // Getting all the way back can take hundreds of frames; check direction.
    let outside: Vec<usize> = field
        .particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.position.x > 100.0 && p.velocity.x != 0.0)
        .map(|(i, _)| i)
        .collect();
    let before: Vec<f32> = outside.iter().map(|&i| field.particles()[i].position.x).collect();

    run_frames(&mut field, &mut scheduler, 1);

    for (k, &i) in outside.iter().enumerate() {
        assert!(field.particles()[i].position.x < before[k]);
    }
}

#[test]
fn test_stop_cancels_pending_frame() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 3);

    field.stop(&mut scheduler);
    assert_eq!(field.state(), FieldState::Stopped);
    assert_eq!(scheduler.pending(), None);
    assert_eq!(scheduler.cancelled(), 1);

    let requested = scheduler.requested();
    let frames = field.frames();
    assert_eq!(field.frame(&mut scheduler), FrameStats::default());
    assert_eq!(scheduler.requested(), requested);
    assert_eq!(field.frames(), frames);

    // Idempotent.
    field.stop(&mut scheduler);
    assert_eq!(scheduler.cancelled(), 1);
}

#[test]
fn test_stopped_field_can_restart() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    field.initialize(&mut scheduler).unwrap();
    field.stop(&mut scheduler);
    field.initialize(&mut scheduler).unwrap();

    assert_eq!(field.state(), FieldState::Running);
    assert_eq!(field.particles().len(), 80);
    assert!(scheduler.pending().is_some());
}

#[test]
fn test_reinitialize_reset() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    field.initialize(&mut scheduler).unwrap();
    let first = field.particles().to_vec();
    field.initialize(&mut scheduler).unwrap();

    assert_eq!(field.particles().len(), 80);
    assert_ne!(field.particles(), &first[..]);
    assert_eq!(scheduler.requested(), 2);
    assert_eq!(scheduler.cancelled(), 1);
    assert_eq!(field.pending_frame(), scheduler.pending());
}

#[test]
fn test_reinitialize_accumulate() {
    let config = FieldConfig::default().with_reinitialize(Reinitialize::Accumulate);
    let (mut field, mut scheduler) = recording_field(config);
    field.initialize(&mut scheduler).unwrap();
    let first = field.particles().to_vec();
    field.initialize_with_count(20, &mut scheduler).unwrap();

    assert_eq!(field.config().reinitialize, Reinitialize::Accumulate);
    assert_eq!(field.particles().len(), 100);
    assert_eq!(&field.particles()[..80], &first[..]);
    assert_eq!(scheduler.cancelled(), 1);

    scheduler.fire();
    let stats = field.frame(&mut scheduler);
    assert_eq!(stats.particles, 100);
    assert_eq!(field.surface().circles().count(), 100);
}

#[test]
fn test_same_seed_same_field() {
    let (mut a, mut sa) = recording_field(FieldConfig::default());
    let (mut b, mut sb) = recording_field(FieldConfig::default());
    a.initialize(&mut sa).unwrap();
    b.initialize(&mut sb).unwrap();
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn test_initialize_errors() {
    let (mut field, mut scheduler) = recording_field(FieldConfig::default());
    assert!(matches!(
        field.initialize_with_count(0, &mut scheduler),
        Err(FieldError::EmptyField)
    ));
    assert_eq!(scheduler.pending(), None);

    field.on_resize(0, 0);
    assert!(matches!(
        field.initialize(&mut scheduler),
        Err(FieldError::EmptySurface { .. })
    ));
    assert_eq!(field.state(), FieldState::Uninitialized);
}

// ============================================================================
// Headless rendering
// ============================================================================

#[test]
fn test_raster_run_draws_particles() {
    let config = FieldConfig::default()
        .with_particle_count(20)
        .with_background(Rgba::BLACK)
        .with_seed(3);
    let mut scheduler = ManualScheduler::new();
    let mut field = ParticleField::new(RasterSurface::new(200, 150), config).unwrap();
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 10);

    let surface = field.surface();
    for p in field.particles() {
        let x = (p.position.x as u32).min(199);
        let y = (p.position.y as u32).min(149);
        let [_, _, b, a] = surface.pixel(x, y);
        assert!(b > 0, "particle at {:?} left no trace", p.position);
        assert_eq!(a, 255);
    }
}

#[test]
fn test_raster_snapshot_written() {
    let mut scheduler = ManualScheduler::new();
    let mut field = ParticleField::new(
        RasterSurface::new(64, 48),
        FieldConfig::default().with_particle_count(10).with_seed(1),
    )
    .unwrap();
    field.initialize(&mut scheduler).unwrap();
    run_frames(&mut field, &mut scheduler, 2);
    field.stop(&mut scheduler);

    let path = std::env::temp_dir().join("particle_field_snapshot_test.png");
    field.into_surface().save_png(&path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
    let _ = std::fs::remove_file(&path);
}
