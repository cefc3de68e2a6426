//! Level 5: Viewport & Tick Source Tests
//!
//! Tests zoom/pan/recenter through the engine, minimap geometry, and the
//! Slint timer tick source.

mod common;

use common::harness::{init_testing_backend, EngineHarness};
use slint::Model;
use slint_island_layout::{
    viewport::{MAX_ZOOM, MIN_ZOOM},
    EngineConfig, FrameTimer, Island, LayoutEngine, Point, TickSource,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn near(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
}

// ============================================================================
// Zoom & pan
// ============================================================================

#[test]
fn test_initial_zoom_from_config() {
    let config = EngineConfig {
        zoom_level: 9.0,
        ..EngineConfig::default()
    };
    let harness = EngineHarness::with_islands(config, vec![], vec![]);
    assert_eq!(harness.engine.viewport().zoom, MAX_ZOOM);
}

#[test]
fn test_zoom_buttons_clamp() {
    let harness = EngineHarness::new();
    for _ in 0..30 {
        harness.engine.zoom_out();
    }
    assert_eq!(harness.engine.viewport().zoom, MIN_ZOOM);
    assert_eq!(harness.engine.stats().zoom_percent, 20);
}

#[test]
fn test_zoom_rescales_bound_rows() {
    let harness = EngineHarness::new();
    harness.engine.set_zoom(2.0);
    let row = harness.rows.row_data(0).unwrap();
    assert_eq!(row.id, "X");
    assert_eq!((row.x, row.width), (200.0, 300.0));
}

#[test]
fn test_wheel_zoom_keeps_cursor_anchor() {
    let harness = EngineHarness::new();
    let zoom = harness.engine.zoom_at_callback();
    let before = harness.engine.screen_to_world(320.0, 240.0);
    zoom(320.0, 240.0, 1.25);
    let after = harness.engine.screen_to_world(320.0, 240.0);
    assert!(near(before, after));
    assert_eq!(harness.engine.viewport().zoom, 1.25);
}

#[test]
fn test_transforms_round_trip() {
    let harness = EngineHarness::new();
    harness.engine.set_zoom(0.75);
    harness.engine.pan_by(33.0, -14.0);
    let screen = harness.engine.world_to_screen(480.0, 120.0);
    let world = harness.engine.screen_to_world(screen.x, screen.y);
    assert!(near(world, Point::new(480.0, 120.0)));
}

#[test]
fn test_pan_shifts_hit_testing() {
    let harness = EngineHarness::new();
    assert_eq!(harness.engine.island_at_screen(120.0, 120.0), Some("X".to_string()));
    harness.engine.pan_by(500.0, 0.0);
    assert_eq!(harness.engine.island_at_screen(120.0, 120.0), None);
    assert_eq!(harness.engine.island_at_screen(620.0, 120.0), Some("X".to_string()));
}

// ============================================================================
// Recenter & fit
// ============================================================================

#[test]
fn test_recenter_maps_bbox_center_to_container_center() {
    let harness = EngineHarness::new();
    harness.engine.set_zoom(0.5);
    harness.engine.recenter();
    // Bounding box (100,100)..(550,300)
    let center = harness.engine.world_to_screen(325.0, 200.0);
    assert!(near(center, Point::new(400.0, 300.0)));
    assert_eq!(harness.engine.viewport().zoom, 0.5);
}

#[test]
fn test_recenter_follows_container_resize() {
    let harness = EngineHarness::new();
    harness.engine.set_container_size(1200.0, 900.0);
    harness.engine.recenter();
    let center = harness.engine.world_to_screen(325.0, 200.0);
    assert!(near(center, Point::new(600.0, 450.0)));
    assert_eq!(harness.engine.config().container_width, 1200.0);
}

#[test]
fn test_fit_to_view_shows_everything() {
    let harness = EngineHarness::with_islands(
        EngineConfig::default(),
        vec![
            Island::new("a", 0.0, 0.0, 100.0, 100.0),
            Island::new("b", 1500.0, 1100.0, 100.0, 100.0),
        ],
        vec![],
    );
    harness.engine.fit_to_view(20.0);
    for island in harness.engine.island_views() {
        assert!(island.rect.x >= 19.9 && island.rect.right() <= 780.1);
        assert!(island.rect.y >= 19.9 && island.rect.bottom() <= 580.1);
    }
}

// ============================================================================
// Minimap
// ============================================================================

#[test]
fn test_minimap_geometry() {
    let harness = EngineHarness::new();
    harness.engine.set_zoom(2.0);
    harness.engine.pan_by(-300.0, -100.0);

    let minimap = harness.engine.minimap();
    assert_eq!(minimap.islands.len(), 2);
    assert!((minimap.islands[0].x - 10.0).abs() < 1e-4);
    assert!((minimap.islands[0].width - 15.0).abs() < 1e-4);
    assert!((minimap.indicator.x - 15.0).abs() < 1e-4);
    assert!((minimap.indicator.y - 5.0).abs() < 1e-4);
    assert!((minimap.indicator.width - 40.0).abs() < 1e-4);
    assert!((minimap.indicator.height - 30.0).abs() < 1e-4);
}

#[test]
fn test_minimap_click_navigates() {
    let harness = EngineHarness::new();
    harness.engine.center_on_minimap_point(47.5, 25.0);
    let center = harness.engine.world_to_screen(475.0, 250.0);
    assert!((center.x - 400.0).abs() < 1e-2 && (center.y - 300.0).abs() < 1e-2);
    assert_eq!(harness.engine.island_at_screen(400.0, 300.0), Some("Y".to_string()));
}

// ============================================================================
// Tick sources
// ============================================================================

#[test]
fn test_frame_timer_start_stop() {
    init_testing_backend();
    let mut timer = FrameTimer::new();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    timer.start(Duration::from_millis(16), Box::new(move || c.set(c.get() + 1)));
    assert!(timer.is_running());
    timer.stop();
    assert!(!timer.is_running());
    assert_eq!(count.get(), 0);
}

#[test]
fn test_engine_with_frame_timer_ticks_while_physics_on() {
    init_testing_backend();
    let mut config = EngineConfig::default();
    config.layout.enable_physics = true;
    let engine = LayoutEngine::with_frame_timer(config);
    assert!(engine.is_ticking());

    engine.set_physics_enabled(false);
    assert!(!engine.is_ticking());

    engine.set_physics_enabled(true);
    engine.shutdown();
    assert!(!engine.is_ticking());
}
