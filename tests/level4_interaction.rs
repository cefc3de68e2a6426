//! Level 4: Pointer Interaction Tests
//!
//! Tests selection, dragging, resizing and connection mode through the
//! engine, including the callbacks the host sees.

mod common;

use common::harness::EngineHarness;
use slint::Model;
use slint_island_layout::{
    EngineConfig, InteractionState, Island, PointerTarget, Point, Size, MIN_ISLAND_SIZE,
};

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_press_selects_island() {
    let harness = EngineHarness::new();
    harness.press_world(150.0, 150.0);

    assert_eq!(*harness.tracker.island_selected.borrow(), vec!["X".to_string()]);
    assert_eq!(harness.engine.selected(), Some("X".to_string()));
}

#[test]
fn test_selection_brings_island_to_front() {
    let harness = EngineHarness::new();
    harness.click_world(150.0, 150.0);

    let last = harness.rows.row_count() - 1;
    assert_eq!(harness.rows.row_data(last).unwrap().id, "X");
}

#[test]
fn test_press_on_background_fires_nothing() {
    let harness = EngineHarness::new();
    harness.click_world(5.0, 5.0);
    assert_eq!(harness.tracker.total(), 0);
}

// ============================================================================
// Dragging
// ============================================================================

#[test]
fn test_drag_fires_single_move_with_final_position() {
    let harness = EngineHarness::new();
    let start = harness.screen(120.0, 120.0);
    harness.drag_screen(
        start,
        &[
            Point::new(start.x + 10.0, start.y),
            Point::new(start.x + 40.0, start.y + 30.0),
        ],
    );

    let moved = harness.tracker.island_moved.borrow().clone();
    assert_eq!(moved, vec![("X".to_string(), 140.0, 130.0)]);
    assert_eq!(harness.position("X"), Point::new(140.0, 130.0));
    assert_eq!(harness.engine.interaction_state(), InteractionState::Idle);
}

#[test]
fn test_drag_exactness_under_zoom_and_pan() {
    let harness = EngineHarness::new();
    harness.engine.set_zoom(1.5);
    harness.engine.pan_by(-37.0, 12.5);

    let press = harness.screen(110.0, 130.0);
    let offset_at_start = press - Point::new(100.0, 100.0) * 1.5;
    let end = Point::new(press.x + 123.0, press.y - 45.0);
    harness.drag_screen(press, &[Point::new(press.x + 60.0, press.y), end]);

    let expected = (end - offset_at_start) / 1.5;
    assert_eq!(harness.position("X"), expected);
    let moved = harness.tracker.island_moved.borrow();
    assert_eq!(moved.len(), 1);
    assert_eq!((moved[0].1, moved[0].2), (expected.x, expected.y));
}

#[test]
fn test_drag_updates_bound_rows_immediately() {
    let harness = EngineHarness::new();
    let start = harness.screen(120.0, 120.0);
    harness.engine.pointer_down(start.x, start.y);
    harness.engine.pointer_move(start.x + 50.0, start.y);

    let row = (0..harness.rows.row_count())
        .filter_map(|i| harness.rows.row_data(i))
        .find(|r| r.id == "X")
        .unwrap();
    assert_eq!(row.x, 150.0);
    // No move callback until release
    assert!(harness.tracker.island_moved.borrow().is_empty());
}

#[test]
fn test_dragged_island_ignores_physics() {
    let mut config = EngineConfig::default();
    config.layout.enable_physics = true;
    let harness = EngineHarness::with_islands(
        config,
        vec![
            Island::new("X", 300.0, 300.0, 100.0, 100.0),
            Island::new("Y", 340.0, 300.0, 100.0, 100.0),
        ],
        vec![],
    );
    let start = harness.screen(310.0, 310.0);
    harness.engine.pointer_down(start.x, start.y);
    harness.engine.pointer_move(start.x + 100.0, start.y + 100.0);

    harness.tick_n(20);
    assert_eq!(harness.position("X"), Point::new(400.0, 400.0));
    assert_ne!(harness.position("Y"), Point::new(340.0, 300.0));

    harness.engine.pointer_up();
    harness.tick_n(1);
    assert_ne!(harness.position("X"), Point::new(400.0, 400.0));
}

#[test]
fn test_non_draggable_island_stays_put() {
    let harness = EngineHarness::with_islands(
        EngineConfig::default(),
        vec![Island::new("X", 100.0, 100.0, 100.0, 100.0).with_draggable(false)],
        vec![],
    );
    let start = harness.screen(120.0, 120.0);
    harness.drag_screen(start, &[Point::new(start.x + 50.0, start.y + 50.0)]);

    assert_eq!(harness.position("X"), Point::new(100.0, 100.0));
    assert_eq!(harness.tracker.island_selected.borrow().len(), 1);
    assert!(harness.tracker.island_moved.borrow().is_empty());
}

#[test]
fn test_cancel_drag_restores_and_stays_silent() {
    let harness = EngineHarness::new();
    let start = harness.screen(120.0, 120.0);
    harness.engine.pointer_down(start.x, start.y);
    harness.engine.pointer_move(start.x + 80.0, start.y + 80.0);
    harness.engine.cancel_interaction();
    harness.engine.pointer_up();

    assert_eq!(harness.position("X"), Point::new(100.0, 100.0));
    assert!(harness.tracker.island_moved.borrow().is_empty());
}

#[test]
fn test_host_reported_press() {
    let harness = EngineHarness::new();
    harness
        .engine
        .pointer_down_on("Y", 410.0, 210.0, PointerTarget::Body);
    harness.engine.pointer_move(430.0, 210.0);
    harness.engine.pointer_up();
    assert_eq!(harness.position("Y"), Point::new(420.0, 200.0));
}

// ============================================================================
// Resizing
// ============================================================================

#[test]
fn test_resize_from_corner_grip() {
    let harness = EngineHarness::new();
    // X spans (100,100)..(250,200); grip is the last 12 screen pixels
    let grip = harness.screen(245.0, 195.0);
    harness.drag_screen(grip, &[Point::new(grip.x + 30.0, grip.y + 20.0)]);

    let resized = harness.tracker.island_resized.borrow().clone();
    assert_eq!(resized, vec![("X".to_string(), 180.0, 120.0)]);
    let island = harness.engine.island("X").unwrap();
    assert_eq!(island.size, Size::new(180.0, 120.0));
    assert_eq!(island.position, Point::new(100.0, 100.0));
    assert!(harness.tracker.island_moved.borrow().is_empty());
}

#[test]
fn test_resize_clamps_to_minimum() {
    let harness = EngineHarness::new();
    let grip = harness.screen(245.0, 195.0);
    harness.drag_screen(grip, &[Point::new(grip.x - 500.0, grip.y - 500.0)]);
    assert_eq!(harness.engine.island("X").unwrap().size, MIN_ISLAND_SIZE);
}

#[test]
fn test_resize_disabled_engine_wide() {
    let harness = EngineHarness::new();
    harness.engine.set_enable_resizing(false);
    let grip = harness.screen(245.0, 195.0);
    harness.drag_screen(grip, &[Point::new(grip.x + 30.0, grip.y + 20.0)]);

    assert!(harness.tracker.island_resized.borrow().is_empty());
    assert_eq!(harness.position("X"), Point::new(130.0, 120.0));
}

// ============================================================================
// Connection mode
// ============================================================================

#[test]
fn test_connection_mode_scenario() {
    let harness = EngineHarness::new();
    harness.engine.toggle_connection_mode();
    assert!(harness.engine.connection_mode());

    harness.click_world(150.0, 150.0);
    assert_eq!(
        harness.engine.interaction_state(),
        InteractionState::ConnectionPending {
            source_id: "X".into()
        }
    );
    harness.click_world(450.0, 250.0);

    assert_eq!(
        *harness.tracker.connection_created.borrow(),
        vec![("X".to_string(), "Y".to_string())]
    );
    assert_eq!(harness.engine.interaction_state(), InteractionState::Idle);
    assert!(!harness.engine.connection_mode());
    // Connection mode intercepts selection
    assert!(harness.tracker.island_selected.borrow().is_empty());
}

#[test]
fn test_connection_mode_does_not_move_islands() {
    let harness = EngineHarness::new();
    harness.engine.set_connection_mode(true);
    let start = harness.screen(150.0, 150.0);
    harness.drag_screen(start, &[Point::new(start.x + 100.0, start.y)]);
    assert_eq!(harness.position("X"), Point::new(100.0, 100.0));
}

#[test]
fn test_connection_mode_toggle_off_clears_pending() {
    let harness = EngineHarness::new();
    harness.engine.set_connection_mode(true);
    harness.click_world(150.0, 150.0);
    harness.engine.toggle_connection_mode();
    harness.engine.toggle_connection_mode();
    harness.click_world(450.0, 250.0);

    assert!(harness.tracker.connection_created.borrow().is_empty());
    assert_eq!(
        harness.engine.interaction_state(),
        InteractionState::ConnectionPending {
            source_id: "Y".into()
        }
    );
}

#[test]
fn test_created_connection_is_host_managed() {
    let harness = EngineHarness::new();
    harness.engine.set_connection_mode(true);
    harness.click_world(450.0, 250.0);
    harness.click_world(150.0, 150.0);

    assert_eq!(harness.engine.connections().len(), 1);
    let (from, to) = harness.tracker.connection_created.borrow()[0].clone();
    let mut connections = harness.engine.connections();
    connections.push(slint_island_layout::Connection::new(from, to));
    harness.engine.set_connections(connections);
    assert_eq!(harness.engine.connection_views().len(), 2);
}
