//! Test harness driving a [`LayoutEngine`] with manual ticks.
//!
//! Every engine callback is recorded in a [`CallbackTracker`], and pointer
//! helpers take world coordinates so tests read in layout terms.

#![allow(dead_code)]

use super::CallbackTracker;
use slint::VecModel;
use slint_island_layout::{
    Connection, EngineConfig, Island, IslandView, LayoutEngine, ManualTicks, Point,
};
use std::rc::Rc;

/// Initialize the testing backend for this thread.
/// Uses thread_local to ensure each thread only initializes once.
pub fn init_testing_backend() {
    use std::cell::Cell;
    thread_local! {
        static INITIALIZED: Cell<bool> = const { Cell::new(false) };
    }

    INITIALIZED.with(|init| {
        if !init.get() {
            i_slint_backend_testing::init_no_event_loop();
            init.set(true);
        }
    });
}

/// A row as a Slint `IslandData` struct would carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandRow {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub struct EngineHarness {
    pub engine: LayoutEngine,
    pub ticks: ManualTicks,
    pub tracker: CallbackTracker,
    pub rows: Rc<VecModel<IslandRow>>,
}

impl EngineHarness {
    /// Two islands joined by one connection, physics off.
    pub fn new() -> Self {
        Self::with_islands(
            EngineConfig::default(),
            vec![
                Island::new("X", 100.0, 100.0, 150.0, 100.0),
                Island::new("Y", 400.0, 200.0, 150.0, 100.0),
            ],
            vec![Connection::new("X", "Y")],
        )
    }

    pub fn with_islands(
        config: EngineConfig,
        islands: Vec<Island>,
        connections: Vec<Connection>,
    ) -> Self {
        let ticks = ManualTicks::new();
        let engine = LayoutEngine::new(config, ticks.clone());
        let tracker = CallbackTracker::new();

        engine.on_island_move({
            let t = tracker.island_moved.clone();
            move |island, x, y| t.borrow_mut().push((island.id.clone(), x, y))
        });
        engine.on_island_resize({
            let t = tracker.island_resized.clone();
            move |island, w, h| t.borrow_mut().push((island.id.clone(), w, h))
        });
        engine.on_island_select({
            let t = tracker.island_selected.clone();
            move |island| t.borrow_mut().push(island.id.clone())
        });
        engine.on_connection_create({
            let t = tracker.connection_created.clone();
            move |from, to| t.borrow_mut().push((from.to_string(), to.to_string()))
        });

        let rows = Rc::new(VecModel::<IslandRow>::default());
        engine.bind_islands_model(rows.clone(), |v: &IslandView| IslandRow {
            id: v.id.to_string(),
            x: v.rect.x,
            y: v.rect.y,
            width: v.rect.width,
            height: v.rect.height,
        });

        engine.set_islands(islands);
        engine.set_connections(connections);

        Self {
            engine,
            ticks,
            tracker,
            rows,
        }
    }

    pub fn position(&self, id: &str) -> Point {
        self.engine
            .island(id)
            .map(|island| island.position)
            .unwrap_or_else(|| panic!("island {id} not in engine"))
    }

    /// Screen point of a world point under the current viewport.
    pub fn screen(&self, world_x: f32, world_y: f32) -> Point {
        self.engine.world_to_screen(world_x, world_y)
    }

    /// Press at a world position.
    pub fn press_world(&self, x: f32, y: f32) {
        let p = self.screen(x, y);
        self.engine.pointer_down(p.x, p.y);
    }

    /// Full drag in screen space: press, move through each point, release.
    pub fn drag_screen(&self, from: Point, path: &[Point]) {
        self.engine.pointer_down(from.x, from.y);
        for p in path {
            self.engine.pointer_move(p.x, p.y);
        }
        self.engine.pointer_up();
    }

    /// Click (press and release) at a world position.
    pub fn click_world(&self, x: f32, y: f32) {
        self.press_world(x, y);
        self.engine.pointer_up();
    }

    pub fn tick_n(&self, n: usize) -> usize {
        self.ticks.fire_n(n)
    }
}
