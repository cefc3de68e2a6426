//! The [`LayoutEngine`] ties the model, simulator, viewport and interaction
//! controller together behind one cloneable handle.
//!
//! # Example
//!
//! ```ignore
//! use slint_island_layout::{EngineConfig, Island, LayoutEngine};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let engine = LayoutEngine::with_frame_timer(EngineConfig::default());
//!
//!     engine.set_islands(vec![
//!         Island::new("sales", 0.0, 0.0, 300.0, 200.0),
//!         Island::new("traffic", 0.0, 0.0, 300.0, 200.0),
//!     ]);
//!
//!     let islands = Rc::new(VecModel::default());
//!     engine.bind_islands_model(islands.clone(), |v| IslandData {
//!         id: v.id.clone(),
//!         x: v.rect.x,
//!         y: v.rect.y,
//!         width: v.rect.width,
//!         height: v.rect.height,
//!     });
//!     window.set_islands(islands.into());
//!
//!     window.on_pointer_down(engine.pointer_down_callback());
//!     window.on_pointer_move(engine.pointer_move_callback());
//!     window.on_pointer_up(engine.pointer_up_callback());
//!
//!     engine.on_island_move(|island, x, y| println!("{} moved to {x},{y}", island.id));
//!     engine.set_physics_enabled(true);
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::arrange::arrange_model;
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::hit_test::{self, PointerTarget, CONNECTION_HOVER_DISTANCE};
use crate::interaction::{InteractionController, InteractionEvent, InteractionState};
use crate::model::{Connection, Island, LayoutConfig, LayoutConfigPatch, LayoutDocument, LayoutModel};
use crate::physics::PhysicsSimulator;
use crate::sync::{self, connection_views, island_views, ConnectionView, IslandView, ModelSyncer};
use crate::tick::{FrameTimer, TickSource};
use crate::viewport::{clamp_zoom, MinimapGeometry, ViewportController, ViewportState};
use serde::{Deserialize, Serialize};
use slint::VecModel;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Engine options on top of the [`LayoutConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub layout: LayoutConfig,
    /// Initial zoom, clamped to the viewport range.
    pub zoom_level: f32,
    /// Recenter the viewport on the first island load.
    pub center_on_load: bool,
    pub enable_resizing: bool,
    pub container_width: f32,
    pub container_height: f32,
    pub minimap_scale: f32,
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            zoom_level: 1.0,
            center_on_load: false,
            enable_resizing: true,
            container_width: 800.0,
            container_height: 600.0,
            minimap_scale: 0.1,
            tick_interval_ms: 16,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config. Layout fields sit at the top level.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        let positive = [
            ("zoomLevel", self.zoom_level),
            ("minimapScale", self.minimap_scale),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("{value} must be a positive number"),
                });
            }
        }
        for (field, value) in [
            ("containerWidth", self.container_width),
            ("containerHeight", self.container_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("{value} must not be negative"),
                });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig {
                field: "tickIntervalMs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn container(&self) -> Size {
        Size::new(self.container_width, self.container_height)
    }
}

/// Side-effect-free summary for status bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    pub island_count: usize,
    pub connection_count: usize,
    pub zoom_percent: i32,
    pub physics_enabled: bool,
    pub kinetic_energy: f32,
    pub settled: bool,
}

type IslandCallback = Rc<dyn Fn(&Island)>;
type IslandValueCallback = Rc<dyn Fn(&Island, f32, f32)>;
type ConnectionCallback = Rc<dyn Fn(&str, &str)>;

#[derive(Default)]
struct Callbacks {
    island_move: Option<IslandValueCallback>,
    island_resize: Option<IslandValueCallback>,
    island_select: Option<IslandCallback>,
    connection_create: Option<ConnectionCallback>,
}

#[derive(Default)]
struct Syncers {
    islands: Option<Box<dyn ModelSyncer<IslandView>>>,
    connections: Option<Box<dyn ModelSyncer<ConnectionView>>>,
}

struct EngineState {
    model: LayoutModel,
    physics: PhysicsSimulator,
    viewport: ViewportController,
    interaction: InteractionController,
    options: EngineConfig,
    /// Index of the island physics currently treats as held.
    held: Option<usize>,
    loaded: bool,
}

impl EngineState {
    /// Keep the simulator's held flag on the island being dragged or resized.
    fn sync_held(&mut self) {
        let active = self
            .interaction
            .active_island()
            .and_then(|id| self.model.index_of(id));
        if active == self.held {
            return;
        }
        if let Some(idx) = self.held {
            self.physics.set_held(idx, false);
        }
        if let Some(idx) = active {
            self.physics.set_held(idx, true);
        }
        self.held = active;
    }

    fn reset_physics(&mut self) {
        self.physics.reset(&self.model);
        self.held = None;
        self.sync_held();
    }

    /// Pair each event with a snapshot of its island, for dispatch after the borrow ends.
    fn resolve(&self, events: Vec<InteractionEvent>) -> Vec<(InteractionEvent, Option<Island>)> {
        events
            .into_iter()
            .map(|event| {
                let island = match &event {
                    InteractionEvent::Selected { island_id }
                    | InteractionEvent::Moved { island_id, .. }
                    | InteractionEvent::Resized { island_id, .. } => self.model.island(island_id).cloned(),
                    InteractionEvent::ConnectionCreated { .. } => None,
                };
                (event, island)
            })
            .collect()
    }
}

struct EngineInner {
    state: RefCell<EngineState>,
    ticker: RefCell<Box<dyn TickSource>>,
    callbacks: RefCell<Callbacks>,
    syncers: RefCell<Syncers>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        self.ticker.get_mut().stop();
    }
}

/// Island layout engine.
///
/// Clone this handle to share it across Slint callbacks; all clones drive the
/// same layout. Physics ticks arrive from the [`TickSource`] given at
/// construction and stop when physics is disabled, [`shutdown`](Self::shutdown)
/// is called, or the last handle is dropped.
#[derive(Clone)]
pub struct LayoutEngine {
    inner: Rc<EngineInner>,
}

impl LayoutEngine {
    /// Create an engine ticking from `ticker`.
    ///
    /// Starts ticking immediately if `config.layout.enable_physics` is set.
    pub fn new(config: EngineConfig, ticker: impl TickSource + 'static) -> Self {
        let viewport = ViewportController::new(config.container())
            .with_zoom(clamp_zoom(config.zoom_level))
            .with_minimap_scale(config.minimap_scale);
        let state = EngineState {
            model: LayoutModel::new(config.layout.clone()),
            physics: PhysicsSimulator::default(),
            viewport,
            interaction: InteractionController::new(config.enable_resizing),
            options: config,
            held: None,
            loaded: false,
        };
        let engine = Self {
            inner: Rc::new(EngineInner {
                state: RefCell::new(state),
                ticker: RefCell::new(Box::new(ticker)),
                callbacks: RefCell::new(Callbacks::default()),
                syncers: RefCell::new(Syncers::default()),
            }),
        };
        if engine.physics_enabled() {
            engine.start_ticker();
        }
        engine
    }

    /// Create an engine ticking from a Slint timer on the UI thread.
    pub fn with_frame_timer(config: EngineConfig) -> Self {
        Self::new(config, FrameTimer::new())
    }

    // === Model ===

    /// Replace the island list.
    ///
    /// Physics state is re-derived. On the first non-empty load the islands
    /// are auto-arranged and the viewport recentered if configured.
    pub fn set_islands(&self, islands: Vec<Island>) {
        {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            st.model.set_islands(islands);
            let first_load = !st.loaded && !st.model.is_empty();
            if first_load {
                st.loaded = true;
                if st.model.config().enable_auto_arrange {
                    arrange_model(&mut st.model);
                }
                if st.options.center_on_load {
                    st.viewport.recenter(st.model.islands());
                }
            }
            st.interaction.retain_valid(&st.model);
            st.reset_physics();
        }
        self.refresh();
    }

    /// Replace the connection list. Unknown endpoints are kept but ignored.
    pub fn set_connections(&self, connections: Vec<Connection>) {
        self.inner.state.borrow_mut().model.set_connections(connections);
        self.refresh();
    }

    /// Merge a partial layout config. Toggling `enable_physics` starts or stops ticking.
    pub fn set_config(&self, patch: &LayoutConfigPatch) {
        let was = self.physics_enabled();
        self.inner.state.borrow_mut().model.set_config(patch);
        self.physics_toggled(was);
    }

    /// Replace the whole layout config.
    pub fn set_layout_config(&self, config: LayoutConfig) {
        let was = self.physics_enabled();
        self.inner.state.borrow_mut().model.replace_config(config);
        self.physics_toggled(was);
    }

    /// Load a whole document: config first, then islands and connections.
    pub fn load_document(&self, document: LayoutDocument) {
        self.set_layout_config(document.config);
        self.set_islands(document.islands);
        self.set_connections(document.connections);
    }

    pub fn set_physics_enabled(&self, enabled: bool) {
        self.set_config(&LayoutConfigPatch {
            enable_physics: Some(enabled),
            ..Default::default()
        });
    }

    pub fn set_enable_resizing(&self, enabled: bool) {
        let mut st = self.inner.state.borrow_mut();
        st.options.enable_resizing = enabled;
        st.interaction.set_enable_resizing(enabled);
    }

    /// Place every island on the golden-angle spiral and zero all velocities.
    pub fn auto_arrange(&self) {
        {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            arrange_model(&mut st.model);
            st.reset_physics();
        }
        self.refresh();
    }

    /// Advance physics by one step. Returns the kinetic energy, or 0 while physics is off.
    ///
    /// Called by the tick source; hosts may also call it directly.
    pub fn tick(&self) -> f32 {
        let energy = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            if !st.model.config().enable_physics {
                return 0.0;
            }
            st.physics.step(&mut st.model)
        };
        self.refresh();
        energy
    }

    /// Stop ticking for good. Physics can still be stepped manually via [`tick`](Self::tick).
    pub fn shutdown(&self) {
        self.inner.ticker.borrow_mut().stop();
        tracing::debug!("layout engine shut down");
    }

    fn physics_toggled(&self, was: bool) {
        let now = self.physics_enabled();
        if now && !was {
            self.inner.state.borrow_mut().reset_physics();
            self.start_ticker();
            tracing::debug!("physics enabled");
        } else if !now && was {
            self.inner.ticker.borrow_mut().stop();
            tracing::debug!("physics disabled");
        }
        self.refresh();
    }

    fn start_ticker(&self) {
        let interval = Duration::from_millis(self.inner.state.borrow().options.tick_interval_ms.max(1));
        let weak: Weak<EngineInner> = Rc::downgrade(&self.inner);
        self.inner.ticker.borrow_mut().start(
            interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    LayoutEngine { inner }.tick();
                }
            }),
        );
    }

    // === Pointer input (screen space) ===

    /// Pointer pressed; the engine finds the island under it.
    pub fn pointer_down(&self, x: f32, y: f32) {
        self.interact(|st, vp| st.interaction.pointer_down(&mut st.model, &vp, Point::new(x, y)));
    }

    /// Pointer pressed on an island the host already identified.
    pub fn pointer_down_on(&self, island_id: &str, x: f32, y: f32, target: PointerTarget) {
        self.interact(|st, vp| {
            st.interaction
                .pointer_down_on(&mut st.model, &vp, Point::new(x, y), island_id, target)
        });
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        let moved = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            let vp = st.viewport.state();
            let moved = st.interaction.pointer_move(&mut st.model, &vp, Point::new(x, y));
            if let Some(idx) = moved {
                st.physics.stop(idx);
            }
            moved
        };
        if moved.is_some() {
            self.refresh();
        }
    }

    pub fn pointer_up(&self) {
        self.interact(|st, _| st.interaction.pointer_up(&st.model));
    }

    /// Abort a drag/resize (restoring the island) or a pending connection. No callbacks fire.
    pub fn cancel_interaction(&self) {
        self.interact(|st, _| {
            st.interaction.cancel(&mut st.model);
            Vec::new()
        });
    }

    pub fn set_connection_mode(&self, enabled: bool) {
        self.interact(|st, _| {
            st.interaction.set_connection_mode(&mut st.model, enabled);
            Vec::new()
        });
    }

    pub fn toggle_connection_mode(&self) {
        self.interact(|st, _| {
            st.interaction.toggle_connection_mode(&mut st.model);
            Vec::new()
        });
    }

    fn interact(&self, f: impl FnOnce(&mut EngineState, ViewportState) -> Vec<InteractionEvent>) {
        let events = {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            let vp = st.viewport.state();
            let events = f(st, vp);
            st.sync_held();
            st.resolve(events)
        };
        self.refresh();
        self.dispatch(events);
    }

    fn dispatch(&self, events: Vec<(InteractionEvent, Option<Island>)>) {
        for (event, island) in events {
            match (event, island) {
                (InteractionEvent::Selected { .. }, Some(island)) => {
                    let cb = self.inner.callbacks.borrow().island_select.clone();
                    if let Some(cb) = cb {
                        cb(&island);
                    }
                }
                (InteractionEvent::Moved { position, .. }, Some(island)) => {
                    let cb = self.inner.callbacks.borrow().island_move.clone();
                    if let Some(cb) = cb {
                        cb(&island, position.x, position.y);
                    }
                }
                (InteractionEvent::Resized { size, .. }, Some(island)) => {
                    let cb = self.inner.callbacks.borrow().island_resize.clone();
                    if let Some(cb) = cb {
                        cb(&island, size.width, size.height);
                    }
                }
                (InteractionEvent::ConnectionCreated { from, to }, _) => {
                    let cb = self.inner.callbacks.borrow().connection_create.clone();
                    if let Some(cb) = cb {
                        cb(&from, &to);
                    }
                }
                _ => {}
            }
        }
    }

    // === Callbacks ===

    /// Called once when a drag completes, with the final world position.
    pub fn on_island_move(&self, f: impl Fn(&Island, f32, f32) + 'static) {
        self.inner.callbacks.borrow_mut().island_move = Some(Rc::new(f));
    }

    /// Called once when a resize completes, with the final size.
    pub fn on_island_resize(&self, f: impl Fn(&Island, f32, f32) + 'static) {
        self.inner.callbacks.borrow_mut().island_resize = Some(Rc::new(f));
    }

    pub fn on_island_select(&self, f: impl Fn(&Island) + 'static) {
        self.inner.callbacks.borrow_mut().island_select = Some(Rc::new(f));
    }

    /// Called when connection mode joins two islands. The engine does not add
    /// the connection itself; pass the updated list to [`set_connections`](Self::set_connections).
    pub fn on_connection_create(&self, f: impl Fn(&str, &str) + 'static) {
        self.inner.callbacks.borrow_mut().connection_create = Some(Rc::new(f));
    }

    // === Callback factories ===

    /// Returns a callback for a `pointer-down(x, y)` Slint callback.
    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32) {
        let engine = self.clone();
        move |x, y| engine.pointer_down(x, y)
    }

    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let engine = self.clone();
        move |x, y| engine.pointer_move(x, y)
    }

    pub fn pointer_up_callback(&self) -> impl Fn() {
        let engine = self.clone();
        move || engine.pointer_up()
    }

    /// Returns a callback for wheel zoom: `(x, y, factor)` in screen space.
    pub fn zoom_at_callback(&self) -> impl Fn(f32, f32, f32) {
        let engine = self.clone();
        move |x, y, factor| engine.zoom_at(x, y, factor)
    }

    // === Viewport ===

    pub fn zoom_in(&self) {
        self.with_viewport(ViewportController::zoom_in);
    }

    pub fn zoom_out(&self) {
        self.with_viewport(ViewportController::zoom_out);
    }

    pub fn set_zoom(&self, zoom: f32) {
        self.with_viewport(|vp| vp.set_zoom(zoom));
    }

    pub fn zoom_at(&self, x: f32, y: f32, factor: f32) {
        self.with_viewport(|vp| vp.zoom_at(Point::new(x, y), factor));
    }

    pub fn pan_by(&self, dx: f32, dy: f32) {
        self.with_viewport(|vp| vp.pan_by(Point::new(dx, dy)));
    }

    /// Center the islands' bounding box in the container at the current zoom.
    pub fn recenter(&self) {
        {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            st.viewport.recenter(st.model.islands());
        }
        self.refresh();
    }

    /// Zoom and pan so every island is visible with `margin` pixels to spare.
    pub fn fit_to_view(&self, margin: f32) {
        {
            let mut guard = self.inner.state.borrow_mut();
            let st = &mut *guard;
            st.viewport.fit_to(st.model.islands(), margin);
        }
        self.refresh();
    }

    pub fn set_container_size(&self, width: f32, height: f32) {
        {
            let mut st = self.inner.state.borrow_mut();
            st.viewport.set_container_size(Size::new(width, height));
            let container = st.viewport.container();
            st.options.container_width = container.width;
            st.options.container_height = container.height;
        }
        self.refresh();
    }

    /// Navigate so a clicked minimap point becomes the screen center.
    pub fn center_on_minimap_point(&self, x: f32, y: f32) {
        self.with_viewport(|vp| vp.center_on_minimap_point(Point::new(x, y)));
    }

    fn with_viewport(&self, f: impl FnOnce(&mut ViewportController)) {
        f(&mut self.inner.state.borrow_mut().viewport);
        self.refresh();
    }

    // === Read accessors ===

    pub fn islands(&self) -> Vec<Island> {
        self.inner.state.borrow().model.islands().to_vec()
    }

    pub fn island(&self, id: &str) -> Option<Island> {
        self.inner.state.borrow().model.island(id).cloned()
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.inner.state.borrow().model.connections().to_vec()
    }

    /// Current options, with the live layout config.
    pub fn config(&self) -> EngineConfig {
        let st = self.inner.state.borrow();
        EngineConfig {
            layout: st.model.config().clone(),
            ..st.options.clone()
        }
    }

    pub fn physics_enabled(&self) -> bool {
        self.inner.state.borrow().model.config().enable_physics
    }

    /// True while the tick source is delivering ticks.
    pub fn is_ticking(&self) -> bool {
        self.inner.ticker.borrow().is_running()
    }

    pub fn viewport(&self) -> ViewportState {
        self.inner.state.borrow().viewport.state()
    }

    pub fn screen_to_world(&self, x: f32, y: f32) -> Point {
        self.inner.state.borrow().viewport.screen_to_world(Point::new(x, y))
    }

    pub fn world_to_screen(&self, x: f32, y: f32) -> Point {
        self.inner.state.borrow().viewport.world_to_screen(Point::new(x, y))
    }

    pub fn minimap(&self) -> MinimapGeometry {
        let st = self.inner.state.borrow();
        st.viewport.minimap_geometry(st.model.islands())
    }

    pub fn stats(&self) -> LayoutStats {
        let st = self.inner.state.borrow();
        LayoutStats {
            island_count: st.model.len(),
            connection_count: st.model.connections().len(),
            zoom_percent: st.viewport.zoom_percent(),
            physics_enabled: st.model.config().enable_physics,
            kinetic_energy: st.physics.kinetic_energy(),
            settled: st.physics.is_settled(),
        }
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.inner.state.borrow().interaction.state().clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.inner.state.borrow().interaction.selected().map(str::to_string)
    }

    pub fn connection_mode(&self) -> bool {
        self.inner.state.borrow().interaction.connection_mode()
    }

    pub fn island_views(&self) -> Vec<IslandView> {
        let st = self.inner.state.borrow();
        island_views(&st.model, &st.viewport.state(), st.interaction.selected())
    }

    pub fn connection_views(&self) -> Vec<ConnectionView> {
        let st = self.inner.state.borrow();
        connection_views(&st.model, &st.viewport.state())
    }

    /// Id of the topmost island under a screen position.
    pub fn island_at_screen(&self, x: f32, y: f32) -> Option<String> {
        let st = self.inner.state.borrow();
        hit_test::island_at_screen(&st.model, &st.viewport.state(), Point::new(x, y))
            .map(|island| island.id.clone())
    }

    /// Index into [`connections`](Self::connections) of the curve under a screen position.
    pub fn connection_at_screen(&self, x: f32, y: f32) -> Option<usize> {
        let st = self.inner.state.borrow();
        hit_test::connection_at_screen(
            &st.model,
            &st.viewport.state(),
            Point::new(x, y),
            CONNECTION_HOVER_DISTANCE,
        )
    }

    // === Slint model binding ===

    /// Keep `model` filled with screen-space islands, back-to-front.
    pub fn bind_islands_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&IslandView) -> P + 'static,
    {
        self.inner.syncers.borrow_mut().islands = Some(sync::syncer(model, constructor));
        self.refresh();
    }

    /// Keep `model` filled with screen-space connection paths.
    pub fn bind_connections_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&ConnectionView) -> P + 'static,
    {
        self.inner.syncers.borrow_mut().connections = Some(sync::syncer(model, constructor));
        self.refresh();
    }

    fn refresh(&self) {
        let syncers = self.inner.syncers.borrow();
        if let Some(syncer) = &syncers.islands {
            syncer.sync(&self.island_views());
        }
        if let Some(syncer) = &syncers.connections {
            syncer.sync(&self.connection_views());
        }
    }
}
