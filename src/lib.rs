//! # Slint Island Layout
//!
//! A layout engine for free-floating rectangular panels ("islands") and the
//! connectors between them, meant to sit behind a Slint UI that paints them.
//!
//! ## Features
//!
//! - **Golden-angle auto-arrange** - deterministic spiral placement, independent of island size
//! - **Force-directed physics** - pairwise repulsion, attraction along connections, damping
//!   and an inelastic wall at the container padding
//! - **Pointer interaction** - drag, resize, selection and two-click connection creation as an
//!   explicit state machine
//! - **Viewport** - zoom/pan transforms between world, screen and minimap space
//! - **Connection geometry** - upward-bowing quadratic curves with arrowheads, as points or SVG
//!   path commands
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_island_layout::{EngineConfig, Island, LayoutEngine};
//!
//! let engine = LayoutEngine::with_frame_timer(EngineConfig::default());
//! engine.set_islands(vec![Island::new("a", 0.0, 0.0, 200.0, 120.0)]);
//! engine.auto_arrange();
//! engine.set_physics_enabled(true);
//! ```
//!
//! ## Building blocks
//!
//! The engine is a thin orchestrator. Every piece is usable on its own:
//!
//! - [`LayoutModel`] - islands, connections and [`LayoutConfig`]
//! - [`arrange`] - spiral placement
//! - [`PhysicsSimulator`] - one deterministic step per tick
//! - [`ViewportController`] - zoom, pan, recenter and minimap mapping
//! - [`InteractionController`] - pointer state machine
//! - [`compute_curve`] / [`compute_arrowhead`] - paint-ready connection geometry
//! - [`TickSource`] - where ticks come from ([`FrameTimer`] or [`ManualTicks`])

pub mod arrange;
pub mod connection;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod physics;
pub mod sync;
pub mod tick;
pub mod viewport;

pub use arrange::{arrange, arrange_model, spiral_position};
pub use connection::{
    arrowhead_path_commands, compute_arrowhead, compute_curve, connection_paths, ConnectionCurve,
    ConnectionPath,
};
pub use engine::{EngineConfig, LayoutEngine, LayoutStats};
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use hit_test::{island_at_screen, island_at_world, PointerTarget};
pub use interaction::{InteractionController, InteractionEvent, InteractionState, MIN_ISLAND_SIZE};
pub use model::{
    Connection, ConnectionKind, Island, LayoutConfig, LayoutConfigPatch, LayoutDocument,
    LayoutModel, MAX_ISLAND_SPACING,
};
pub use physics::{PhysicsBody, PhysicsSimulator};
pub use sync::{ConnectionView, IslandView};
pub use tick::{FrameTimer, ManualTicks, TickSource};
pub use viewport::{MinimapGeometry, ViewportController, ViewportState};
