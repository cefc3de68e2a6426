//! Zoom/pan state and the transforms between world, screen and minimap space.
//!
//! ```text
//! screen  = world * zoom + offset
//! world   = (screen - offset) / zoom
//! minimap = world * minimap_scale
//! ```

use crate::geometry::{Point, Rect, Size};
use crate::model::Island;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 3.0;

/// Factor applied by [`ViewportController::zoom_in`] / [`ViewportController::zoom_out`].
pub const ZOOM_STEP: f32 = 1.2;

/// Default world→minimap scale.
pub const DEFAULT_MINIMAP_SCALE: f32 = 0.1;

/// Clamp a requested zoom into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite requests become 1.0.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// The world→screen transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub offset: Point,
    pub zoom: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewportState {
    pub fn screen_to_world(&self, p: Point) -> Point {
        (p - self.offset) / self.zoom
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        p * self.zoom + self.offset
    }

    pub fn rect_to_screen(&self, r: &Rect) -> Rect {
        Rect::from_origin_size(
            self.world_to_screen(r.origin()),
            Size::new(r.width * self.zoom, r.height * self.zoom),
        )
    }
}

/// Everything needed to paint the minimap.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapGeometry {
    pub scale: f32,
    /// Island rects in minimap space, in model order.
    pub islands: Vec<Rect>,
    /// The visible screen area in minimap space.
    pub indicator: Rect,
}

/// Owns the [`ViewportState`] and the container it is shown in.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    state: ViewportState,
    container: Size,
    minimap_scale: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

impl ViewportController {
    pub fn new(container: Size) -> Self {
        Self {
            state: ViewportState::default(),
            container,
            minimap_scale: DEFAULT_MINIMAP_SCALE,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.set_zoom(zoom);
        self
    }

    pub fn with_minimap_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.minimap_scale = scale;
        }
        self
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn offset(&self) -> Point {
        self.state.offset
    }

    /// Zoom as a rounded percentage, for status displays.
    pub fn zoom_percent(&self) -> i32 {
        (self.state.zoom * 100.0).round() as i32
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Update the screen size, e.g. when the host window is resized.
    pub fn set_container_size(&mut self, size: Size) {
        if size.width.is_finite() && size.height.is_finite() {
            self.container = Size::new(size.width.max(0.0), size.height.max(0.0));
        }
    }

    pub fn minimap_scale(&self) -> f32 {
        self.minimap_scale
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        self.state.screen_to_world(p)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        self.state.world_to_screen(p)
    }

    // === Zoom / pan ===

    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.zoom = clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom / ZOOM_STEP);
    }

    /// Multiply the zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.screen_to_world(screen_point);
        self.set_zoom(self.state.zoom * factor);
        self.state.offset = screen_point - anchor * self.state.zoom;
    }

    pub fn pan_by(&mut self, delta: Point) {
        if delta.is_finite() {
            self.state.offset += delta;
        }
    }

    pub fn set_offset(&mut self, offset: Point) {
        if offset.is_finite() {
            self.state.offset = offset;
        }
    }

    /// Center `world_point` in the container at the current zoom.
    pub fn center_on(&mut self, world_point: Point) {
        let screen_center = Point::new(self.container.width / 2.0, self.container.height / 2.0);
        self.state.offset = screen_center - world_point * self.state.zoom;
    }

    /// Map the bounding box center of `islands` to the container center.
    ///
    /// Does nothing for an empty list.
    pub fn recenter(&mut self, islands: &[Island]) {
        let Some(bounds) = Rect::bounding(islands.iter().map(Island::rect)) else {
            return;
        };
        self.center_on(bounds.center());
        tracing::debug!(offset_x = self.state.offset.x, offset_y = self.state.offset.y, "viewport recentered");
    }

    /// Pick the largest zoom (clamped) at which every island fits with `margin`
    /// screen pixels to spare on each side, then recenter.
    pub fn fit_to(&mut self, islands: &[Island], margin: f32) {
        let Some(bounds) = Rect::bounding(islands.iter().map(Island::rect)) else {
            return;
        };
        let margin = margin.max(0.0);
        let avail_w = self.container.width - 2.0 * margin;
        let avail_h = self.container.height - 2.0 * margin;
        if avail_w > 0.0 && avail_h > 0.0 {
            let zoom_w = if bounds.width > 0.0 { avail_w / bounds.width } else { MAX_ZOOM };
            let zoom_h = if bounds.height > 0.0 { avail_h / bounds.height } else { MAX_ZOOM };
            self.set_zoom(zoom_w.min(zoom_h));
        }
        self.center_on(bounds.center());
    }

    // === Minimap ===

    pub fn world_to_minimap(&self, p: Point) -> Point {
        p * self.minimap_scale
    }

    pub fn minimap_to_world(&self, p: Point) -> Point {
        p / self.minimap_scale
    }

    /// The screen viewport in minimap space.
    ///
    /// `position = -offset * scale / zoom`, `size = container * scale / zoom`.
    pub fn minimap_indicator(&self) -> Rect {
        let k = self.minimap_scale / self.state.zoom;
        Rect::new(
            -self.state.offset.x * k,
            -self.state.offset.y * k,
            self.container.width * k,
            self.container.height * k,
        )
    }

    pub fn minimap_geometry(&self, islands: &[Island]) -> MinimapGeometry {
        let s = self.minimap_scale;
        MinimapGeometry {
            scale: s,
            islands: islands
                .iter()
                .map(|i| {
                    let r = i.display_rect();
                    Rect::new(r.x * s, r.y * s, r.width * s, r.height * s)
                })
                .collect(),
            indicator: self.minimap_indicator(),
        }
    }

    /// Move the viewport so a clicked minimap point becomes the screen center.
    pub fn center_on_minimap_point(&mut self, minimap_point: Point) {
        let world = self.minimap_to_world(minimap_point);
        if world.is_finite() {
            self.center_on(world);
        }
    }
}
