//! Paint-ready geometry for connections.
//!
//! A connection is drawn as a quadratic Bézier between the centers of its two
//! islands, bowing upwards by a quarter of the horizontal separation, with an
//! arrowhead at the `to` end. Nothing here draws; the renderer consumes the
//! points or the SVG path commands.

use crate::geometry::{Point, Rect};
use crate::model::{ConnectionKind, LayoutModel};
use std::f32::consts::PI;

/// Distance from the arrow tip to its base vertices.
pub const ARROW_LENGTH: f32 = 10.0;

/// Half-angle of the arrowhead (30°).
pub const ARROW_SPREAD: f32 = PI / 6.0;

/// Stroke width of a connection with strength 1.
pub const BASE_LINE_WIDTH: f32 = 2.0;

/// Quadratic curve from `p0` to `p1` through `control`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCurve {
    pub p0: Point,
    pub control: Point,
    pub p1: Point,
}

/// Build the curve joining the centers of two island rects.
///
/// `control = ((p0.x + p1.x) / 2, min(p0.y, p1.y) - |p1.x - p0.x| / 4)`
pub fn compute_curve(from: &Rect, to: &Rect) -> ConnectionCurve {
    let p0 = from.center();
    let p1 = to.center();
    let control = Point::new(
        (p0.x + p1.x) / 2.0,
        p0.y.min(p1.y) - (p1.x - p0.x).abs() / 4.0,
    );
    ConnectionCurve { p0, control, p1 }
}

/// Arrowhead triangle `[tip, left, right]` for a curve ending at `p1`.
///
/// The base vertices sit [`ARROW_LENGTH`] back from the tip, ±30° either side
/// of the reversed end tangent.
pub fn compute_arrowhead(p1: Point, control: Point) -> [Point; 3] {
    let angle = (p1.y - control.y).atan2(p1.x - control.x);
    let base = |offset: f32| {
        Point::new(
            p1.x - ARROW_LENGTH * (angle + offset).cos(),
            p1.y - ARROW_LENGTH * (angle + offset).sin(),
        )
    };
    [p1, base(-ARROW_SPREAD), base(ARROW_SPREAD)]
}

impl ConnectionCurve {
    /// Point on the curve at `t` in `[0, 1]`.
    pub fn eval(&self, t: f32) -> Point {
        let mt = 1.0 - t;
        self.p0 * (mt * mt) + self.control * (2.0 * mt * t) + self.p1 * (t * t)
    }

    pub fn arrowhead(&self) -> [Point; 3] {
        compute_arrowhead(self.p1, self.control)
    }

    /// Apply a point transform (e.g. world→screen) to every point.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> ConnectionCurve {
        ConnectionCurve {
            p0: f(self.p0),
            control: f(self.control),
            p1: f(self.p1),
        }
    }

    /// SVG path commands, e.g. `"M 20 20 Q 120 -30 220 20"`.
    pub fn path_commands(&self) -> String {
        format!(
            "M {} {} Q {} {} {} {}",
            self.p0.x, self.p0.y, self.control.x, self.control.y, self.p1.x, self.p1.y
        )
    }

    /// Minimum distance from `point` to the curve, approximated by `samples` chords.
    pub fn distance_to(&self, point: Point, samples: usize) -> f32 {
        let samples = if samples == 0 { 20 } else { samples };
        let mut min_dist_sq = f32::MAX;
        let mut prev = self.eval(0.0);
        for i in 1..=samples {
            let curr = self.eval(i as f32 / samples as f32);
            min_dist_sq = min_dist_sq.min(distance_to_segment_sq(point, prev, curr));
            prev = curr;
        }
        min_dist_sq.sqrt()
    }
}

/// SVG path commands for a closed arrowhead triangle.
pub fn arrowhead_path_commands(vertices: &[Point; 3]) -> String {
    let [tip, left, right] = vertices;
    format!(
        "M {} {} L {} {} L {} {} Z",
        tip.x, tip.y, left.x, left.y, right.x, right.y
    )
}

fn distance_to_segment_sq(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;
    if ab_len_sq < f32::EPSILON {
        return ap.x * ap.x + ap.y * ap.y;
    }
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    let d = p - (a + ab * t);
    d.x * d.x + d.y * d.y
}

/// Everything a renderer needs to paint one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPath {
    /// Index into [`LayoutModel::connections`].
    pub index: usize,
    pub from: String,
    pub to: String,
    pub kind: ConnectionKind,
    pub color: Option<slint::Color>,
    pub line_width: f32,
    pub curve: ConnectionCurve,
    pub arrowhead: [Point; 3],
}

/// World-space paths for every connection whose endpoints exist.
///
/// Curves attach to the displayed rects, so minimized islands connect at their header.
pub fn connection_paths(model: &LayoutModel) -> Vec<ConnectionPath> {
    let islands = model.islands();
    model
        .connections()
        .iter()
        .enumerate()
        .filter_map(|(index, c)| {
            let from = islands.get(model.index_of(&c.from)?)?;
            let to = islands.get(model.index_of(&c.to)?)?;
            let curve = compute_curve(&from.display_rect(), &to.display_rect());
            Some(ConnectionPath {
                index,
                from: c.from.clone(),
                to: c.to.clone(),
                kind: c.kind,
                color: c.slint_color(),
                line_width: BASE_LINE_WIDTH * c.strength,
                arrowhead: curve.arrowhead(),
                curve,
            })
        })
        .collect()
}

/// Index of the connection nearest to `point` within `hover_distance`, if any.
///
/// `paths` and `point` must be in the same coordinate space.
pub fn find_connection_at(
    point: Point,
    paths: &[ConnectionPath],
    hover_distance: f32,
    samples: usize,
) -> Option<usize> {
    let mut closest = None;
    let mut closest_distance = hover_distance;
    for path in paths {
        let distance = path.curve.distance_to(point, samples);
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(path.index);
        }
    }
    closest
}
