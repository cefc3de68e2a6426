//! Screen-space views of the layout, pushed into Slint models.
//!
//! The engine computes [`IslandView`]s and [`ConnectionView`]s after every
//! change and, once a `VecModel` is bound, writes them into it row by row.
//! Rows are updated in place, so a steady island count never rebuilds the
//! Slint repeater.
//!
//! # Example
//!
//! ```ignore
//! let islands = Rc::new(VecModel::<IslandData>::default());
//! engine.bind_islands_model(islands.clone(), |v| IslandData {
//!     id: v.id.clone(),
//!     x: v.rect.x,
//!     y: v.rect.y,
//!     width: v.rect.width,
//!     height: v.rect.height,
//!     selected: v.selected,
//! });
//! window.set_islands(islands.into());
//! ```

use crate::connection::{arrowhead_path_commands, connection_paths};
use crate::geometry::Rect;
use crate::model::{ConnectionKind, LayoutModel};
use crate::viewport::ViewportState;
use slint::{Color, Model, SharedString, VecModel};
use std::rc::Rc;

/// Stroke colour for connections without a (valid) colour hint.
pub fn default_connection_color() -> Color {
    Color::from_rgb_u8(100, 180, 255)
}

/// One island as the renderer should paint it.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandView {
    pub id: SharedString,
    /// Displayed rect in screen space.
    pub rect: Rect,
    pub z_index: i32,
    pub minimized: bool,
    pub pinned: bool,
    pub selected: bool,
}

/// One connection as the renderer should paint it, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionView {
    pub from: SharedString,
    pub to: SharedString,
    pub kind: ConnectionKind,
    pub path_commands: SharedString,
    pub arrow_commands: SharedString,
    pub color: Color,
    /// Scaled by zoom.
    pub line_width: f32,
}

/// Islands back-to-front.
pub fn island_views(
    model: &LayoutModel,
    viewport: &ViewportState,
    selected: Option<&str>,
) -> Vec<IslandView> {
    model
        .paint_order()
        .into_iter()
        .map(|island| IslandView {
            id: island.id.as_str().into(),
            rect: viewport.rect_to_screen(&island.display_rect()),
            z_index: island.z(),
            minimized: island.minimized,
            pinned: island.pinned,
            selected: selected == Some(island.id.as_str()),
        })
        .collect()
}

/// Connections whose endpoints both exist, in model order.
pub fn connection_views(model: &LayoutModel, viewport: &ViewportState) -> Vec<ConnectionView> {
    connection_paths(model)
        .into_iter()
        .map(|path| {
            let curve = path.curve.map(|p| viewport.world_to_screen(p));
            ConnectionView {
                from: path.from.as_str().into(),
                to: path.to.as_str().into(),
                kind: path.kind,
                path_commands: curve.path_commands().into(),
                arrow_commands: arrowhead_path_commands(&curve.arrowhead()).into(),
                color: path.color.unwrap_or_else(default_connection_color),
                line_width: path.line_width * viewport.zoom,
            }
        })
        .collect()
}

/// Pushes a freshly computed list of views into a bound Slint model.
pub(crate) trait ModelSyncer<T> {
    fn sync(&self, items: &[T]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<T, P, F> ModelSyncer<T> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&T) -> P,
{
    fn sync(&self, items: &[T]) {
        update_rows(&self.model, items, &self.constructor);
    }
}

/// Box a syncer for `model`, converting each view with `constructor`.
pub(crate) fn syncer<T, P, F>(model: Rc<VecModel<P>>, constructor: F) -> Box<dyn ModelSyncer<T>>
where
    T: 'static,
    P: Clone + 'static,
    F: Fn(&T) -> P + 'static,
{
    Box::new(ConcreteModelSyncer { model, constructor })
}

/// Overwrite `model` with `items`: update rows in place, append, then trim.
pub fn update_rows<T, P, F>(model: &VecModel<P>, items: &[T], constructor: F)
where
    P: Clone + 'static,
    F: Fn(&T) -> P,
{
    for (i, item) in items.iter().enumerate() {
        let row = constructor(item);
        if i < model.row_count() {
            model.set_row_data(i, row);
        } else {
            model.push(row);
        }
    }
    while model.row_count() > items.len() {
        model.remove(model.row_count() - 1);
    }
}
