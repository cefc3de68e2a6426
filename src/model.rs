//! Layout data: islands, connections and the layout configuration.
//!
//! [`LayoutModel`] is pure data. Every consumer (arranger, simulator,
//! interaction, geometry) reads from it; none of them keeps its own copy of
//! island positions.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Displayed height of a minimized island (header only).
pub const MINIMIZED_HEIGHT: f32 = 40.0;

/// Island area divided by this gives its simulated mass.
pub const MASS_NORMALIZER: f32 = 10_000.0;

/// Lower bound for simulated mass, so degenerate sizes never divide by zero.
pub const MIN_MASS: f32 = 0.01;

/// Largest accepted `islandSpacing`; keeps spiral positions finite for any island count.
pub const MAX_ISLAND_SPACING: f32 = 1.0e6;

fn default_true() -> bool {
    true
}

fn default_strength() -> f32 {
    1.0
}

/// A free-floating rectangular panel positioned in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Island {
    /// Unique within a [`LayoutModel`].
    pub id: String,
    /// World-space top-left corner.
    pub position: Point,
    pub size: Size,
    /// Paint order. `None` means "insertion index" and is resolved by
    /// [`LayoutModel::set_islands`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default)]
    pub category: String,
    /// Pinned islands never move under physics.
    #[serde(default)]
    pub pinned: bool,
    /// Collapses the displayed height; physics still uses the full size.
    #[serde(default)]
    pub minimized: bool,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl Island {
    /// Create an unpinned, draggable, resizable island.
    pub fn new(id: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            size: Size::new(width, height),
            z_index: None,
            category: String::new(),
            pinned: false,
            minimized: false,
            resizable: true,
            draggable: true,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_minimized(mut self, minimized: bool) -> Self {
        self.minimized = minimized;
        self
    }

    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Resolved paint order (0 before the island joined a model).
    pub fn z(&self) -> i32 {
        self.z_index.unwrap_or(0)
    }

    /// Full world-space rect, as seen by the simulator.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// World-space rect as painted; minimized islands keep only their header.
    pub fn display_rect(&self) -> Rect {
        let mut rect = self.rect();
        if self.minimized {
            rect.height = rect.height.min(MINIMIZED_HEIGHT);
        }
        rect
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Simulated mass, proportional to area with a positive floor.
    pub fn mass(&self) -> f32 {
        let mass = self.size.area() / MASS_NORMALIZER;
        if mass.is_finite() && mass > MIN_MASS {
            mass
        } else {
            MIN_MASS
        }
    }
}

/// Rendering hint for a connection's stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Animated,
}

/// A link between two islands.
///
/// Directed for rendering (the arrowhead points at `to`), symmetric for forces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub kind: ConnectionKind,
    /// CSS-style hex colour (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Scales the attraction force and the stroke width.
    #[serde(default = "default_strength")]
    pub strength: f32,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: ConnectionKind::Solid,
            color: None,
            strength: 1.0,
        }
    }

    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// The colour hint as a Slint colour, if present and parseable.
    pub fn slint_color(&self) -> Option<slint::Color> {
        let raw = self.color.as_deref()?;
        let parsed = parse_hex_color(raw);
        if parsed.is_none() {
            tracing::warn!(color = raw, from = %self.from, to = %self.to, "ignoring unparsable connection colour");
        }
        parsed
    }
}

fn parse_hex_color(raw: &str) -> Option<slint::Color> {
    let hex = raw.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
    match hex.len() {
        3 => Some(slint::Color::from_rgb_u8(short(0)?, short(1)?, short(2)?)),
        6 => Some(slint::Color::from_rgb_u8(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(slint::Color::from_argb_u8(
            channel(&hex[6..8])?,
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

/// Tunables for arrangement and physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Minimum world x/y an island may be pushed to by physics.
    pub container_padding: f32,
    /// Radius unit of the auto-arrange spiral.
    pub island_spacing: f32,
    /// Reserved; carried for hosts but not enforced.
    pub connection_distance: f32,
    /// Integration time-scale multiplier.
    pub animation_speed: f32,
    /// Attraction coefficient along connections.
    pub gravity_strength: f32,
    /// Pairwise repulsion coefficient.
    pub repulsion_strength: f32,
    pub enable_physics: bool,
    pub enable_auto_arrange: bool,
    /// Reserved toggle; only the padding clamp is implemented.
    pub enable_collision_detection: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container_padding: 50.0,
            island_spacing: 100.0,
            connection_distance: 300.0,
            animation_speed: 1.0,
            gravity_strength: 0.02,
            repulsion_strength: 100.0,
            enable_physics: false,
            enable_auto_arrange: false,
            enable_collision_detection: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject non-finite or negative numbers and an oversized spiral spacing.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("containerPadding", self.container_padding),
            ("islandSpacing", self.island_spacing),
            ("connectionDistance", self.connection_distance),
            ("animationSpeed", self.animation_speed),
            ("gravityStrength", self.gravity_strength),
            ("repulsionStrength", self.repulsion_strength),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("{value} is not a finite number"),
                });
            }
            if value < 0.0 {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("{value} must not be negative"),
                });
            }
        }
        if self.island_spacing > MAX_ISLAND_SPACING {
            return Err(Error::InvalidConfig {
                field: "islandSpacing",
                reason: format!("{} exceeds {MAX_ISLAND_SPACING}", self.island_spacing),
            });
        }
        Ok(())
    }

    /// Clamp a config built in code into the accepted range.
    ///
    /// Non-finite numbers fall back to their defaults, negative ones clamp to
    /// zero and the spacing is capped at [`MAX_ISLAND_SPACING`].
    pub fn sanitized(self) -> Self {
        let mut config = Self::default();
        LayoutConfigPatch::from(&self).apply_to(&mut config);
        config
    }
}

impl From<&LayoutConfig> for LayoutConfigPatch {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            container_padding: Some(config.container_padding),
            island_spacing: Some(config.island_spacing),
            connection_distance: Some(config.connection_distance),
            animation_speed: Some(config.animation_speed),
            gravity_strength: Some(config.gravity_strength),
            repulsion_strength: Some(config.repulsion_strength),
            enable_physics: Some(config.enable_physics),
            enable_auto_arrange: Some(config.enable_auto_arrange),
            enable_collision_detection: Some(config.enable_collision_detection),
        }
    }
}

/// A partial [`LayoutConfig`]; only the fields that are `Some` get applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfigPatch {
    pub container_padding: Option<f32>,
    pub island_spacing: Option<f32>,
    pub connection_distance: Option<f32>,
    pub animation_speed: Option<f32>,
    pub gravity_strength: Option<f32>,
    pub repulsion_strength: Option<f32>,
    pub enable_physics: Option<bool>,
    pub enable_auto_arrange: Option<bool>,
    pub enable_collision_detection: Option<bool>,
}

impl LayoutConfigPatch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge onto `config`. Non-finite numbers are ignored, negative ones clamp
    /// to zero and the spacing is capped at [`MAX_ISLAND_SPACING`].
    pub fn apply_to(&self, config: &mut LayoutConfig) {
        fn number(target: &mut f32, value: Option<f32>, field: &str) {
            let Some(value) = value else { return };
            if !value.is_finite() {
                tracing::warn!(field, "ignoring non-finite config value");
                return;
            }
            *target = value.max(0.0);
        }
        number(&mut config.container_padding, self.container_padding, "containerPadding");
        number(&mut config.island_spacing, self.island_spacing, "islandSpacing");
        config.island_spacing = config.island_spacing.min(MAX_ISLAND_SPACING);
        number(&mut config.connection_distance, self.connection_distance, "connectionDistance");
        number(&mut config.animation_speed, self.animation_speed, "animationSpeed");
        number(&mut config.gravity_strength, self.gravity_strength, "gravityStrength");
        number(&mut config.repulsion_strength, self.repulsion_strength, "repulsionStrength");
        if let Some(v) = self.enable_physics {
            config.enable_physics = v;
        }
        if let Some(v) = self.enable_auto_arrange {
            config.enable_auto_arrange = v;
        }
        if let Some(v) = self.enable_collision_detection {
            config.enable_collision_detection = v;
        }
    }
}

/// A connection whose endpoints both exist, resolved to island indices.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConnection<'a> {
    pub from: usize,
    pub to: usize,
    pub connection: &'a Connection,
}

/// Islands, connections and configuration of one layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutModel {
    islands: Vec<Island>,
    connections: Vec<Connection>,
    config: LayoutConfig,
    index: HashMap<String, usize>,
}

impl LayoutModel {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
            ..Self::default()
        }
    }

    /// Replace the island list.
    ///
    /// Later islands reusing an id are dropped. Missing z-indices become the
    /// insertion index, non-finite positions are reset to the padding corner
    /// and negative sizes clamp to zero.
    pub fn set_islands(&mut self, islands: Vec<Island>) {
        self.islands.clear();
        self.index.clear();
        let padding = self.config.container_padding;

        for mut island in islands {
            if self.index.contains_key(&island.id) {
                tracing::warn!(id = %island.id, "dropping island with duplicate id");
                continue;
            }
            if !island.position.is_finite() {
                tracing::warn!(id = %island.id, "island position is not finite, resetting");
                island.position = Point::new(padding, padding);
            }
            island.size.width = sanitize_extent(island.size.width);
            island.size.height = sanitize_extent(island.size.height);
            let idx = self.islands.len();
            island.z_index.get_or_insert(idx as i32);
            self.index.insert(island.id.clone(), idx);
            self.islands.push(island);
        }
        tracing::debug!(islands = self.islands.len(), "island list replaced");
    }

    /// Replace the connection list.
    ///
    /// Connections to unknown islands are kept but ignored by every consumer.
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections
            .into_iter()
            .map(|mut c| {
                if !c.strength.is_finite() || c.strength < 0.0 {
                    tracing::warn!(from = %c.from, to = %c.to, strength = c.strength, "clamping connection strength");
                    c.strength = 0.0;
                }
                c
            })
            .collect();
        tracing::debug!(connections = self.connections.len(), "connection list replaced");
    }

    /// Merge a partial config.
    pub fn set_config(&mut self, patch: &LayoutConfigPatch) {
        patch.apply_to(&mut self.config);
    }

    /// Replace the whole config, clamping out-of-range values.
    pub fn replace_config(&mut self, config: LayoutConfig) {
        self.config = config.sanitized();
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Mutable access for the arranger, simulator and interaction overrides.
    /// The id set cannot change through this slice.
    pub(crate) fn islands_mut(&mut self) -> &mut [Island] {
        &mut self.islands
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn island(&self, id: &str) -> Option<&Island> {
        self.index_of(id).map(|i| &self.islands[i])
    }

    pub(crate) fn island_mut(&mut self, id: &str) -> Option<&mut Island> {
        let idx = self.index_of(id)?;
        self.islands.get_mut(idx)
    }

    /// Connections whose endpoints both exist.
    pub fn resolved_connections(&self) -> impl Iterator<Item = ResolvedConnection<'_>> + '_ {
        self.connections.iter().filter_map(move |c| {
            Some(ResolvedConnection {
                from: self.index_of(&c.from)?,
                to: self.index_of(&c.to)?,
                connection: c,
            })
        })
    }

    /// Islands sorted back-to-front; ties keep insertion order.
    pub fn paint_order(&self) -> Vec<&Island> {
        let mut ordered: Vec<&Island> = self.islands.iter().collect();
        ordered.sort_by_key(|island| island.z());
        ordered
    }

    /// Raise an island above every other one. Returns `false` for unknown ids.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        let mut top = self.islands.iter().map(Island::z).max().unwrap_or(0);
        if top == i32::MAX {
            self.normalize_z();
            top = self.islands.len() as i32 - 1;
        }
        let at_top = self.islands.iter().filter(|i| i.z() == top).count();
        match self.island_mut(id) {
            Some(island) => {
                if island.z() != top || at_top > 1 {
                    island.z_index = Some(top.saturating_add(1));
                }
                true
            }
            None => false,
        }
    }

    /// Renumber z-indices to `0..len` keeping the current paint order.
    fn normalize_z(&mut self) {
        let mut order: Vec<usize> = (0..self.islands.len()).collect();
        order.sort_by_key(|&idx| self.islands[idx].z());
        for (rank, idx) in order.into_iter().enumerate() {
            self.islands[idx].z_index = Some(rank as i32);
        }
        tracing::debug!(islands = self.islands.len(), "z-indices renumbered");
    }

    /// Bounding box of all full island rects.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.islands.iter().map(Island::rect))
    }
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Everything a host needs to build a [`LayoutModel`] from one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDocument {
    pub islands: Vec<Island>,
    pub connections: Vec<Connection>,
    pub config: LayoutConfig,
}

impl LayoutDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: LayoutDocument = serde_json::from_str(json)?;
        doc.config.validate()?;
        Ok(doc)
    }

    pub fn into_model(self) -> LayoutModel {
        let mut model = LayoutModel::new(self.config);
        model.set_islands(self.islands);
        model.set_connections(self.connections);
        model
    }
}
