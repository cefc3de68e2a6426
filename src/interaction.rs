//! Pointer-driven drag, resize, selection and connection creation.
//!
//! The controller is an explicit state machine:
//!
//! ```text
//! Idle ──down(body)──────▶ Dragging ──up──▶ Idle   (Moved)
//! Idle ──down(grip)──────▶ Resizing ──up──▶ Idle   (Resized)
//! Idle ──down, conn mode─▶ ConnectionPending(src)
//! ConnectionPending(src) ──down(other)──▶ Idle     (ConnectionCreated)
//! ```
//!
//! Pointer positions are always in screen space. Drag and resize write
//! straight into the [`LayoutModel`]; the engine marks the active island as
//! held so the simulator leaves it alone.

use crate::geometry::{Point, Size};
use crate::hit_test::{hit_target, PointerTarget};
use crate::model::LayoutModel;
use crate::viewport::ViewportState;

/// Smallest size a resize can shrink an island to.
pub const MIN_ISLAND_SIZE: Size = Size::new(40.0, 40.0);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        island_id: String,
        /// `pointer - position * zoom` at drag start.
        pointer_offset: Point,
        start_position: Point,
        last_position: Point,
    },
    Resizing {
        island_id: String,
        start_pointer: Point,
        start_size: Size,
        last_size: Size,
    },
    ConnectionPending {
        source_id: String,
    },
}

/// Something the host should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Selected { island_id: String },
    /// Fired once, when a drag completes.
    Moved { island_id: String, position: Point },
    /// Fired once, when a resize completes.
    Resized { island_id: String, size: Size },
    ConnectionCreated { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    state: InteractionState,
    connection_mode: bool,
    enable_resizing: bool,
    selected: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionController {
    pub fn new(enable_resizing: bool) -> Self {
        Self {
            state: InteractionState::Idle,
            connection_mode: false,
            enable_resizing,
            selected: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn connection_mode(&self) -> bool {
        self.connection_mode
    }

    pub fn set_enable_resizing(&mut self, enabled: bool) {
        self.enable_resizing = enabled;
    }

    /// Island currently being dragged or resized.
    pub fn active_island(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Dragging { island_id, .. }
            | InteractionState::Resizing { island_id, .. } => Some(island_id),
            _ => None,
        }
    }

    /// Switch connection mode on or off.
    ///
    /// Any in-progress drag, resize or pending source is cancelled first.
    pub fn set_connection_mode(&mut self, model: &mut LayoutModel, enabled: bool) {
        self.cancel(model);
        self.connection_mode = enabled;
        tracing::debug!(enabled, "connection mode");
    }

    pub fn toggle_connection_mode(&mut self, model: &mut LayoutModel) {
        let enabled = !self.connection_mode;
        self.set_connection_mode(model, enabled);
    }

    /// Pointer pressed at a screen position; hit tests the model itself.
    pub fn pointer_down(
        &mut self,
        model: &mut LayoutModel,
        viewport: &ViewportState,
        pointer: Point,
    ) -> Vec<InteractionEvent> {
        let hit = hit_target(model, viewport, pointer).map(|(island, target)| (island.id.clone(), target));
        match hit {
            Some((id, target)) => self.pointer_down_on(model, viewport, pointer, &id, target),
            None => Vec::new(),
        }
    }

    /// Pointer pressed on a known island, for hosts that do their own hit testing.
    ///
    /// Ignored while a drag or resize is already in progress.
    pub fn pointer_down_on(
        &mut self,
        model: &mut LayoutModel,
        viewport: &ViewportState,
        pointer: Point,
        island_id: &str,
        target: PointerTarget,
    ) -> Vec<InteractionEvent> {
        let Some(island) = model.island(island_id) else {
            return Vec::new();
        };
        if self.active_island().is_some() {
            return Vec::new();
        }

        if self.connection_mode {
            return self.connection_pointer_down(island_id);
        }

        let (position, size) = (island.position, island.size);
        let (draggable, resizable) = (island.draggable, island.resizable);
        let events = vec![InteractionEvent::Selected {
            island_id: island_id.to_string(),
        }];
        self.selected = Some(island_id.to_string());
        model.bring_to_front(island_id);

        if target == PointerTarget::ResizeHandle && self.enable_resizing && resizable {
            tracing::debug!(id = island_id, "resize started");
            self.state = InteractionState::Resizing {
                island_id: island_id.to_string(),
                start_pointer: pointer,
                start_size: size,
                last_size: size,
            };
        } else if draggable {
            tracing::debug!(id = island_id, "drag started");
            self.state = InteractionState::Dragging {
                island_id: island_id.to_string(),
                pointer_offset: pointer - position * viewport.zoom,
                start_position: position,
                last_position: position,
            };
        }
        events
    }

    fn connection_pointer_down(&mut self, island_id: &str) -> Vec<InteractionEvent> {
        match &self.state {
            InteractionState::ConnectionPending { source_id } if source_id == island_id => Vec::new(),
            InteractionState::ConnectionPending { source_id } => {
                let from = source_id.clone();
                tracing::debug!(from = %from, to = island_id, "connection created");
                self.state = InteractionState::Idle;
                self.connection_mode = false;
                vec![InteractionEvent::ConnectionCreated {
                    from,
                    to: island_id.to_string(),
                }]
            }
            _ => {
                self.state = InteractionState::ConnectionPending {
                    source_id: island_id.to_string(),
                };
                Vec::new()
            }
        }
    }

    /// Pointer moved. Returns the index of the island that changed, if any.
    pub fn pointer_move(
        &mut self,
        model: &mut LayoutModel,
        viewport: &ViewportState,
        pointer: Point,
    ) -> Option<usize> {
        match &mut self.state {
            InteractionState::Dragging {
                island_id,
                pointer_offset,
                last_position,
                ..
            } => {
                let position = (pointer - *pointer_offset) / viewport.zoom;
                if !position.is_finite() {
                    return None;
                }
                let idx = model.index_of(island_id)?;
                model.islands_mut()[idx].position = position;
                *last_position = position;
                Some(idx)
            }
            InteractionState::Resizing {
                island_id,
                start_pointer,
                start_size,
                last_size,
            } => {
                let delta = (pointer - *start_pointer) / viewport.zoom;
                if !delta.is_finite() {
                    return None;
                }
                let size = Size::new(
                    (start_size.width + delta.x).max(MIN_ISLAND_SIZE.width),
                    (start_size.height + delta.y).max(MIN_ISLAND_SIZE.height),
                );
                let idx = model.index_of(island_id)?;
                model.islands_mut()[idx].size = size;
                *last_size = size;
                Some(idx)
            }
            _ => None,
        }
    }

    /// Pointer released. Completes a drag or resize; a pending connection stays pending.
    pub fn pointer_up(&mut self, model: &LayoutModel) -> Vec<InteractionEvent> {
        let event = match std::mem::take(&mut self.state) {
            InteractionState::Dragging {
                island_id,
                last_position,
                ..
            } if model.island(&island_id).is_some() => InteractionEvent::Moved {
                island_id,
                position: last_position,
            },
            InteractionState::Resizing {
                island_id, last_size, ..
            } if model.island(&island_id).is_some() => InteractionEvent::Resized {
                island_id,
                size: last_size,
            },
            pending @ InteractionState::ConnectionPending { .. } => {
                self.state = pending;
                return Vec::new();
            }
            _ => return Vec::new(),
        };
        tracing::debug!(?event, "interaction completed");
        vec![event]
    }

    /// Abort whatever is in progress without firing callbacks.
    ///
    /// A drag or resize puts the island back where it started.
    pub fn cancel(&mut self, model: &mut LayoutModel) {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging {
                island_id,
                start_position,
                ..
            } => {
                if let Some(island) = model.island_mut(&island_id) {
                    island.position = start_position;
                }
                tracing::debug!(id = %island_id, "drag cancelled");
            }
            InteractionState::Resizing {
                island_id, start_size, ..
            } => {
                if let Some(island) = model.island_mut(&island_id) {
                    island.size = start_size;
                }
                tracing::debug!(id = %island_id, "resize cancelled");
            }
            InteractionState::ConnectionPending { .. } | InteractionState::Idle => {}
        }
    }

    /// Drop references to islands that no longer exist after a model rebuild.
    pub fn retain_valid(&mut self, model: &LayoutModel) {
        let stale = match &self.state {
            InteractionState::Dragging { island_id, .. }
            | InteractionState::Resizing { island_id, .. }
            | InteractionState::ConnectionPending {
                source_id: island_id,
            } => model.island(island_id).is_none(),
            InteractionState::Idle => false,
        };
        if stale {
            self.state = InteractionState::Idle;
        }
        if self.selected.as_deref().is_some_and(|id| model.island(id).is_none()) {
            self.selected = None;
        }
    }
}
