//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;

/// Tracks engine callback invocations for testing.
///
/// Each field records calls to the corresponding callback with their arguments.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (island_id, x, y)
    pub island_moved: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// (island_id, width, height)
    pub island_resized: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// island_id
    pub island_selected: Rc<RefCell<Vec<String>>>,
    /// (from, to)
    pub connection_created: Rc<RefCell<Vec<(String, String)>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.island_moved.borrow_mut().clear();
        self.island_resized.borrow_mut().clear();
        self.island_selected.borrow_mut().clear();
        self.connection_created.borrow_mut().clear();
    }

    /// Total number of callbacks of any kind.
    pub fn total(&self) -> usize {
        self.island_moved.borrow().len()
            + self.island_resized.borrow().len()
            + self.island_selected.borrow().len()
            + self.connection_created.borrow().len()
    }
}
