//! Per-overlay registration against the shared dialog stack
//!
//! Every modal, menu or popover owns one coordinator. The coordinator holds
//! the overlay's stable id and optional group, and is the only way overlays
//! open or close themselves. Dropping it releases the id, so an overlay that
//! goes away without closing cannot leave a stale entry behind.

use super::stack::DialogStackHandle;
use super::types::{DialogId, GroupName};
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug)]
pub struct DialogCoordinator {
    id: DialogId,
    group: Option<GroupName>,
    stack: DialogStackHandle,
}

impl DialogCoordinator {
    /// Register an ungrouped overlay
    pub fn new(stack: DialogStackHandle) -> Self {
        Self {
            id: DialogId::generate(),
            group: None,
            stack,
        }
    }

    /// Register an overlay inside a mutual-exclusion group
    pub fn grouped(stack: DialogStackHandle, group: GroupName) -> Self {
        Self {
            id: DialogId::generate(),
            group: Some(group),
            stack,
        }
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn open(&self) {
        self.stack.open(&self.id, self.group.as_ref());
    }

    /// Close if this overlay is currently allowed to close
    pub fn request_close(&self) -> bool {
        self.stack.request_close(&self.id, self.group.as_ref())
    }

    /// Open when closed, request close when open. Returns the resulting state.
    pub fn toggle(&self) -> bool {
        if self.is_open() {
            !self.request_close()
        } else {
            self.open();
            true
        }
    }

    pub fn is_open(&self) -> bool {
        self.stack.contains(&self.id)
    }

    pub fn is_top(&self) -> bool {
        self.is_open() && self.stack.is_top_of_stack(&self.id)
    }

    /// Route an Escape press. Returns true only if the overlay closed.
    pub fn handle_escape(&self, event: &KeyEvent) -> bool {
        if event.code != KeyCode::Esc || !event.modifiers.is_empty() {
            return false;
        }
        self.request_close()
    }
}

impl Drop for DialogCoordinator {
    fn drop(&mut self) {
        self.stack.release(&self.id);
    }
}
