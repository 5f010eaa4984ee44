//! Dialog stack shared by every overlay in the application
//!
//! The stack records which overlays are open and in what order:
//! - Insertion order is z-order, the last element is the active overlay
//! - Named groups record which open overlays belong to a mutual-exclusion domain
//! - Only the active overlay, or the latest member of its group, may close
//!
//! Every id recorded in a group is also present in the stack. Both are
//! updated together by each operation.

use super::types::{DialogId, GroupName};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Ordered stack of open dialogs plus their group membership
#[derive(Debug, Default)]
pub struct DialogStack {
    /// Open dialogs (last = topmost)
    stack: Vec<DialogId>,

    /// Open dialogs per group, in the order they were recorded
    groups: HashMap<GroupName, Vec<DialogId>>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a dialog, closing any other open member of its group first
    pub fn open(&mut self, id: &DialogId, group: Option<&GroupName>) {
        if let Some(group) = group {
            let siblings: Vec<DialogId> = self
                .groups
                .get(group)
                .map(|members| members.iter().filter(|m| *m != id).cloned().collect())
                .unwrap_or_default();

            for sibling in siblings {
                debug!(dialog = %sibling, group = %group, "Closing group sibling");
                self.release(&sibling);
            }
        }

        let mut changed = false;
        if !self.stack.contains(id) {
            self.stack.push(id.clone());
            changed = true;
        }

        if let Some(group) = group {
            let members = self.groups.entry(group.clone()).or_default();
            if !members.contains(id) {
                members.push(id.clone());
                changed = true;
            }
        }

        if changed {
            debug!(dialog = %id, depth = self.stack.len(), "Dialog opened");
        } else {
            trace!(dialog = %id, "Dialog already open");
        }
    }

    /// Close a dialog if it is allowed to close right now
    ///
    /// Returns `false` without touching the stack when another dialog is
    /// active above it, or when the id is not open at all.
    pub fn request_close(&mut self, id: &DialogId, group: Option<&GroupName>) -> bool {
        if !self.stack.contains(id) {
            trace!(dialog = %id, "Close requested for a dialog that is not open");
            return false;
        }

        let is_top = self.stack.last() == Some(id);
        let is_group_top = group
            .map(|group| self.group_members(group).last() == Some(id))
            .unwrap_or(false);

        if !is_top && !is_group_top {
            debug!(dialog = %id, top = ?self.top(), "Close rejected, dialog is not active");
            return false;
        }

        self.release(id)
    }

    /// Remove a dialog from the stack and every group unconditionally
    pub fn release(&mut self, id: &DialogId) -> bool {
        let before = self.stack.len();
        self.stack.retain(|entry| entry != id);
        let mut removed = self.stack.len() != before;

        self.groups.retain(|_, members| {
            let len = members.len();
            members.retain(|entry| entry != id);
            removed |= members.len() != len;
            !members.is_empty()
        });

        if removed {
            debug!(dialog = %id, depth = self.stack.len(), "Dialog closed");
        }
        removed
    }

    /// Whether the dialog is the active one (vacuously true on an empty stack)
    pub fn is_top_of_stack(&self, id: &DialogId) -> bool {
        match self.stack.last() {
            Some(top) => top == id,
            None => true,
        }
    }

    pub fn top(&self) -> Option<&DialogId> {
        self.stack.last()
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.stack.contains(id)
    }

    /// Stack position counted from the bottom
    pub fn position(&self, id: &DialogId) -> Option<usize> {
        self.stack.iter().position(|entry| entry == id)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Open dialogs from bottom to top
    pub fn ids(&self) -> &[DialogId] {
        &self.stack
    }

    pub fn group_members(&self, group: &GroupName) -> &[DialogId] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Shared handle to a dialog stack
///
/// Constructed once by the application and passed to every coordinator.
#[derive(Debug, Clone, Default)]
pub struct DialogStackHandle {
    inner: Arc<RwLock<DialogStack>>,
}

impl DialogStackHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DialogStack> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DialogStack> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn open(&self, id: &DialogId, group: Option<&GroupName>) {
        self.write().open(id, group);
    }

    pub fn request_close(&self, id: &DialogId, group: Option<&GroupName>) -> bool {
        self.write().request_close(id, group)
    }

    pub fn release(&self, id: &DialogId) -> bool {
        self.write().release(id)
    }

    pub fn is_top_of_stack(&self, id: &DialogId) -> bool {
        self.read().is_top_of_stack(id)
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.read().contains(id)
    }

    pub fn has_dialogs(&self) -> bool {
        !self.read().is_empty()
    }

    pub fn top(&self) -> Option<DialogId> {
        self.read().top().cloned()
    }

    pub fn position(&self, id: &DialogId) -> Option<usize> {
        self.read().position(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (DialogId, DialogId, DialogId) {
        (DialogId::new("a"), DialogId::new("b"), DialogId::new("c"))
    }

    #[test]
    fn test_lifo_top_of_stack() {
        let (a, b, c) = ids();
        let mut stack = DialogStack::new();
        stack.open(&a, None);
        stack.open(&b, None);
        stack.open(&c, None);

        assert!(stack.is_top_of_stack(&c));
        assert!(!stack.is_top_of_stack(&a));
        assert!(!stack.is_top_of_stack(&b));

        assert!(stack.request_close(&c, None));
        assert!(stack.is_top_of_stack(&b));
    }

    #[test]
    fn test_empty_stack_is_vacuously_top() {
        let stack = DialogStack::new();
        assert!(stack.is_top_of_stack(&DialogId::new("anything")));
    }

    #[test]
    fn test_group_exclusivity() {
        let (a, b, _) = ids();
        let group = GroupName::new("G");
        let mut stack = DialogStack::new();

        stack.open(&a, Some(&group));
        stack.open(&b, Some(&group));

        assert!(!stack.contains(&a));
        assert_eq!(stack.group_members(&group), &[b.clone()]);
        assert_eq!(stack.ids(), &[b]);
    }

    #[test]
    fn test_group_exclusivity_keeps_other_dialogs() {
        let (a, b, c) = ids();
        let group = GroupName::row_actions();
        let mut stack = DialogStack::new();

        stack.open(&a, None);
        stack.open(&b, Some(&group));
        stack.open(&c, Some(&group));

        assert_eq!(stack.ids(), &[a, c]);
    }

    #[test]
    fn test_illegal_close_rejected() {
        let (a, b, _) = ids();
        let mut stack = DialogStack::new();
        stack.open(&a, None);
        stack.open(&b, None);

        assert!(!stack.request_close(&a, None));
        assert_eq!(stack.ids(), &[a, b]);
    }

    #[test]
    fn test_legal_close_succeeds() {
        let (a, b, _) = ids();
        let mut stack = DialogStack::new();
        stack.open(&a, None);
        stack.open(&b, None);

        assert!(stack.request_close(&b, None));
        assert_eq!(stack.ids(), &[a]);
    }

    #[test]
    fn test_close_unknown_is_noop() {
        let mut stack = DialogStack::new();
        assert!(!stack.request_close(&DialogId::new("x"), None));
        assert!(!stack.request_close(&DialogId::new("x"), Some(&GroupName::new("G"))));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_group_member_may_close_below_top() {
        let (a, b, _) = ids();
        let group = GroupName::row_actions();
        let mut stack = DialogStack::new();
        stack.open(&a, Some(&group));
        stack.open(&b, None);

        // Not globally topmost, but latest in its group
        assert!(stack.request_close(&a, Some(&group)));
        assert_eq!(stack.ids(), &[b]);
        assert!(stack.group_members(&group).is_empty());

        // Without naming the group the same request would be rejected
        let mut stack = DialogStack::new();
        stack.open(&a, Some(&group));
        stack.open(&DialogId::new("b"), None);
        assert!(!stack.request_close(&a, None));
    }

    #[test]
    fn test_group_rule_requires_membership() {
        let (a, b, _) = ids();
        let group = GroupName::row_actions();
        let mut stack = DialogStack::new();
        stack.open(&a, None);
        stack.open(&b, None);

        assert!(!stack.request_close(&a, Some(&group)));
        assert!(stack.contains(&a));
    }

    #[test]
    fn test_open_is_idempotent() {
        let (a, b, _) = ids();
        let mut stack = DialogStack::new();
        stack.open(&a, None);
        stack.open(&b, None);

        stack.open(&a, None);
        stack.open(&b, None);

        assert_eq!(stack.ids(), &[a, b]);
    }

    #[test]
    fn test_release_removes_from_groups() {
        let (a, _, _) = ids();
        let group = GroupName::new("G");
        let mut stack = DialogStack::new();
        stack.open(&a, Some(&group));

        assert!(stack.release(&a));
        assert!(!stack.release(&a));
        assert!(stack.is_empty());
        assert!(stack.group_members(&group).is_empty());
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = DialogStackHandle::new();
        let other = handle.clone();
        let id = DialogId::new("shared");

        handle.open(&id, None);
        assert!(other.contains(&id));
        assert_eq!(other.top(), Some(id.clone()));
        assert!(other.request_close(&id, None));
        assert!(!handle.has_dialogs());
    }
}
