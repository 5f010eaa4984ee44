//! Dialog system for overlays
//!
//! Overlays (modals, menus, popovers) can nest arbitrarily. A single shared
//! [`DialogStack`] decides which of them is active, and each overlay talks to
//! it through its own [`DialogCoordinator`]. Closing requests from Escape or an
//! outside click are only honoured for the active overlay, so a nested menu
//! never closes the modal underneath it by accident.

pub mod coordinator;
pub mod overlays;
pub mod stack;
pub mod types;

pub use coordinator::DialogCoordinator;
pub use overlays::{ConfirmDialog, HelpOverlay, MenuOutcome, Overlay, RowAction, RowActionsMenu};
pub use stack::{DialogStack, DialogStackHandle};
pub use types::{DialogId, GroupName};
