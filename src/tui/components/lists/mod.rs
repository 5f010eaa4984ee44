//! List components with incremental loading.
//!
//! This module provides the roving-focus list used by the dashboard pages,
//! together with the bookkeeping types that tie asynchronous page fetches
//! back to the list that requested them.

pub mod paginated;

pub use paginated::*;

/// Handle for one in-flight page request
///
/// Returned by [`PaginatedFocusList::begin_load_more`] and handed back with
/// the fetched page. A ticket from an older list generation is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub offset: usize,
    pub limit: usize,
}
