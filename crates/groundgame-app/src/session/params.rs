// Query parameter reconciliation: selector values -> request parameters.

use groundgame_core::draft::{PositionFilter, RequestParams, SortKey};

/// Map selector values onto outgoing request parameters.
///
/// `All` is expressed by omitting the filter.
pub fn reconcile(filter: PositionFilter, sort: SortKey) -> RequestParams {
    RequestParams {
        position_filter: match filter {
            PositionFilter::All => None,
            other => Some(other),
        },
        sort_by: sort,
    }
}

/// The user's current filter/sort preferences.
///
/// Setters are edge-triggered: they return the new parameters only when the
/// value actually changed, which is the caller's cue to refetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryReconciler {
    filter: PositionFilter,
    sort: SortKey,
}

impl QueryReconciler {
    /// Parameters for the next state request.
    pub fn params(&self) -> RequestParams {
        reconcile(self.filter, self.sort)
    }

    pub fn set_filter(&mut self, filter: PositionFilter) -> Option<RequestParams> {
        if filter == self.filter {
            return None;
        }
        self.filter = filter;
        Some(self.params())
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Option<RequestParams> {
        if sort == self.sort {
            return None;
        }
        self.sort = sort;
        Some(self.params())
    }
}
