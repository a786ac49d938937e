// Request parameters for the state endpoint: position filter and sort key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position filter for the available-player pool.
///
/// `Flex` is resolved by the service to RB/WR/TE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionFilter {
    #[default]
    All,
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
    K,
    Def,
}

impl PositionFilter {
    /// Cycle order used by the filter selector.
    pub const CYCLE: [PositionFilter; 8] = [
        PositionFilter::All,
        PositionFilter::Qb,
        PositionFilter::Rb,
        PositionFilter::Wr,
        PositionFilter::Te,
        PositionFilter::Flex,
        PositionFilter::K,
        PositionFilter::Def,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionFilter::All => "ALL",
            PositionFilter::Qb => "QB",
            PositionFilter::Rb => "RB",
            PositionFilter::Wr => "WR",
            PositionFilter::Te => "TE",
            PositionFilter::Flex => "FLEX",
            PositionFilter::K => "K",
            PositionFilter::Def => "DEF",
        }
    }

    /// The next filter in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = PositionFilter::CYCLE.iter().position(|f| *f == self).unwrap_or(0);
        PositionFilter::CYCLE[(idx + 1) % PositionFilter::CYCLE.len()]
    }

    /// The previous filter in selector order, wrapping around.
    pub fn prev(self) -> Self {
        let len = PositionFilter::CYCLE.len();
        let idx = PositionFilter::CYCLE.iter().position(|f| *f == self).unwrap_or(0);
        PositionFilter::CYCLE[(idx + len - 1) % len]
    }
}

impl fmt::Display for PositionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric the service sorts the available pool by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "ADP")]
    Adp,
    #[serde(rename = "VORP")]
    Vorp,
    #[serde(rename = "VONA")]
    Vona,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Adp => "ADP",
            SortKey::Vorp => "VORP",
            SortKey::Vona => "VONA",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::Adp => SortKey::Vorp,
            SortKey::Vorp => SortKey::Vona,
            SortKey::Vona => SortKey::Adp,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one state request. `position_filter` is `None` for "ALL",
/// which is omitted from the outgoing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestParams {
    pub position_filter: Option<PositionFilter>,
    pub sort_by: SortKey,
}

impl RequestParams {
    /// Query-string pairs for `GET /draft/{id}/state`.
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(filter) = self.position_filter {
            pairs.push(("position_filter", filter.as_str()));
        }
        pairs.push(("sort_by", self.sort_by.as_str()));
        pairs
    }

    /// The filter as chosen in the selector (`All` when absent).
    pub fn effective_filter(&self) -> PositionFilter {
        self.position_filter.unwrap_or(PositionFilter::All)
    }
}

impl fmt::Display for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.effective_filter(), self.sort_by)
    }
}
