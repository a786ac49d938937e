// Draft data model as issued by the remote draft service.

pub mod query;
pub mod receipt;
pub mod start;
pub mod state;

pub use query::{PositionFilter, RequestParams, SortKey};
pub use receipt::{LivePick, LivePollResult, PickReceipt};
pub use start::{DraftOrder, ScoringFormat, StartConfig};
pub use state::{DraftState, OnClockTeam, PlayerWithMetrics, SessionId, SessionStatus};
