// Remote draft service boundary.
//
// The service owns all draft logic. The client only fetches snapshots and
// posts mutations; every operation either returns data or an error and
// never touches local state.

pub mod http;

use async_trait::async_trait;

use crate::draft::{DraftState, LivePollResult, PickReceipt, RequestParams, SessionId, StartConfig};
use crate::error::ServiceError;

pub use http::HttpDraftService;

/// Typed operations of the remote draft service.
///
/// None of the operations retry; retry is a user decision.
#[async_trait]
pub trait DraftService: Send + Sync {
    /// Fetch the current snapshot, shaped by `params`.
    async fn fetch_state(
        &self,
        session_id: &SessionId,
        params: &RequestParams,
    ) -> Result<DraftState, ServiceError>;

    /// Submit the user's pick by player name.
    async fn submit_pick(
        &self,
        session_id: &SessionId,
        player_name: &str,
    ) -> Result<PickReceipt, ServiceError>;

    /// Ask the service to make the pick for the CPU team on the clock.
    async fn simulate_cpu_pick(&self, session_id: &SessionId) -> Result<PickReceipt, ServiceError>;

    /// Start a new session and return its identifier.
    async fn start_session(&self, config: &StartConfig) -> Result<SessionId, ServiceError>;

    /// Have the service ingest picks made on the external platform of a
    /// live-helper session.
    async fn poll_live(&self, session_id: &SessionId) -> Result<LivePollResult, ServiceError>;
}
