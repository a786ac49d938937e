// HTTP implementation of the draft service over reqwest.
//
// Error normalization happens here: transport failures become `Network`,
// non-success statuses are mapped per endpoint, and the FastAPI-style
// `{"detail": ...}` body is unwrapped into a readable message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::DraftService;
use crate::config::ServiceConfig;
use crate::draft::start::{HelperStartBody, SimulationStartBody};
use crate::draft::state::DraftStateWire;
use crate::draft::{
    DraftState, LivePollResult, PickReceipt, RequestParams, SessionId, StartConfig,
};
use crate::error::{InvalidPickReason, ServiceError};

/// Longest error body echoed back into a message.
const MAX_DETAIL_LEN: usize = 200;

// ---------------------------------------------------------------------------
// HttpDraftService
// ---------------------------------------------------------------------------

/// Draft service client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDraftService {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    #[serde(default)]
    session_id: Option<String>,
}

impl HttpDraftService {
    /// Create a client for the service rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build a client from the `[service]` config section.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ServiceError::from)?;
        Self::with_client(&config.base_url, http)
    }

    fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::validation("base_url", e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::validation(
                "base_url",
                "must be an http(s) URL",
            ));
        }
        Ok(HttpDraftService { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), ServiceError> {
        let response = request.send().await.map_err(|e| ServiceError::Network {
            message: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ServiceError::Network {
            message: e.to_string(),
        })?;
        Ok((status, body))
    }
}

#[async_trait]
impl DraftService for HttpDraftService {
    #[instrument(skip_all, fields(session = %session_id, params = %params))]
    async fn fetch_state(
        &self,
        session_id: &SessionId,
        params: &RequestParams,
    ) -> Result<DraftState, ServiceError> {
        let url = self.endpoint(&["draft", session_id.as_str(), "state"]);
        let (status, body) = self
            .send(self.http.get(url).query(&params.query_pairs()))
            .await?;

        if !status.is_success() {
            warn!(%status, "state fetch failed");
            return Err(service_error(status, &body));
        }

        let wire: DraftStateWire = serde_json::from_str(&body).map_err(|e| ServiceError::Service {
            status: status.as_u16(),
            message: format!("malformed draft state: {e}"),
        })?;
        let state = DraftState::from_wire(session_id, wire).map_err(|e| ServiceError::Service {
            status: status.as_u16(),
            message: format!("invalid draft state: {e}"),
        })?;
        debug!(
            pick = state.current_pick_num,
            total = state.total_picks,
            players = state.available_players.len(),
            "state fetched"
        );
        Ok(state)
    }

    #[instrument(skip_all, fields(session = %session_id, player = %player_name))]
    async fn submit_pick(
        &self,
        session_id: &SessionId,
        player_name: &str,
    ) -> Result<PickReceipt, ServiceError> {
        let url = self.endpoint(&["draft", session_id.as_str(), "pick"]);
        let body = serde_json::json!({ "player_name": player_name });
        let (status, text) = self.send(self.http.post(url).json(&body)).await?;

        if status.is_success() {
            let receipt = PickReceipt::from_body(&text);
            info!("pick accepted");
            return Ok(receipt);
        }

        let detail = extract_detail(&text).unwrap_or_else(|| status_text(status));
        if status.is_client_error() && !is_missing_session(&detail) {
            warn!(%detail, "pick rejected");
            return Err(ServiceError::InvalidPick {
                player_name: player_name.to_string(),
                reason: InvalidPickReason::classify(&detail),
                message: detail,
            });
        }
        warn!(%status, %detail, "pick submission failed");
        Err(ServiceError::Service {
            status: status.as_u16(),
            message: detail,
        })
    }

    #[instrument(skip_all, fields(session = %session_id))]
    async fn simulate_cpu_pick(&self, session_id: &SessionId) -> Result<PickReceipt, ServiceError> {
        let url = self.endpoint(&["draft", session_id.as_str(), "simulate-pick"]);
        let (status, text) = self.send(self.http.post(url)).await?;

        if !status.is_success() {
            warn!(%status, "cpu simulation failed");
            return Err(service_error(status, &text));
        }
        let receipt = PickReceipt::from_body(&text);
        if let Some(summary) = receipt.summary() {
            info!("{}", summary);
        }
        Ok(receipt)
    }

    #[instrument(skip_all, fields(config = %config))]
    async fn start_session(&self, config: &StartConfig) -> Result<SessionId, ServiceError> {
        config.validate()?;

        let request = match config {
            StartConfig::Simulation {
                pick_slot,
                teams,
                rounds,
                format,
                order,
            } => self
                .http
                .post(self.endpoint(&["draft", "simulation", "start"]))
                .json(&SimulationStartBody {
                    pick_slot: *pick_slot,
                    teams: *teams,
                    rounds: *rounds,
                    format: *format,
                    order: *order,
                }),
            StartConfig::LiveHelper {
                pick_slot,
                external_draft_id,
            } => self
                .http
                .post(self.endpoint(&["draft", "helper", "start"]))
                .json(&HelperStartBody {
                    pick_slot: *pick_slot,
                    draft_id: external_draft_id.trim(),
                }),
        };

        let (status, text) = self.send(request).await?;
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let detail = extract_detail(&text).unwrap_or_else(|| status_text(status));
            warn!(%detail, "start configuration rejected");
            return Err(ServiceError::validation("config", detail));
        }
        if !status.is_success() {
            warn!(%status, "session start failed");
            return Err(service_error(status, &text));
        }

        let parsed: StartResponse = serde_json::from_str(&text).map_err(|e| ServiceError::Service {
            status: status.as_u16(),
            message: format!("malformed start response: {e}"),
        })?;
        match parsed.session_id {
            Some(id) if !id.trim().is_empty() => {
                info!(session = %id, "session started");
                Ok(SessionId::new(id))
            }
            _ => Err(ServiceError::Service {
                status: status.as_u16(),
                message: "start response did not include a session_id".into(),
            }),
        }
    }

    #[instrument(skip_all, fields(session = %session_id))]
    async fn poll_live(&self, session_id: &SessionId) -> Result<LivePollResult, ServiceError> {
        let url = self.endpoint(&["draft", session_id.as_str(), "poll-live"]);
        let (status, text) = self.send(self.http.get(url)).await?;

        if !status.is_success() {
            warn!(%status, "live poll failed");
            return Err(service_error(status, &text));
        }
        let result: LivePollResult = serde_json::from_str(&text).map_err(|e| ServiceError::Service {
            status: status.as_u16(),
            message: format!("malformed poll response: {e}"),
        })?;
        if !result.new_picks.is_empty() {
            info!(count = result.new_picks.len(), "ingested live picks");
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Error body helpers
// ---------------------------------------------------------------------------

fn service_error(status: StatusCode, body: &str) -> ServiceError {
    ServiceError::Service {
        status: status.as_u16(),
        message: extract_detail(body).unwrap_or_else(|| status_text(status)),
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

fn is_missing_session(detail: &str) -> bool {
    detail.to_lowercase().contains("session not found")
}

/// Pull a readable message out of an error body.
///
/// Understands `{"detail": "..."}`, FastAPI validation lists
/// (`{"detail": [{"msg": "..."}]}`), `{"error": "..."}` and
/// `{"message": "..."}`; otherwise falls back to the raw text.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        for key in ["detail", "error", "message"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Array(items)) => {
                    let messages: Vec<&str> = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(Value::as_str))
                        .collect();
                    if !messages.is_empty() {
                        return Some(messages.join("; "));
                    }
                }
                _ => {}
            }
        }
    }

    Some(trimmed.chars().take(MAX_DETAIL_LEN).collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Draft session not found."}"#).as_deref(),
            Some("Draft session not found.")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "pick_slot"], "msg": "field required"},
                                  {"loc": ["body", "teams"], "msg": "value is not a valid integer"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; value is not a valid integer")
        );
    }

    #[test]
    fn error_key_and_plain_text() {
        assert_eq!(
            extract_detail(r#"{"error": "Big board could not be created."}"#).as_deref(),
            Some("Big board could not be created.")
        );
        assert_eq!(
            extract_detail("Internal Server Error").as_deref(),
            Some("Internal Server Error")
        );
        assert_eq!(extract_detail("   "), None);
    }

    #[test]
    fn long_plain_bodies_are_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(extract_detail(&body).map(|s| s.len()), Some(MAX_DETAIL_LEN));
    }

    #[test]
    fn endpoint_encodes_segments_and_keeps_base_path() {
        let svc = HttpDraftService::new("http://localhost:8000/api/").unwrap();
        let url = svc.endpoint(&["draft", "a b", "state"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/draft/a%20b/state");

        let svc = HttpDraftService::new("http://localhost:8000").unwrap();
        let url = svc.endpoint(&["draft", "xyz", "pick"]);
        assert_eq!(url.as_str(), "http://localhost:8000/draft/xyz/pick");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(HttpDraftService::new("not a url").is_err());
        assert!(HttpDraftService::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn missing_session_detection() {
        assert!(is_missing_session("Draft session not found."));
        assert!(!is_missing_session("Player not found or already drafted."));
    }
}
