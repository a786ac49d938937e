// Acknowledgement bodies returned by the mutating endpoints.

use serde::Deserialize;

use super::state::de_opt_id;

/// Optional acknowledgement of a pick or CPU simulation.
///
/// The service may answer with an empty body; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PickReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub new_pick_num: Option<u32>,
}

impl PickReceipt {
    /// Parse a response body, treating an empty or non-JSON body as an
    /// empty receipt.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return PickReceipt::default();
        }
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Short human-readable summary, if the service sent enough to build one.
    pub fn summary(&self) -> Option<String> {
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        match (&self.player_name, &self.position) {
            (Some(name), Some(pos)) => Some(format!("Drafted {name} ({pos})")),
            (Some(name), None) => Some(format!("Drafted {name}")),
            _ => None,
        }
    }
}

/// One pick ingested from an external live draft.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LivePick {
    pub pick_number: u32,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub roster_id: Option<String>,
    pub player_name: String,
    #[serde(default)]
    pub position: Option<String>,
}

/// Body of `GET /draft/{id}/poll-live`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LivePollResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_picks: Vec<LivePick>,
}
