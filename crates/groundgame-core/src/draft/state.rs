// Draft state snapshot: the authoritative view of a session as returned by
// `GET /draft/{session_id}/state`.
//
// The service's JSON is decoded into lenient `*Wire` structs first and then
// converted into the strict domain types. A finished live draft answers with
// a bare `{"status": "completed"}` body, so everything but `status` is
// optional on the wire.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::WireError;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Opaque identifier of a draft session, stable for the lifetime of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Status and on-clock team
// ---------------------------------------------------------------------------

/// Lifecycle status of a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// The team whose turn it is to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnClockTeam {
    /// A simulator-controlled team, identified by its 0-based index.
    Cpu { team_index: u32 },
    /// A human-controlled team: the user, or another manager in a live draft.
    Human { roster_id: Option<String> },
}

impl OnClockTeam {
    /// Label used by the turn banner ("CPU (Team 4)", "Team 7").
    pub fn label(&self) -> String {
        match self {
            OnClockTeam::Cpu { team_index } => format!("CPU (Team {})", team_index + 1),
            OnClockTeam::Human {
                roster_id: Some(id),
            } => format!("Team {id}"),
            OnClockTeam::Human { roster_id: None } => "Another team".to_string(),
        }
    }
}

/// Raw `on_clock_team` object. The service tags it with `type` = `cpu`,
/// `user` or `human` and fills either `team_index` or `roster_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct OnClockWire {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub team_index: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub roster_id: Option<String>,
}

impl TryFrom<OnClockWire> for OnClockTeam {
    type Error = WireError;

    fn try_from(wire: OnClockWire) -> Result<Self, Self::Error> {
        match wire.kind.to_ascii_lowercase().as_str() {
            // A "cpu" slot without a team index comes from a live draft where
            // the other managers are real people picking on another platform.
            "cpu" => match (wire.team_index, wire.roster_id) {
                (Some(team_index), _) => Ok(OnClockTeam::Cpu { team_index }),
                (None, Some(roster_id)) => Ok(OnClockTeam::Human {
                    roster_id: Some(roster_id),
                }),
                (None, None) => Err(WireError::InvalidOnClock(
                    "cpu team without team_index or roster_id".into(),
                )),
            },
            "human" | "user" => Ok(OnClockTeam::Human {
                roster_id: wire.roster_id,
            }),
            other => Err(WireError::InvalidOnClock(format!(
                "unknown on-clock type `{other}`"
            ))),
        }
    }
}

/// Accept roster identifiers encoded either as JSON strings or numbers.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        RawId::Float(f) => f.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// An available player with the service-computed valuation metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWithMetrics {
    /// Unique key within one snapshot's `available_players`.
    pub normalized_name: String,
    pub display_name: String,
    pub pos: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(rename = "ADP", default)]
    pub adp: Option<f64>,
    #[serde(rename = "VORP", default)]
    pub vorp: Option<f64>,
    #[serde(rename = "VONA", default)]
    pub vona: Option<f64>,
}

/// Format a metric with one decimal, or `N/A` when it has not been computed.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

/// Raw state body as sent by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftStateWire {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub current_pick_num: Option<u32>,
    #[serde(default)]
    pub total_picks: Option<u32>,
    pub status: SessionStatus,
    #[serde(default)]
    pub is_user_turn: bool,
    #[serde(default)]
    pub on_clock_team: Option<OnClockWire>,
    #[serde(default)]
    pub available_players: Vec<PlayerWithMetrics>,
    #[serde(default)]
    pub drafted_players_count: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One immutable snapshot of a draft session.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    pub session_id: SessionId,
    /// 1-based; `total_picks + 1` once every pick has been made.
    pub current_pick_num: u32,
    pub total_picks: u32,
    pub status: SessionStatus,
    /// Decided by the service. Never recomputed locally.
    pub is_user_turn: bool,
    /// `None` only for completed snapshots.
    pub on_clock_team: Option<OnClockTeam>,
    /// Ordered by the sort key of the request that produced the snapshot.
    pub available_players: Vec<PlayerWithMetrics>,
    pub drafted_players_count: u32,
}

impl DraftState {
    /// Convert a wire body into a snapshot for `session_id`.
    ///
    /// The identifier held by the client wins over whatever the body echoes.
    pub fn from_wire(session_id: &SessionId, wire: DraftStateWire) -> Result<Self, WireError> {
        match wire.status {
            SessionStatus::InProgress => {
                let current_pick_num = wire
                    .current_pick_num
                    .ok_or(WireError::MissingField("current_pick_num"))?;
                let total_picks = wire
                    .total_picks
                    .ok_or(WireError::MissingField("total_picks"))?;
                let on_clock = wire
                    .on_clock_team
                    .ok_or(WireError::MissingField("on_clock_team"))?;
                if current_pick_num == 0 {
                    return Err(WireError::OutOfRange {
                        field: "current_pick_num",
                        message: "pick numbers are 1-based".into(),
                    });
                }
                if current_pick_num > total_picks + 1 {
                    return Err(WireError::OutOfRange {
                        field: "current_pick_num",
                        message: format!("{current_pick_num} exceeds {} total picks", total_picks),
                    });
                }

                Ok(DraftState {
                    session_id: session_id.clone(),
                    current_pick_num,
                    total_picks,
                    status: SessionStatus::InProgress,
                    is_user_turn: wire.is_user_turn,
                    on_clock_team: Some(OnClockTeam::try_from(on_clock)?),
                    available_players: wire.available_players,
                    drafted_players_count: wire.drafted_players_count.unwrap_or(0),
                })
            }
            SessionStatus::Completed => {
                let total_picks = wire.total_picks.unwrap_or(0);
                let on_clock_team = match wire.on_clock_team {
                    Some(raw) => OnClockTeam::try_from(raw).ok(),
                    None => None,
                };
                Ok(DraftState {
                    session_id: session_id.clone(),
                    current_pick_num: wire.current_pick_num.unwrap_or(total_picks + 1),
                    total_picks,
                    status: SessionStatus::Completed,
                    is_user_turn: wire.is_user_turn,
                    on_clock_team,
                    available_players: wire.available_players,
                    drafted_players_count: wire.drafted_players_count.unwrap_or(0),
                })
            }
        }
    }

    /// Whether the draft is over: either flagged by the service or every
    /// pick has been made.
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
            || (self.total_picks > 0 && self.current_pick_num > self.total_picks)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
