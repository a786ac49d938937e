// Session start configurations submitted by the two entry forms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Scoring format of a simulated league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringFormat {
    #[default]
    #[serde(rename = "STD")]
    Std,
    #[serde(rename = "HALF_PPR")]
    HalfPpr,
    #[serde(rename = "PPR")]
    Ppr,
}

impl ScoringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringFormat::Std => "STD",
            ScoringFormat::HalfPpr => "HALF_PPR",
            ScoringFormat::Ppr => "PPR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoringFormat::Std => "Standard",
            ScoringFormat::HalfPpr => "Half-PPR",
            ScoringFormat::Ppr => "PPR",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ScoringFormat::Std => ScoringFormat::HalfPpr,
            ScoringFormat::HalfPpr => ScoringFormat::Ppr,
            ScoringFormat::Ppr => ScoringFormat::Std,
        }
    }
}

/// Pick order across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftOrder {
    #[default]
    Snake,
    Normal,
}

impl DraftOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftOrder::Snake => "snake",
            DraftOrder::Normal => "normal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftOrder::Snake => "Snake",
            DraftOrder::Normal => "Normal",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DraftOrder::Snake => DraftOrder::Normal,
            DraftOrder::Normal => DraftOrder::Snake,
        }
    }
}

/// Configuration for starting a new draft session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartConfig {
    /// Mock draft against simulator-controlled teams.
    Simulation {
        pick_slot: u32,
        teams: u32,
        rounds: u32,
        format: ScoringFormat,
        order: DraftOrder,
    },
    /// Assistant for a draft running on an external platform.
    LiveHelper {
        pick_slot: u32,
        external_draft_id: String,
    },
}

/// Body of `POST /draft/simulation/start`.
#[derive(Debug, Serialize)]
pub(crate) struct SimulationStartBody {
    pub pick_slot: u32,
    pub teams: u32,
    pub rounds: u32,
    pub format: ScoringFormat,
    pub order: DraftOrder,
}

/// Body of `POST /draft/helper/start`.
#[derive(Debug, Serialize)]
pub(crate) struct HelperStartBody<'a> {
    pub pick_slot: u32,
    pub draft_id: &'a str,
}

impl StartConfig {
    pub fn pick_slot(&self) -> u32 {
        match self {
            StartConfig::Simulation { pick_slot, .. } | StartConfig::LiveHelper { pick_slot, .. } => {
                *pick_slot
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, StartConfig::LiveHelper { .. })
    }

    /// Check the configuration before it is sent.
    ///
    /// Mirrors the service's own checks so an obviously bad form never
    /// leaves the client. The service stays authoritative: a config that
    /// passes here can still be rejected remotely.
    pub fn validate(&self) -> Result<(), ServiceError> {
        match self {
            StartConfig::Simulation {
                pick_slot,
                teams,
                rounds,
                ..
            } => {
                if *teams < 2 {
                    return Err(ServiceError::validation("teams", "must be at least 2"));
                }
                if *rounds == 0 {
                    return Err(ServiceError::validation("rounds", "must be at least 1"));
                }
                if *pick_slot == 0 || pick_slot > teams {
                    return Err(ServiceError::validation(
                        "pick_slot",
                        format!("must be between 1 and {teams}"),
                    ));
                }
                Ok(())
            }
            StartConfig::LiveHelper {
                pick_slot,
                external_draft_id,
            } => {
                if *pick_slot == 0 {
                    return Err(ServiceError::validation("pick_slot", "must be at least 1"));
                }
                if external_draft_id.trim().is_empty() {
                    return Err(ServiceError::validation("draft_id", "must not be empty"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for StartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartConfig::Simulation {
                pick_slot,
                teams,
                rounds,
                format,
                order,
            } => write!(
                f,
                "simulation: slot {pick_slot} of {teams} teams, {rounds} rounds, {}, {}",
                format.as_str(),
                order.as_str()
            ),
            StartConfig::LiveHelper {
                pick_slot,
                external_draft_id,
            } => write!(f, "live helper: draft {external_draft_id}, slot {pick_slot}"),
        }
    }
}
