// Error taxonomy for the remote draft service boundary.

use thiserror::Error;

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Why the service refused a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPickReason {
    /// The player exists but has already been taken.
    AlreadyDrafted,
    /// The name did not match any player.
    Unrecognized,
    /// The service did not say which of the two it was.
    Unspecified,
}

impl InvalidPickReason {
    /// Classify the service's rejection text.
    pub fn classify(detail: &str) -> Self {
        let lower = detail.to_lowercase();
        let drafted = lower.contains("already drafted") || lower.contains("unavailable");
        let unknown = lower.contains("not found") || lower.contains("unrecognized");
        match (drafted, unknown) {
            (true, false) => InvalidPickReason::AlreadyDrafted,
            (false, true) => InvalidPickReason::Unrecognized,
            _ => InvalidPickReason::Unspecified,
        }
    }
}

/// Failure of a call to the remote draft service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Transport-level failure: DNS, refused connection, transport timeout.
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-success status (or undecodable body) with no domain meaning.
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The service rejected the submitted player name.
    #[error("invalid pick `{player_name}`: {message}")]
    InvalidPick {
        player_name: String,
        reason: InvalidPickReason,
        message: String,
    },

    /// The service (or the local pre-check) rejected a start configuration.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the user can fix the problem by editing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidPick { .. } | ServiceError::Validation { .. }
        )
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Network { .. } | ServiceError::Service { .. } => {
                "Request to the draft service failed. Press r to retry.".to_string()
            }
            ServiceError::InvalidPick {
                player_name,
                reason,
                ..
            } => match reason {
                InvalidPickReason::AlreadyDrafted => {
                    format!("{player_name} has already been drafted. Pick someone else.")
                }
                InvalidPickReason::Unrecognized => {
                    format!("No player named \"{player_name}\". Check the spelling.")
                }
                InvalidPickReason::Unspecified => format!(
                    "Could not draft \"{player_name}\". The player may be unavailable or the name misspelled."
                ),
            },
            ServiceError::Validation { field, message } => format!("{field} {message}"),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ServiceError::Service {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ServiceError::Network {
                message: err.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// WireError
// ---------------------------------------------------------------------------

/// A response body that parsed as JSON but does not describe a valid snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("invalid on_clock_team: {0}")]
    InvalidOnClock(String),
}
