//! API response types for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchOutcome;
use crate::services::shared::RoverSnapshot;
use crate::traits::Direction;

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Current vehicle state response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    /// Current direction
    pub direction: Direction,
    /// Current PWM duty (0 to 1023)
    pub duty: u16,
    /// Battery voltage in volts
    pub battery_volts: f32,
}

impl From<&RoverSnapshot> for StateResponse {
    fn from(snap: &RoverSnapshot) -> Self {
        Self {
            direction: snap.direction,
            duty: snap.duty,
            battery_volts: snap.battery_volts,
        }
    }
}

/// Result of one dispatched command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// What became of the command: `executed`, `discarded_unsafe`, `ignored`
    pub outcome: String,
    /// Applied direction (present when executed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Battery reading that discarded the command (present when unsafe)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_volts: Option<f32>,
}

impl From<DispatchOutcome> for CommandResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Executed(direction) => Self {
                outcome: "executed".into(),
                direction: Some(direction),
                battery_volts: None,
            },
            DispatchOutcome::DiscardedUnsafe { volts } => Self {
                outcome: "discarded_unsafe".into(),
                direction: None,
                battery_volts: Some(volts),
            },
            DispatchOutcome::Ignored => Self {
                outcome: "ignored".into(),
                direction: None,
                battery_volts: None,
            },
        }
    }
}
