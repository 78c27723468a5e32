use serde::{Deserialize, Serialize};

/// Non-fatal conditions reported alongside an otherwise successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// Time value did not match any whitelisted format and was dropped.
    UnparsableTime { value: String },
    /// No cost centre was provided; the UNKNOWN sentinel was substituted.
    DefaultedCostCentre,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnparsableTime { value } => {
                write!(f, "time value '{value}' is ambiguous or invalid and was ignored")
            }
            Warning::DefaultedCostCentre => {
                write!(f, "cost centre not provided, defaulted to UNKNOWN")
            }
        }
    }
}
