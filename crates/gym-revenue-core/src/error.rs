use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevenueError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Ambiguous commission configuration: {matching} active '{commission_type}' rules match \
         salesperson '{salesperson_id}'"
    )]
    AmbiguousRule {
        salesperson_id: String,
        commission_type: String,
        matching: usize,
    },

    #[error("Commission record '{record_id}' has been paid and can no longer be recomputed")]
    ImmutableRecord { record_id: String },

    #[error("Stale record state: expected '{expected}', found '{actual}'")]
    StaleState { expected: String, actual: String },

    #[error("Invalid status transition: '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RevenueError {
    fn from(e: serde_json::Error) -> Self {
        RevenueError::Serialization(e.to_string())
    }
}
