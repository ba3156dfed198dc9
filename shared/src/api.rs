use serde::{Deserialize, Serialize};

// ============================================================================
// Error Types
// ============================================================================

/// Error body returned by the relay for every locally produced failure.
///
/// Serializes as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
