use thiserror::Error;
use token_model::ErrorEnvelope;

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that abort a transform.
///
/// None of these cross the public transform boundary as `Err`; they are folded into a
/// failed [`token_model::TransformResult`] through [`TransformError::to_envelope`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// No value of the token applies under the active modes
    #[error("Token '{token_id}' has no value applicable to modes [{}]", .active_modes.join(", "))]
    NoApplicableValue {
        token_id: String,
        active_modes: Vec<String>,
    },

    /// Alias chain revisits a token
    #[error("Cyclic alias: {}", .chain.join(" -> "))]
    CyclicAlias { chain: Vec<String> },

    /// Alias chain longer than the configured bound
    #[error("Alias chain from '{token_id}' exceeds {max_depth} hops")]
    AliasDepthExceeded { token_id: String, max_depth: usize },

    /// Alias points at a token that is not part of the system
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Literal could not be encoded and strict mode is on
    #[error("Invalid value for token '{token_id}': {reason}")]
    InvalidValue { token_id: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TransformError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoApplicableValue { .. } => "NO_APPLICABLE_VALUE",
            Self::CyclicAlias { .. } => "CYCLIC_ALIAS",
            Self::AliasDepthExceeded { .. } => "ALIAS_DEPTH_EXCEEDED",
            Self::UnknownToken(_) => "UNKNOWN_TOKEN",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    pub fn invalid_value(token_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            token_id: token_id.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        let details = match self {
            Self::NoApplicableValue {
                token_id,
                active_modes,
            } => Some(serde_json::json!({ "tokenId": token_id, "activeModes": active_modes })),
            Self::CyclicAlias { chain } => Some(serde_json::json!({ "chain": chain })),
            Self::AliasDepthExceeded {
                token_id,
                max_depth,
            } => Some(serde_json::json!({ "tokenId": token_id, "maxDepth": max_depth })),
            Self::UnknownToken(id) => Some(serde_json::json!({ "tokenId": id })),
            Self::InvalidValue { token_id, reason } => {
                Some(serde_json::json!({ "tokenId": token_id, "reason": reason }))
            }
            Self::InvalidConfig(_) => None,
        };

        ErrorEnvelope {
            code: self.code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}
