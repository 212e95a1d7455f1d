use std::fmt;

/// Errors surfaced by the assignment and distribution engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A required collection was empty or a weight was unusable.
    InvalidInput { reason: String },
    /// No candidate survived the eligibility filter.
    EligibilitySetEmpty,
}

impl EngineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            EngineError::EligibilitySetEmpty => {
                write!(f, "no eligible candidate remains for selection")
            }
        }
    }
}

impl std::error::Error for EngineError {}
