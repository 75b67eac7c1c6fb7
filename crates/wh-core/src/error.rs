//! Error types for Wheelhouse

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum WhError {
    /// Strategy failed validation. Carries every violated rule, not just the first.
    #[error("Invalid strategy: {}", .0.join("; "))]
    InvalidStrategy(Vec<String>),

    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Simulation requires at least one trial")]
    NoTrials,

    #[error("Simulation cancelled after {completed} trials")]
    Cancelled { completed: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WhError {
    /// Human-readable messages for the calling layer.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::InvalidStrategy(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Result type alias
pub type WhResult<T> = Result<T, WhError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_strategy_lists_every_rule() {
        let err = WhError::InvalidStrategy(vec![
            "Strategy name is required".into(),
            "Max iterations must be positive".into(),
        ]);

        assert_eq!(err.messages().len(), 2);
        assert_eq!(
            err.to_string(),
            "Invalid strategy: Strategy name is required; Max iterations must be positive"
        );
    }

    #[test]
    fn test_single_message_errors() {
        let err = WhError::Cancelled { completed: 40 };
        assert_eq!(err.messages(), vec!["Simulation cancelled after 40 trials".to_string()]);
    }
}
