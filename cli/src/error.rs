//! Error taxonomy for a single CLI invocation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad cluster, keypair, RPC or settings file, or on-chain state the command
    /// needs is missing. Raised before anything is submitted.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required flag is absent or its value cannot be parsed.
    #[error("{0}")]
    Validation(String),

    /// The network or the program rejected the transaction.
    #[error("transaction failed: {0}")]
    Submission(String),

    /// Post-submission account fetch or decode failed. The transaction stands.
    #[error("read-back failed: {0}")]
    ReadBack(String),
}

impl CliError {
    pub fn config(err: impl std::fmt::Display) -> Self {
        Self::Config(err.to_string())
    }

    pub fn submission(err: impl std::fmt::Display) -> Self {
        Self::Submission(err.to_string())
    }

    pub fn read_back(err: impl std::fmt::Display) -> Self {
        Self::ReadBack(err.to_string())
    }

    /// Process exit status for this failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 3,
            Self::Submission(_) => 4,
            Self::ReadBack(_) => 5,
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            CliError::Validation("x".into()).exit_code(),
            CliError::config("x").exit_code(),
            CliError::submission("x").exit_code(),
            CliError::read_back("x").exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = CliError::Validation("Error swap amount".into());
        assert_eq!(err.to_string(), "Error swap amount");
    }
}
