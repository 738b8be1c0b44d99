//! Crate-wide error type.
//!
//! Every failure the pipeline can produce surfaces as one of these kinds; the
//! binary maps each kind to a process exit code.

use thiserror::Error;

use crate::data::DataUnavailable;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Too few dates survived alignment to run the analysis.
    #[error("Alignment failed: only {observations} aligned observations (minimum {required}).")]
    Alignment { observations: usize, required: usize },

    /// Upstream fetch/parse failure or a missing required series.
    #[error("Data error: {0}")]
    Data(String),

    /// A statistic was requested over too few (or degenerate) samples.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io(_) => 2,
            AppError::Alignment { .. } | AppError::InsufficientData(_) => 3,
            AppError::Data(_) => 4,
        }
    }
}

impl From<DataUnavailable> for AppError {
    fn from(err: DataUnavailable) -> Self {
        AppError::Data(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_become_data_errors() {
        let err: AppError = DataUnavailable::new("DGS10", "status 500").into();
        assert!(matches!(err, AppError::Data(_)));
        assert!(err.to_string().contains("DGS10"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn alignment_message_names_counts() {
        let err = AppError::Alignment { observations: 5, required: 30 };
        let msg = err.to_string();
        assert!(msg.contains('5') && msg.contains("30"));
        assert_eq!(err.exit_code(), 3);
    }
}
