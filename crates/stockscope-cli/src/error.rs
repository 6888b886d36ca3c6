use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] stockscope_core::ValidationError),

    #[error("{count} validation message(s) raised")]
    Rejected { count: usize },

    #[error(transparent)]
    Analysis(#[from] stockscope_core::AnalysisError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Rejected { .. } => 2,
            Self::Analysis(_) => 3,
            Self::Serialization(_) => 4,
            Self::Logging(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
