use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] swingtick_core::ValidationError),

    #[error(transparent)]
    Api(#[from] swingtick_core::ApiError),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Usage(_) => 2,
            Self::Api(_) => 3,
            Self::Csv(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
