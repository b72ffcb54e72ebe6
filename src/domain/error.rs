//! Domain error types.

/// Top-level error type for ouncebook.
#[derive(Debug, thiserror::Error)]
pub enum OunceError {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("invalid alert: {reason}")]
    InvalidAlert { reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("stored state is malformed: {reason}")]
    StorageFormat { reason: String },

    #[error("price feed error: {reason}")]
    Feed { reason: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },
}

impl OunceError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            OunceError::Export { .. } => 1,
            OunceError::ConfigParse { .. }
            | OunceError::ConfigMissing { .. }
            | OunceError::ConfigInvalid { .. } => 2,
            OunceError::Storage { .. } | OunceError::StorageFormat { .. } => 3,
            OunceError::InvalidOrder { .. } | OunceError::InvalidAlert { .. } => 4,
            OunceError::Feed { .. } => 5,
        }
    }
}

impl From<&OunceError> for std::process::ExitCode {
    fn from(err: &OunceError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
