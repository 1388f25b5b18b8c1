use mongolens_core::MongolensError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised at the command boundary
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Command {command_id} is already registered")]
    DuplicateCommand { command_id: String },

    #[error("Unknown command: {command_id}")]
    UnknownCommand { command_id: String },

    #[error("Invalid arguments for {command_id}: {reason}")]
    InvalidArguments { command_id: String, reason: String },

    #[error("Arguments for {command_id} do not match {expected}: {details}")]
    SchemaMismatch {
        command_id: String,
        expected: String,
        details: String,
    },

    #[error(transparent)]
    Core(#[from] MongolensError),
}

impl ServiceError {
    /// Whether the host sent a payload the command cannot accept
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments { .. } | Self::SchemaMismatch { .. }
        )
    }
}
