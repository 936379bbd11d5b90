//! CLI-specific error types and exit code mapping

use hostattr_core::error::HostAttrError;
use hostattr_table::HostTableError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// 호스트 파일을 읽거나 테이블에 적재하지 못함
    #[error("hosts load error: {0}")]
    Load(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from hostattr-core.
    #[error("{0}")]
    Core(#[from] HostAttrError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                     |
    /// |------|-----------------------------|
    /// | 0    | Success                     |
    /// | 1    | General / command error     |
    /// | 2    | Configuration error         |
    /// | 3    | Hosts file load failure     |
    /// | 10   | IO error                    |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(HostAttrError::Config(_)) => 2,
            Self::Load(_) | Self::Core(HostAttrError::Load(_)) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<HostTableError> for CliError {
    fn from(e: HostTableError) -> Self {
        match e {
            HostTableError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Load(other.to_string()),
        }
    }
}
