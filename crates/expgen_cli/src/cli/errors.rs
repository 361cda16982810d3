//! CLI-specific error types
//!
//! Validation problems are diagnostics, not errors; a `CliError` means the
//! command could not run at all.

use expgen_core::{CompileError, CompileStatus, ConfigError, ExportError};
use std::fmt;
use std::io;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or environment error
    ConfigError,
    /// Logger could not be initialized
    LoggingError,
    /// Workbook missing or unreadable
    WorkbookError,
    /// Results data could not be exported
    ExportError,
    /// I/O error
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "EXPGEN_CLI_CONFIG_ERROR",
            Self::LoggingError => "EXPGEN_CLI_LOGGING_ERROR",
            Self::WorkbookError => "EXPGEN_CLI_WORKBOOK_ERROR",
            Self::ExportError => "EXPGEN_CLI_EXPORT_ERROR",
            Self::IoError => "EXPGEN_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn logging_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LoggingError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process exit code. An unreadable workbook fails the compile.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            CliErrorCode::WorkbookError => CompileStatus::Failed.exit_code(),
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {e}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        match e {
            CompileError::Workbook(_) => Self::new(CliErrorCode::WorkbookError, e.to_string()),
            CompileError::Io { .. } => Self::io_error(e.to_string()),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        Self::new(CliErrorCode::ExportError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
