//! Error types for kickstartDS operations.
//!
//! This module defines [`KickstartError`], the primary error type used
//! throughout the engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `KickstartError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `KickstartError::Other`) for unexpected errors
//! - Every error maps to a [`Severity`] so callers can decide between
//!   aborting, logging and continuing, or surfacing a typed failure

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kickstartDS operations.
#[derive(Debug, Error)]
pub enum KickstartError {
    /// Failed to parse a run-control or task file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// No task definition exists for the requested module and command.
    #[error("Unknown task: {module} {command}")]
    TaskNotFound { module: String, command: String },

    /// A required external command is not installed.
    #[error("Missing prerequisite '{command}': not found on PATH")]
    PrerequisiteMissing { command: String },

    /// A check, run or revert step failed.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// Writing or querying timing telemetry failed.
    #[error("Telemetry error: {message}")]
    Telemetry { message: String },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How an error should be treated by the layer that receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the phase and exit non-zero.
    Fatal,
    /// Log and continue.
    Advisory,
    /// Surfaced to the caller as a typed failure; the CLI decides the exit.
    Recoverable,
}

impl KickstartError {
    /// Classify this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Telemetry { .. } => Severity::Advisory,
            Self::StepFailed { .. } => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }

    /// Shorthand for building a telemetry error from anything displayable.
    pub fn telemetry(message: impl std::fmt::Display) -> Self {
        Self::Telemetry {
            message: message.to_string(),
        }
    }
}

/// Result type alias for kickstartDS operations.
pub type Result<T> = std::result::Result<T, KickstartError>;
