//! # Error Handling
//!
//! This module defines the centralized error type for the deployment
//! pipeline. It uses the `thiserror` library to create a single `Error` enum
//! covering every failure the pipeline can classify, with messages that name
//! the failed operation and carry the underlying tool's error text.
//!
//! ## Fatal vs. recovered
//!
//! Most variants are fatal: when a stage returns one of them the pipeline
//! stops and reports it. Two variants are never returned as `Err` from the
//! pipeline and only appear as rendered warnings:
//!
//! - `RemoteConflict`: the hosting API says the resource already exists.
//! - `RemoteSoftFailure`: any other hosting API failure during provisioning or
//!   pages enablement.
//!
//! Variants holding several items (missing paths, missing credentials, missing
//! tools) list every one of them, not just the first.

use thiserror::Error;

/// Main error type for deployment operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required external tools could not be invoked.
    #[error("Required tooling missing: {}", tools.join(", "))]
    ToolingMissing { tools: Vec<String> },

    /// One or more manifest entries are absent under the project root.
    #[error("Required paths missing: {}", missing.join(", "))]
    PathMissing { missing: Vec<String> },

    /// One or more required credentials resolved to nothing.
    #[error("Required credentials missing: {}", names.join(", "))]
    CredentialMissing { names: Vec<String> },

    /// The external build step failed or produced no output.
    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    /// A version-control operation failed for a reason other than a no-op.
    #[error("Git {operation} failed: {message}")]
    VcsOperationFailed { operation: String, message: String },

    /// The asset-publish command failed.
    #[error("Publish failed: {message}")]
    PublishFailed { message: String },

    /// The hosting API reports the target already exists or is already enabled.
    #[error("{resource} already exists")]
    RemoteConflict { resource: String },

    /// A hosting API call failed during a stage where that is tolerated.
    #[error("{operation} did not complete: {message}")]
    RemoteSoftFailure { operation: String, message: String },

    /// A command run with `must_succeed` exited non-zero.
    #[error("Command failed: {command} - {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// An HTTP request could not be sent or its response could not be read.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// The user interrupted the run while a stage was in progress.
    #[error("Stopped by user during {stage}")]
    Interrupted { stage: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
