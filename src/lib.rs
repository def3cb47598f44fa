//! # Pages Deploy Library
//!
//! This library builds a locally developed web project and publishes it to a
//! GitHub repository and its Pages service. It backs the `deploy-pages` and
//! `deploy-source` binaries, which differ only in the `PipelineConfig` they
//! hand to the same pipeline.
//!
//! ## Quick Example
//!
//! ```
//! use pages_deploy::config::{PipelineConfig, PipelineVariant, StagePolicy};
//! use pages_deploy::credentials::CredentialStore;
//!
//! let config = PipelineConfig::for_variant(PipelineVariant::FullSource);
//! assert_eq!(config.push_policy, StagePolicy::Hard);
//!
//! let store = CredentialStore::from_sources(
//!     vec![("GITHUB_USERNAME".to_string(), "acme".to_string())],
//!     vec![("REPO_NAME".to_string(), "site".to_string())],
//! );
//! let resolution = store.resolve(&config.required_credentials);
//! assert_eq!(resolution.missing_names, vec!["GITHUB_TOKEN".to_string()]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Commands (`shell`)**: every external program runs through the
//!   `CommandRunner` trait, so the pipeline can be driven by a script in tests.
//! - **Manifest (`manifest`)**: the files and directories a project must have
//!   before anything is built.
//! - **Credentials (`credentials`)**: an immutable snapshot of the process
//!   environment, seeded from `.env.local`.
//! - **Version control (`vcs`)**: init, commit, remote setup and a push that
//!   falls back across branch names.
//! - **Hosting API (`github`)**: repository creation and pages enablement,
//!   where "already exists" is not an error.
//! - **Pipeline (`pipeline`)**: the ordered stages and their failure policy.
//!
//! ## Execution Flow
//!
//! 1.  **VALIDATE_TOOLING**: the build tool and `git` answer `--version`.
//! 2.  **VALIDATE_PATHS**: every manifest entry exists.
//! 3.  **VALIDATE_CREDENTIALS**: every required variable is set.
//! 4.  **BUILD**: install dependencies if needed, build, check `dist`.
//! 5.  **SOURCE_SYNC**: commit and push.
//! 6.  **REMOTE_PROVISION**: create the repository (soft).
//! 7.  **PUBLISH**: enable pages, or publish `dist` with an external command.
//!
//! Validation stages never touch git or the network, so a misconfigured
//! project fails fast without side effects.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod error;
pub mod github;
pub mod interrupt;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod shell;
pub mod vcs;

#[cfg(test)]
mod manifest_proptest;
