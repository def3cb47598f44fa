//! Shared command-line entry point for the deployment binaries.
//!
//! Both binaries take no arguments. They resolve the project root from
//! `DEPLOY_PROJECT_ROOT` or the current directory, read `.env.local` from it,
//! run the pipeline for their variant and exit 0 on success, 1 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use log::debug;

use crate::config::{PipelineConfig, PipelineVariant};
use crate::credentials::CredentialStore;
use crate::defaults;
use crate::github::ReqwestTransport;
use crate::interrupt::Interrupt;
use crate::output::{OutputConfig, Reporter};
use crate::pipeline::{DeployOutcome, DeployPipeline};
use crate::shell::ShellRunner;

/// Only `--help` and `--version` are recognised; everything else comes from
/// the environment.
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
pub struct Cli {}

fn about(variant: PipelineVariant) -> &'static str {
    match variant {
        PipelineVariant::PagesBranch => {
            "Build the site and publish the build output to the gh-pages branch"
        }
        PipelineVariant::FullSource => {
            "Build the site, push the full source and enable GitHub Pages"
        }
    }
}

/// Parse arguments, run the pipeline for `variant` and map the outcome to an
/// exit code.
pub fn main(variant: PipelineVariant) -> ExitCode {
    let parsed = Cli::command()
        .about(about(variant))
        .try_get_matches()
        .and_then(|matches| Cli::from_arg_matches(&matches));
    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    init_logging();

    match cli.execute(variant) {
        Ok(outcome) if outcome.succeeded => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

impl Cli {
    fn project_root(&self) -> Result<PathBuf> {
        let root = match std::env::var_os(defaults::PROJECT_ROOT_VAR) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => std::env::current_dir().context("Cannot determine the current directory")?,
        };
        root.canonicalize()
            .with_context(|| format!("Project root {} is not accessible", root.display()))
    }

    /// Run the pipeline. Only setup problems come back as `Err`; a failed
    /// deployment is a normal outcome.
    pub fn execute(&self, variant: PipelineVariant) -> Result<DeployOutcome> {
        let root = self.project_root()?;
        debug!("project root: {}", root.display());

        let env_file = root.join(defaults::ENV_FILE);
        let credentials = CredentialStore::load(&env_file)
            .with_context(|| format!("Failed to read {}", env_file.display()))?;

        let config = PipelineConfig::for_variant(variant);
        let runner = ShellRunner;
        let transport = ReqwestTransport::new().context("Failed to set up the HTTP client")?;

        let outcome = DeployPipeline::new(&config, &root, &credentials, &runner, &transport)
            .with_reporter(Reporter::new(OutputConfig::from_env()))
            .with_interrupt(Interrupt::install())
            .run();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_are_rejected() {
        let err = Cli::try_parse_from(["deploy-pages", "--project-root", "/tmp/site"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    #[serial]
    fn test_missing_project_root_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(defaults::PROJECT_ROOT_VAR, dir.path().join("does-not-exist"));

        let result = Cli {}.execute(PipelineVariant::PagesBranch);
        std::env::remove_var(defaults::PROJECT_ROOT_VAR);

        assert!(result.unwrap_err().to_string().contains("is not accessible"));
    }
}
