//! # Deployment Pipeline
//!
//! `DeployPipeline` runs a fixed sequence of stages and stops at the first
//! hard failure:
//!
//! 1. `VALIDATE_TOOLING` - every required tool answers `--version`.
//! 2. `VALIDATE_PATHS` - every manifest entry exists under the project root.
//! 3. `VALIDATE_CREDENTIALS` - every required variable is non-empty.
//! 4. `BUILD` - install dependencies if needed, build, check the output dir.
//! 5. `SOURCE_SYNC` - init if needed, commit, push with branch fallback.
//! 6. `REMOTE_PROVISION` - create the hosted repository (always soft).
//! 7. `PUBLISH` - enable pages via the API, or run the asset publisher.
//! 8. `DONE`
//!
//! Soft failures are collected as warnings and never flip the success flag.
//! No VCS or network call happens before the three validation stages pass.

use std::fmt;
use std::path::Path;

use log::{info, warn};

use crate::config::{PipelineConfig, PublishMode, Settings, StagePolicy};
use crate::credentials::CredentialStore;
use crate::defaults;
use crate::error::{Error, Result};
use crate::github::{HttpTransport, RemoteRepoProvisioner};
use crate::interrupt::Interrupt;
use crate::manifest::{self, EntryKind};
use crate::output::Reporter;
use crate::shell::{CommandRunner, ShellCommand};
use crate::vcs::{self, VcsClient, VcsOutcome};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    ValidateTooling,
    ValidatePaths,
    ValidateCredentials,
    Build,
    SourceSync,
    RemoteProvision,
    Publish,
    Done,
}

impl Stage {
    /// Every stage that does work; `Done` is only ever reported.
    pub const SEQUENCE: [Stage; 7] = [
        Stage::ValidateTooling,
        Stage::ValidatePaths,
        Stage::ValidateCredentials,
        Stage::Build,
        Stage::SourceSync,
        Stage::RemoteProvision,
        Stage::Publish,
    ];

    /// Heading printed when the stage starts.
    pub fn title(&self) -> &'static str {
        match self {
            Stage::ValidateTooling => "Checking tooling",
            Stage::ValidatePaths => "Checking project files",
            Stage::ValidateCredentials => "Checking credentials",
            Stage::Build => "Building",
            Stage::SourceSync => "Syncing sources",
            Stage::RemoteProvision => "Provisioning repository",
            Stage::Publish => "Publishing",
            Stage::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidateTooling => "VALIDATE_TOOLING",
            Stage::ValidatePaths => "VALIDATE_PATHS",
            Stage::ValidateCredentials => "VALIDATE_CREDENTIALS",
            Stage::Build => "BUILD",
            Stage::SourceSync => "SOURCE_SYNC",
            Stage::RemoteProvision => "REMOTE_PROVISION",
            Stage::Publish => "PUBLISH",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Terminal record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// `Done` on success, otherwise the stage that stopped the run.
    pub stage: Stage,
    pub succeeded: bool,
    pub message: String,
    pub warnings: Vec<String>,
    /// Branch the push landed on, if a push succeeded.
    pub pushed_branch: Option<String>,
    pub public_url: Option<String>,
}

impl DeployOutcome {
    /// Process exit code: 0 on success (warnings included), 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded {
            0
        } else {
            1
        }
    }
}

/// Mutable bookkeeping carried across stages.
#[derive(Debug, Default)]
struct RunState {
    warnings: Vec<String>,
    pushed_branch: Option<String>,
}

/// Orchestrates one deployment.
pub struct DeployPipeline<'a> {
    config: &'a PipelineConfig,
    root: &'a Path,
    credentials: &'a CredentialStore,
    runner: &'a dyn CommandRunner,
    transport: &'a dyn HttpTransport,
    reporter: Reporter,
    interrupt: Interrupt,
    commit_message: String,
}

impl<'a> DeployPipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        root: &'a Path,
        credentials: &'a CredentialStore,
        runner: &'a dyn CommandRunner,
        transport: &'a dyn HttpTransport,
    ) -> Self {
        Self {
            config,
            root,
            credentials,
            runner,
            transport,
            reporter: Reporter::silent(),
            interrupt: Interrupt::new(),
            commit_message: defaults::commit_message(),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Run every stage and report the outcome.
    pub fn run(&self) -> DeployOutcome {
        let settings = Settings::from_store(self.credentials);
        let mut state = RunState::default();

        self.reporter.banner(self.config.variant);

        for stage in Stage::SEQUENCE {
            self.reporter.header(stage.title());
            info!("entering {}", stage);

            let result = if self.interrupt.is_raised() {
                Err(Error::Interrupted {
                    stage: stage.to_string(),
                })
            } else {
                self.execute(stage, &settings, &mut state)
            };

            if let Err(e) = result {
                let error = if self.interrupt.is_raised() && !matches!(e, Error::Interrupted { .. }) {
                    Error::Interrupted {
                        stage: stage.to_string(),
                    }
                } else {
                    e
                };
                let outcome = DeployOutcome {
                    stage,
                    succeeded: false,
                    message: error.to_string(),
                    warnings: state.warnings,
                    pushed_branch: state.pushed_branch,
                    public_url: None,
                };
                self.reporter.summary(&outcome);
                return outcome;
            }
        }

        let public_url = settings.public_url();
        let outcome = DeployOutcome {
            stage: Stage::Done,
            succeeded: true,
            message: format!("Deployed {} to {}", settings.repo, public_url),
            warnings: state.warnings,
            pushed_branch: state.pushed_branch,
            public_url: Some(public_url),
        };
        self.reporter.summary(&outcome);
        outcome
    }

    fn execute(&self, stage: Stage, settings: &Settings, state: &mut RunState) -> Result<()> {
        match stage {
            Stage::ValidateTooling => self.validate_tooling(),
            Stage::ValidatePaths => self.validate_paths(),
            Stage::ValidateCredentials => self.validate_credentials(),
            Stage::Build => self.build(),
            Stage::SourceSync => self.source_sync(settings, state),
            Stage::RemoteProvision => {
                self.remote_provision(settings, state);
                Ok(())
            }
            Stage::Publish => self.publish(settings, state),
            Stage::Done => Ok(()),
        }
    }

    fn soft_warning(&self, state: &mut RunState, message: String) {
        warn!("{}", message);
        self.reporter.warning(&message);
        state.warnings.push(message);
    }

    fn validate_tooling(&self) -> Result<()> {
        let mut missing = Vec::new();

        for tool in &self.config.required_tools {
            let probe = ShellCommand::new(tool.as_str()).arg("--version");
            let result = self.runner.run(&probe, self.root, false)?;
            if result.succeeded {
                let version = result.output.lines().next().unwrap_or_default().trim();
                self.reporter.success(&format!("{} found {}", tool, version));
            } else {
                self.reporter.error(&format!("{} not found", tool));
                missing.push(tool.clone());
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ToolingMissing { tools: missing })
        }
    }

    fn validate_paths(&self) -> Result<()> {
        let report = manifest::check_manifest(self.root, &self.config.manifest);

        for entry in &report.present {
            match (entry.kind, entry.file_count) {
                (EntryKind::Directory, Some(count)) => self
                    .reporter
                    .success(&format!("{}/ ({} files)", entry.path.display(), count)),
                _ => self.reporter.success(&entry.path.display().to_string()),
            }
        }
        for entry in &report.missing {
            self.reporter
                .error(&format!("{} is missing", entry.path.display()));
        }

        if report.all_present() {
            Ok(())
        } else {
            Err(Error::PathMissing {
                missing: report.missing_names(),
            })
        }
    }

    fn validate_credentials(&self) -> Result<()> {
        let resolution = self.credentials.resolve(&self.config.required_credentials);

        for name in &resolution.missing_names {
            self.reporter.error(&format!("{} is not set", name));
        }

        if resolution.all_resolved() {
            self.reporter.success(&format!(
                "{} credential(s) resolved",
                self.config.required_credentials.len()
            ));
            Ok(())
        } else {
            Err(Error::CredentialMissing {
                names: resolution.missing_names,
            })
        }
    }

    fn build(&self) -> Result<()> {
        let build = &self.config.build;

        if let Some(install) = &build.install {
            if !self.root.join(&build.install_marker).exists() {
                self.reporter.info("Installing dependencies...");
                let result = self.runner.run(install, self.root, false)?;
                if !result.succeeded {
                    return Err(Error::BuildFailed {
                        message: format!("dependency installation failed: {}", result.diagnostic()),
                    });
                }
                self.reporter.success("Dependencies installed");
            }
        }

        self.reporter.info(&format!("Running {}", build.command));
        let result = self.runner.run(&build.command, self.root, false)?;
        if !result.succeeded {
            return Err(Error::BuildFailed {
                message: result.diagnostic().to_string(),
            });
        }

        let output_dir = self.root.join(&build.output_dir);
        if !output_dir.is_dir() {
            return Err(Error::BuildFailed {
                message: format!("output directory {} was not produced", build.output_dir.display()),
            });
        }
        let count = manifest::count_files(&output_dir);
        if count == 0 {
            return Err(Error::BuildFailed {
                message: format!("output directory {} is empty", build.output_dir.display()),
            });
        }

        self.reporter.success(&format!("Built {} files", count));
        Ok(())
    }

    fn source_sync(&self, settings: &Settings, state: &mut RunState) -> Result<()> {
        match (self.sync_sources(settings, state), self.config.push_policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), StagePolicy::Hard) => Err(e),
            (Err(e), StagePolicy::Soft) => {
                self.soft_warning(state, format!("Sources were not pushed: {}", e));
                Ok(())
            }
        }
    }

    fn sync_sources(&self, settings: &Settings, state: &mut RunState) -> Result<()> {
        let vcs = VcsClient::new(self.runner);

        if vcs.ensure_repository(self.root)? {
            self.reporter.success("Initialized repository");
        }

        if self.config.configure_remote {
            let url = vcs::remote_url(&settings.account, &settings.repo, settings.token.as_deref());
            vcs.configure_remote(self.root, &url)?;
            self.reporter
                .success(&format!("Remote origin set to {}", vcs::redact_url(&url)));
        }

        match vcs.stage_and_commit(self.root, &self.commit_message)? {
            VcsOutcome::Success => self.reporter.success("Committed changes"),
            VcsOutcome::NoOpSuccess => self.reporter.info("Nothing to commit"),
            VcsOutcome::Failure(reason) => {
                self.soft_warning(state, format!("Commit failed, pushing existing history: {}", reason))
            }
        }

        let report = vcs.push(self.root, &self.config.branch_candidates, self.config.force_push)?;
        if report.rejected.is_empty() {
            self.reporter.success(&format!("Pushed to {}", report.branch));
        } else {
            let tried: Vec<&str> = report.rejected.iter().map(|(b, _)| b.as_str()).collect();
            self.reporter.success(&format!(
                "Pushed to {} (rejected: {})",
                report.branch,
                tried.join(", ")
            ));
        }
        state.pushed_branch = Some(report.branch);
        Ok(())
    }

    fn provisioner(&self, settings: &Settings) -> Result<RemoteRepoProvisioner<'a>> {
        let token = settings.token.clone().unwrap_or_default();
        RemoteRepoProvisioner::new(self.transport, &settings.api_base, token)
    }

    fn remote_provision(&self, settings: &Settings, state: &mut RunState) {
        if !self.config.provision {
            self.reporter.info("Skipped for this deployment target");
            return;
        }

        let resource = format!("Repository {}/{}", settings.account, settings.repo);
        let outcome = self.provisioner(settings).and_then(|p| {
            p.create_repository(
                &settings.repo,
                &settings.description,
                settings.private,
                &settings.public_url(),
            )
        });

        match outcome {
            Ok(outcome) => match outcome.warning("Repository creation", &resource) {
                None => self.reporter.success(&format!("{} created", resource)),
                Some(warning) => self.soft_warning(state, warning.to_string()),
            },
            Err(e) => self.soft_warning(state, format!("Repository creation skipped: {}", e)),
        }
    }

    fn publish(&self, settings: &Settings, state: &mut RunState) -> Result<()> {
        let result = match &self.config.publish {
            PublishMode::PagesApi => self.enable_pages(settings, state),
            PublishMode::AssetCommand(command) => self.publish_assets(command),
        };

        match (result, self.config.publish_policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), StagePolicy::Hard) => Err(e),
            (Err(e), StagePolicy::Soft) => {
                self.soft_warning(state, e.to_string());
                Ok(())
            }
        }
    }

    fn enable_pages(&self, settings: &Settings, state: &mut RunState) -> Result<()> {
        let branch = state
            .pushed_branch
            .clone()
            .or_else(|| self.config.branch_candidates.first().cloned())
            .unwrap_or_else(|| defaults::BRANCH_CANDIDATES[0].to_string());
        let target = format!("{}/{}", settings.account, settings.repo);

        let outcome = self
            .provisioner(settings)?
            .enable_pages_publishing(&settings.account, &settings.repo, &branch)?;

        match outcome.warning("Pages enablement", &format!("Pages site for {}", target)) {
            None => {
                self.reporter
                    .success(&format!("Pages enabled from {} for {}", branch, target));
                Ok(())
            }
            Some(warning @ Error::RemoteConflict { .. }) => {
                self.soft_warning(state, warning.to_string());
                Ok(())
            }
            Some(warning) => Err(warning),
        }
    }

    fn publish_assets(&self, command: &ShellCommand) -> Result<()> {
        self.reporter.info(&format!("Running {}", command));
        let result = self.runner.run(command, self.root, false)?;
        if !result.succeeded {
            return Err(Error::PublishFailed {
                message: result.diagnostic().to_string(),
            });
        }
        self.reporter.success("Published build output");
        Ok(())
    }
}
