//! # Pipeline Configuration
//!
//! Both deployment variants run the same `DeployPipeline`; what differs is
//! captured here. A `PipelineConfig` holds the manifest, the tools and
//! credentials to require, the build step, the branch candidates, which
//! stages are hard stops, and how publication happens. `Settings` holds the
//! values resolved from the `CredentialStore` for one run.

use std::fmt;
use std::path::PathBuf;

use crate::credentials::CredentialStore;
use crate::defaults;
use crate::manifest::DeployManifest;
use crate::shell::ShellCommand;

/// The two deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    /// Build, then publish the build output to the pages branch.
    PagesBranch,
    /// Build, then push the full source tree and enable pages through the API.
    FullSource,
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineVariant::PagesBranch => write!(f, "pages branch"),
            PipelineVariant::FullSource => write!(f, "full source"),
        }
    }
}

/// Whether a stage failure aborts the run or is recorded as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    Hard,
    Soft,
}

/// How the PUBLISH stage delivers the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishMode {
    /// Enable pages through the hosting API.
    PagesApi,
    /// Run an external command that publishes the built assets.
    AssetCommand(ShellCommand),
}

/// The external build collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Run before `command` when `install_marker` is absent.
    pub install: Option<ShellCommand>,
    pub install_marker: PathBuf,
    pub command: ShellCommand,
    /// Directory the build must produce, relative to the project root.
    pub output_dir: PathBuf,
}

impl Default for BuildStep {
    fn default() -> Self {
        Self {
            install: Some(ShellCommand::new("npm").arg("install").inherit_output()),
            install_marker: PathBuf::from(defaults::DEPENDENCY_DIR),
            command: ShellCommand::new("npm").args(["run", "build"]).inherit_output(),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

/// Everything that distinguishes one pipeline variant from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub variant: PipelineVariant,
    pub manifest: DeployManifest,
    pub required_tools: Vec<String>,
    pub required_credentials: Vec<String>,
    pub build: BuildStep,
    pub branch_candidates: Vec<String>,
    pub force_push: bool,
    /// Point `origin` at a token-bearing URL before pushing.
    pub configure_remote: bool,
    /// Policy for a push rejected on every branch candidate.
    pub push_policy: StagePolicy,
    /// Create the hosted repository before publishing.
    pub provision: bool,
    pub publish: PublishMode,
    /// Policy for a failed PUBLISH stage.
    pub publish_policy: StagePolicy,
}

impl PipelineConfig {
    /// The preset for a variant.
    pub fn for_variant(variant: PipelineVariant) -> Self {
        match variant {
            PipelineVariant::PagesBranch => Self::pages_branch(),
            PipelineVariant::FullSource => Self::full_source(),
        }
    }

    /// Push sources best-effort, then publish `dist` with `gh-pages`.
    ///
    /// The source push is soft here: `gh-pages` pushes the built site on its
    /// own, so a rejected source push only leaves the source branch stale.
    pub fn pages_branch() -> Self {
        Self {
            variant: PipelineVariant::PagesBranch,
            manifest: DeployManifest::pages_branch(),
            required_tools: strings(["node", "npm", "git"]),
            required_credentials: strings([defaults::ACCOUNT_VAR, defaults::REPO_VAR]),
            build: BuildStep::default(),
            branch_candidates: strings(defaults::BRANCH_CANDIDATES),
            force_push: false,
            configure_remote: false,
            push_policy: StagePolicy::Soft,
            provision: false,
            publish: PublishMode::AssetCommand(
                ShellCommand::new("npx").args(["gh-pages", "-d", defaults::OUTPUT_DIR]),
            ),
            publish_policy: StagePolicy::Hard,
        }
    }

    /// Push the whole tree, create the repository and enable pages.
    pub fn full_source() -> Self {
        Self {
            variant: PipelineVariant::FullSource,
            manifest: DeployManifest::full_source(),
            required_tools: strings(["node", "npm", "git"]),
            required_credentials: strings([
                defaults::ACCOUNT_VAR,
                defaults::TOKEN_VAR,
                defaults::REPO_VAR,
            ]),
            build: BuildStep::default(),
            branch_candidates: strings(defaults::BRANCH_CANDIDATES),
            force_push: false,
            configure_remote: true,
            push_policy: StagePolicy::Hard,
            provision: true,
            publish: PublishMode::PagesApi,
            publish_policy: StagePolicy::Soft,
        }
    }
}

fn strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Values resolved once from the credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub account: String,
    pub token: Option<String>,
    pub repo: String,
    pub api_base: String,
    pub description: String,
    pub private: bool,
}

impl Settings {
    /// Read settings from `store`. Missing required values come back empty;
    /// the pipeline's credential stage rejects them before they are used.
    pub fn from_store(store: &CredentialStore) -> Self {
        let get = |name: &str| store.get(name).unwrap_or_default().to_string();
        Self {
            account: get(defaults::ACCOUNT_VAR),
            token: store.get(defaults::TOKEN_VAR).map(str::to_string),
            repo: get(defaults::REPO_VAR),
            api_base: store
                .get(defaults::API_URL_VAR)
                .unwrap_or(defaults::API_BASE_URL)
                .to_string(),
            description: get(defaults::DESCRIPTION_VAR),
            private: store
                .get(defaults::PRIVATE_VAR)
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        }
    }

    pub fn public_url(&self) -> String {
        defaults::public_url(&self.account, &self.repo)
    }
}
