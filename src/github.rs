//! GitHub REST client for repository provisioning and pages enablement.
//!
//! Both calls are single-attempt POSTs interpreted only by status code. The
//! HTTP layer sits behind `HttpTransport` so tests can answer with canned
//! statuses; `ReqwestTransport` is the real implementation.

use log::{debug, info};
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("pages-deploy/", env!("CARGO_PKG_VERSION"));

/// Minimal HTTP surface the provisioner needs.
pub trait HttpTransport {
    /// POST `body` as JSON to `url` with a bearer token; return the status code.
    fn post_json(&self, url: &Url, token: &str, body: &serde_json::Value) -> Result<u16>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// A client with no request timeout; a slow API call waits for its answer.
    pub fn new() -> Result<Self> {
        Self::from_builder(Self::builder())
    }

    fn builder() -> reqwest::blocking::ClientBuilder {
        reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None)
    }

    fn from_builder(builder: reqwest::blocking::ClientBuilder) -> Result<Self> {
        let client = builder.build().map_err(|e| Error::Network {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// Same client, but never routed through a proxy from the environment.
    #[cfg(test)]
    fn direct() -> Result<Self> {
        Self::from_builder(Self::builder().no_proxy())
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(&self, url: &Url, token: &str, body: &serde_json::Value) -> Result<u16> {
        let response = self
            .client
            .post(url.clone())
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(body)
            .send()
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            debug!("POST {} -> {}: {}", url, status, text);
        }
        Ok(status)
    }
}

/// How a provisioning call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// 2xx: the resource was created or enabled.
    Applied,
    /// Conflict: the repository already exists or pages is already enabled.
    AlreadyPresent,
    /// Pages needs workflow configuration before it can be enabled here.
    NeedsConfiguration,
    /// Any other status.
    Rejected { status: u16 },
    /// The request never got a response.
    Unreachable { message: String },
}

impl RemoteOutcome {
    /// Applied and AlreadyPresent both count as success.
    pub fn succeeded(&self) -> bool {
        matches!(self, RemoteOutcome::Applied | RemoteOutcome::AlreadyPresent)
    }

    /// The warning this outcome produces, if any.
    ///
    /// Returns `RemoteConflict` for `AlreadyPresent`, `RemoteSoftFailure` for
    /// every failure, and `None` for `Applied`.
    pub fn warning(&self, operation: &str, resource: &str) -> Option<Error> {
        let message = match self {
            RemoteOutcome::Applied => return None,
            RemoteOutcome::AlreadyPresent => {
                return Some(Error::RemoteConflict {
                    resource: resource.to_string(),
                })
            }
            RemoteOutcome::NeedsConfiguration => {
                "additional workflow configuration is required; enable it manually in the repository settings".to_string()
            }
            RemoteOutcome::Rejected { status } => format!("HTTP {}", status),
            RemoteOutcome::Unreachable { message } => message.clone(),
        };
        Some(Error::RemoteSoftFailure {
            operation: operation.to_string(),
            message,
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateRepository<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    homepage: &'a str,
    auto_init: bool,
}

#[derive(Debug, Serialize)]
struct PagesSource<'a> {
    branch: &'a str,
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct EnablePages<'a> {
    build_type: &'a str,
    source: PagesSource<'a>,
}

/// Creates repositories and enables pages publishing.
pub struct RemoteRepoProvisioner<'a> {
    transport: &'a dyn HttpTransport,
    api_base: Url,
    token: String,
}

impl<'a> RemoteRepoProvisioner<'a> {
    pub fn new(transport: &'a dyn HttpTransport, api_base: &str, token: impl Into<String>) -> Result<Self> {
        // A trailing slash keeps path prefixes such as `/api/v3` on join.
        let mut api_base = Url::parse(api_base)?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        Ok(Self {
            transport,
            api_base,
            token: token.into(),
        })
    }

    fn post(&self, path: &str, body: impl Serialize) -> Result<std::result::Result<u16, String>> {
        let url = self.api_base.join(path)?;
        let body = serde_json::to_value(body)?;
        debug!("POST {}", url);
        Ok(match self.transport.post_json(&url, &self.token, &body) {
            Ok(status) => Ok(status),
            Err(e) => Err(e.to_string()),
        })
    }

    /// Create `name` under the authenticated account.
    ///
    /// 409 and 422 mean the repository already exists and count as success.
    pub fn create_repository(
        &self,
        name: &str,
        description: &str,
        private: bool,
        homepage: &str,
    ) -> Result<RemoteOutcome> {
        let body = CreateRepository {
            name,
            description,
            private,
            homepage,
            auto_init: false,
        };
        let outcome = match self.post("user/repos", body)? {
            Ok(status) if (200..300).contains(&status) => RemoteOutcome::Applied,
            Ok(409) | Ok(422) => RemoteOutcome::AlreadyPresent,
            Ok(status) => RemoteOutcome::Rejected { status },
            Err(message) => RemoteOutcome::Unreachable { message },
        };
        log_outcome("repository creation", name, &outcome);
        Ok(outcome)
    }

    /// Enable pages for `owner/repo`, published from the root of `branch`.
    ///
    /// 409 means pages is already enabled and counts as success; 422 means
    /// the repository needs workflow configuration first.
    pub fn enable_pages_publishing(&self, owner: &str, repo: &str, branch: &str) -> Result<RemoteOutcome> {
        let body = EnablePages {
            build_type: "legacy",
            source: PagesSource { branch, path: "/" },
        };
        let path = format!("repos/{}/{}/pages", owner, repo);
        let outcome = match self.post(&path, body)? {
            Ok(status) if (200..300).contains(&status) => RemoteOutcome::Applied,
            Ok(409) => RemoteOutcome::AlreadyPresent,
            Ok(422) => RemoteOutcome::NeedsConfiguration,
            Ok(status) => RemoteOutcome::Rejected { status },
            Err(message) => RemoteOutcome::Unreachable { message },
        };
        log_outcome("pages enablement", &format!("{}/{}", owner, repo), &outcome);
        Ok(outcome)
    }
}

// Callers decide whether an outcome deserves a warning.
fn log_outcome(operation: &str, target: &str, outcome: &RemoteOutcome) {
    match outcome {
        RemoteOutcome::Applied => info!("{} succeeded for {}", operation, target),
        RemoteOutcome::AlreadyPresent => info!("{} for {}: already exists", operation, target),
        other => debug!("{} for {} failed: {:?}", operation, target, other),
    }
}
