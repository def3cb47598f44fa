//! Default values for deployment configuration.
//!
//! This module provides centralized default values used by both pipeline
//! variants, ensuring consistency and avoiding duplication.

/// Environment variable holding the hosting account identifier.
pub const ACCOUNT_VAR: &str = "GITHUB_USERNAME";

/// Environment variable holding the bearer token for the hosting API.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Environment variable holding the target repository name.
pub const REPO_VAR: &str = "REPO_NAME";

/// Environment variable overriding the hosting API base URL.
pub const API_URL_VAR: &str = "GITHUB_API_URL";

/// Environment variable holding the description used when creating the repository.
pub const DESCRIPTION_VAR: &str = "REPO_DESCRIPTION";

/// Environment variable selecting private visibility for a created repository.
pub const PRIVATE_VAR: &str = "REPO_PRIVATE";

/// Environment variable overriding the project root.
pub const PROJECT_ROOT_VAR: &str = "DEPLOY_PROJECT_ROOT";

/// Name of the optional key-value override file at the project root.
pub const ENV_FILE: &str = ".env.local";

/// Hosting API base URL.
pub const API_BASE_URL: &str = "https://api.github.com";

/// Branch names tried, in order, when pushing.
pub const BRANCH_CANDIDATES: [&str; 2] = ["main", "master"];

/// Directory the build step produces, relative to the project root.
pub const OUTPUT_DIR: &str = "dist";

/// Directory whose absence triggers dependency installation before the build.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Returns the default commit message, stamped with the local time.
pub fn commit_message() -> String {
    format!("Update: {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

/// Returns the public pages URL for an account and repository.
///
/// Pages hosts are case-insensitive and always served lowercase, so the
/// account part is lowercased.
pub fn public_url(account: &str, repo: &str) -> String {
    format!("https://{}.github.io/{}", account.to_lowercase(), repo)
}
