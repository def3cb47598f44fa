//! # Credential Resolution
//!
//! Secrets and identifiers come from the process environment, optionally
//! pre-seeded from a `.env.local` file at the project root. The file is read
//! once; a variable already present in the environment always wins over the
//! file, even when it is set to an empty string.
//!
//! The result is an immutable `CredentialStore` snapshot that is passed
//! explicitly to whatever needs it. Nothing here writes to the process
//! environment.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::error::Result;

/// Parse `KEY=VALUE` lines.
///
/// Blank lines, `#` comments and lines without `=` are skipped. Keys and
/// values are trimmed and one pair of matching surrounding quotes is removed
/// from the value. Later duplicates override earlier ones.
pub fn parse_env_file(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Outcome of resolving a list of required names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub missing_names: Vec<String>,
}

impl Resolution {
    pub fn all_resolved(&self) -> bool {
        self.missing_names.is_empty()
    }
}

/// Read-only view of the configuration variables for one run.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    values: HashMap<String, String>,
}

impl CredentialStore {
    /// Snapshot the process environment, seeded from `env_file` if it exists.
    pub fn load(env_file: &Path) -> Result<Self> {
        let overrides = match fs::read_to_string(env_file) {
            Ok(content) => {
                debug!("loaded overrides from {}", env_file.display());
                parse_env_file(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        // Non-UTF-8 entries can never be a credential we look up.
        let environment = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Ok(Self::from_sources(environment, overrides))
    }

    /// Build a store from explicit environment and override pairs.
    ///
    /// An override only applies when the environment does not have the key.
    pub fn from_sources<E, O>(environment: E, overrides: O) -> Self
    where
        E: IntoIterator<Item = (String, String)>,
        O: IntoIterator<Item = (String, String)>,
    {
        let mut values: HashMap<String, String> = environment.into_iter().collect();
        for (key, value) in overrides {
            values.entry(key).or_insert(value);
        }
        Self { values }
    }

    /// The value for `name`, treating an empty string as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Check that every name in `names` resolves to a non-empty value.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Resolution {
        Resolution {
            missing_names: names
                .iter()
                .map(AsRef::as_ref)
                .filter(|name| self.get(name).is_none())
                .map(str::to_string)
                .collect(),
        }
    }
}
