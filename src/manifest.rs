//! # Deploy Manifest and Path Validation
//!
//! A `DeployManifest` is the fixed list of files and directories a pipeline
//! variant needs before it touches version control. `check_manifest` compares
//! it against the filesystem and reports what is present and what is missing,
//! in declaration order with files before directories.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Whether a manifest entry is expected to be a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Required files and directories, relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployManifest {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

impl DeployManifest {
    pub fn new<F, D>(files: F, directories: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<PathBuf>,
        D: IntoIterator,
        D::Item: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            directories: directories.into_iter().map(Into::into).collect(),
        }
    }

    /// Manifest for publishing build output to the pages branch.
    pub fn pages_branch() -> Self {
        Self::new(["package.json", "index.html", "vite.config.ts"], ["components"])
    }

    /// Manifest for pushing the full source tree to the default branch.
    pub fn full_source() -> Self {
        Self::new(
            [
                "package.json",
                "index.html",
                "vite.config.ts",
                "tsconfig.json",
                "App.tsx",
            ],
            ["components", "components/ui"],
        )
    }

    /// All entries in check order: files first, then directories.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, EntryKind)> {
        self.files
            .iter()
            .map(|p| (p.as_path(), EntryKind::File))
            .chain(
                self.directories
                    .iter()
                    .map(|p| (p.as_path(), EntryKind::Directory)),
            )
    }
}

/// A manifest entry as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Recursive file count, reported for present directories only.
    pub file_count: Option<usize>,
}

/// Result of checking a manifest against the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestReport {
    pub present: Vec<ManifestEntry>,
    pub missing: Vec<ManifestEntry>,
}

impl ManifestReport {
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing entries rendered as display strings, in manifest order.
    pub fn missing_names(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|e| e.path.display().to_string())
            .collect()
    }
}

/// Check every manifest entry under `root`.
///
/// Files only need to exist. Directories must exist and be directories; a
/// present directory also gets a recursive file count for diagnostics.
pub fn check_manifest(root: &Path, manifest: &DeployManifest) -> ManifestReport {
    let mut report = ManifestReport::default();

    for (relative, kind) in manifest.entries() {
        let full = root.join(relative);
        let exists = match kind {
            EntryKind::File => full.exists(),
            EntryKind::Directory => full.is_dir(),
        };

        let file_count = match kind {
            EntryKind::Directory if exists => Some(count_files(&full)),
            _ => None,
        };

        let entry = ManifestEntry {
            path: relative.to_path_buf(),
            kind,
            file_count,
        };

        if exists {
            report.present.push(entry);
        } else {
            report.missing.push(entry);
        }
    }

    report
}

/// Count regular files under `dir`, recursively.
///
/// Unreadable entries are skipped rather than failing the count.
pub fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_all_present() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "package.json");
        touch(dir.path(), "components/Header.tsx");
        touch(dir.path(), "components/ui/Button.tsx");

        let manifest = DeployManifest::new(["package.json"], ["components"]);
        let report = check_manifest(dir.path(), &manifest);

        assert!(report.all_present());
        assert_eq!(report.present.len(), 2);
        assert_eq!(report.present[1].file_count, Some(2));
        assert_eq!(report.present[0].file_count, None);
    }

    #[test]
    fn test_missing_entries_reported_in_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.html");

        let manifest = DeployManifest::new(
            ["package.json", "index.html", "vite.config.ts"],
            ["components", "public"],
        );
        let report = check_manifest(dir.path(), &manifest);

        assert!(!report.all_present());
        assert_eq!(
            report.missing_names(),
            vec!["package.json", "vite.config.ts", "components", "public"]
        );
        assert_eq!(report.present.len(), 1);
    }

    #[test]
    fn test_file_in_place_of_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "components");

        let manifest = DeployManifest::new(Vec::<PathBuf>::new(), ["components"]);
        let report = check_manifest(dir.path(), &manifest);

        assert!(!report.all_present());
        assert_eq!(report.missing[0].kind, EntryKind::Directory);
    }

    #[test]
    fn test_directory_satisfies_file_entry() {
        // File entries are a plain existence check.
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("public")).unwrap();

        let manifest = DeployManifest::new(["public"], Vec::<PathBuf>::new());
        assert!(check_manifest(dir.path(), &manifest).all_present());
    }

    #[test]
    fn test_count_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "dist/index.html");
        touch(dir.path(), "dist/assets/app.js");
        touch(dir.path(), "dist/assets/app.css");
        fs::create_dir_all(dir.path().join("dist/empty")).unwrap();

        assert_eq!(count_files(&dir.path().join("dist")), 3);
    }

    #[test]
    fn test_variant_manifests_do_not_require_build_output() {
        for manifest in [DeployManifest::pages_branch(), DeployManifest::full_source()] {
            assert!(manifest.entries().all(|(p, _)| p != Path::new("dist")));
        }
    }
}
