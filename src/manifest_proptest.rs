//! Property-based tests for manifest checking.
//!
//! These tests generate random manifests and random filesystem snapshots and
//! verify that the reported missing entries are exactly the absent ones, in
//! manifest order.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::{check_manifest, DeployManifest};
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::fs;

    /// A manifest of up to 6 unique files and 6 unique directories, plus a
    /// presence flag per entry.
    fn manifest_with_presence(
    ) -> impl Strategy<Value = (Vec<(String, bool)>, Vec<(String, bool)>)> {
        (
            prop::collection::btree_set("f_[a-z]{1,8}", 0..6),
            prop::collection::btree_set("d_[a-z]{1,8}", 0..6),
        )
            .prop_flat_map(|(files, dirs)| {
                let files: Vec<String> = files.into_iter().collect();
                let dirs: Vec<String> = dirs.into_iter().collect();
                (
                    prop::collection::vec(any::<bool>(), files.len())
                        .prop_map(move |flags| {
                            files.iter().cloned().zip(flags).collect::<Vec<_>>()
                        }),
                    prop::collection::vec(any::<bool>(), dirs.len())
                        .prop_map(move |flags| {
                            dirs.iter().cloned().zip(flags).collect::<Vec<_>>()
                        }),
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: missing == exactly the absent entries, files before
        /// directories, each group in declaration order.
        #[test]
        fn missing_is_exactly_the_absent_entries((files, dirs) in manifest_with_presence()) {
            let root = tempfile::tempdir().unwrap();
            for (name, present) in &files {
                if *present {
                    fs::write(root.path().join(name), "x").unwrap();
                }
            }
            for (name, present) in &dirs {
                if *present {
                    fs::create_dir(root.path().join(name)).unwrap();
                }
            }

            let manifest = DeployManifest::new(
                files.iter().map(|(n, _)| n.clone()),
                dirs.iter().map(|(n, _)| n.clone()),
            );
            let report = check_manifest(root.path(), &manifest);

            let expected: Vec<String> = files
                .iter()
                .chain(dirs.iter())
                .filter(|(_, present)| !present)
                .map(|(n, _)| n.clone())
                .collect();

            prop_assert_eq!(report.missing_names(), expected.clone());
            prop_assert_eq!(report.all_present(), expected.is_empty());
            prop_assert_eq!(report.present.len() + report.missing.len(), files.len() + dirs.len());
        }

        /// Property: present and missing never overlap
        #[test]
        fn present_and_missing_are_disjoint((files, dirs) in manifest_with_presence()) {
            let root = tempfile::tempdir().unwrap();
            for (name, present) in files.iter().chain(dirs.iter()) {
                if *present {
                    fs::create_dir(root.path().join(name)).unwrap();
                }
            }

            let manifest = DeployManifest::new(
                files.iter().map(|(n, _)| n.clone()),
                dirs.iter().map(|(n, _)| n.clone()),
            );
            let report = check_manifest(root.path(), &manifest);

            let present: BTreeSet<_> = report.present.iter().map(|e| e.path.clone()).collect();
            let missing: BTreeSet<_> = report.missing.iter().map(|e| e.path.clone()).collect();
            prop_assert!(present.is_disjoint(&missing));
        }
    }
}
