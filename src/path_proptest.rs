//! Property-based tests for path manipulation functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{base_dir, derive_path, shell_quote, ProjectFilter};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    // ============================================================================
    // base_dir property tests
    // ============================================================================

    proptest! {
        /// Property: the project directory is always the first segment
        #[test]
        fn base_dir_is_first_segment(
            first in "[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,12}",
            rest in proptest::collection::vec("[a-zA-Z0-9_.-]{1,8}", 0..4),
        ) {
            prop_assume!(first != "." && first != "..");
            let mut path = PathBuf::from(&first);
            for segment in &rest {
                prop_assume!(segment != "." && segment != "..");
                path.push(segment);
            }
            prop_assert_eq!(base_dir(&path), Some(first));
        }

        /// Property: a leading ./ never changes the project directory
        #[test]
        fn base_dir_ignores_leading_curdir(name in "[a-z]{1,8}", file in "[a-z]{1,8}\\.bc") {
            let plain = format!("{}/{}", name, file);
            let dotted = format!("./{}/{}", name, file);
            prop_assert_eq!(base_dir(Path::new(&plain)), base_dir(Path::new(&dotted)));
        }
    }

    // ============================================================================
    // derive_path property tests
    // ============================================================================

    proptest! {
        /// Property: derived paths stay in the same directory
        #[test]
        fn derive_path_keeps_parent(dir in "[a-z]{1,6}(/[a-z]{1,6}){0,3}", stem in "[a-z]{1,8}") {
            let input = PathBuf::from(&dir).join(format!("{}.bc", stem));
            let derived = derive_path(&input, "-strip.bc");
            prop_assert_eq!(derived.parent(), input.parent());
            prop_assert_eq!(derived.file_name().unwrap().to_string_lossy(), format!("{}-strip.bc", stem));
        }

        /// Property: derived paths keep the project directory of their input
        #[test]
        fn derive_path_keeps_project(project in "[a-z]{1,8}", stem in "[a-z]{1,8}", level in "[0-3sz]") {
            let input = PathBuf::from(&project).join(format!("{}.bc", stem));
            let derived = derive_path(&input, &format!("-O{}.bc", level));
            prop_assert_eq!(base_dir(&derived), Some(project));
        }
    }

    // ============================================================================
    // shell_quote property tests
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: bash reads a quoted value back as the original string
        #[test]
        fn shell_quote_round_trips_through_bash(value in "[ -~]{0,24}") {
            let script = format!("printf '%s' {}", shell_quote(&value));
            let output = Command::new("bash").arg("-c").arg(&script).output().unwrap();
            prop_assert_eq!(String::from_utf8_lossy(&output.stdout).into_owned(), value);
        }
    }

    // ============================================================================
    // ProjectFilter property tests
    // ============================================================================

    proptest! {
        /// Property: allow and deny with the same list partition the input
        #[test]
        fn allow_and_deny_partition(
            projects in proptest::collection::vec("[a-d]", 0..12),
            listed in proptest::collection::vec("[a-d]", 0..3),
        ) {
            let paths: Vec<PathBuf> = projects.iter().map(|p| PathBuf::from(p).join("x.bc")).collect();
            let allowed = ProjectFilter::Allow(listed.clone()).apply(paths.clone());
            let denied = ProjectFilter::Deny(listed).apply(paths.clone());
            prop_assert_eq!(allowed.len() + denied.len(), paths.len());
            for p in &allowed {
                prop_assert!(!denied.contains(p));
            }
        }
    }
}
