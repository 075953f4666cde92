//! Merge planner - decides how a candidate is folded into an installation
//!
//! Planning is pure: it reads snapshots and the local diff and returns a
//! [`MergePlan`]. Nothing touches the filesystem until the plan is handed to
//! the executor.

use crate::context::PathClassifier;
use crate::layout;
use crate::types::{
    DiffEntry, FileConflict, FsDiff, MergePlan, PlannedAction, Resolution, UpdateChange,
    UserChange,
};
use manifest::TreeSnapshot;
use std::collections::BTreeSet;

/// Inputs of a merge
pub struct MergeInput<'a> {
    /// Local drift of the installation since its baseline
    pub diff: &'a FsDiff,
    /// Candidate tree, without bookkeeping
    pub candidate: &'a TreeSnapshot,
    /// Installation tree as it is now, without bookkeeping
    pub installation: &'a TreeSnapshot,
}

/// Build the merge plan
///
/// Actions are ordered: clearing of paths that change between file and
/// directory, per-path conflict handling (in path order), then directory
/// creation, installs, file deletions and finally directory removals,
/// deepest first.
pub fn plan<C: PathClassifier + ?Sized>(input: &MergeInput<'_>, system: &C) -> MergePlan {
    let mut plan = MergePlan::default();

    let cleared = clear_type_changes(input, system, &mut plan);

    for entry in input.diff.entries() {
        if cleared.covers(entry.path()) {
            continue;
        }
        resolve_entry(entry, input.candidate, system, &mut plan);
    }

    sync_untouched(input, &cleared, &mut plan);

    log::debug!(
        "Planned {} actions, {} conflicts",
        plan.actions.len(),
        plan.conflicts.len()
    );
    plan
}

/// Paths settled while clearing file/directory type changes
#[derive(Default)]
struct Cleared {
    /// Files deleted, or candidate files already decided
    files: BTreeSet<String>,
    /// Directories removed
    dirs: BTreeSet<String>,
    /// Directories renamed to `<dir>.glold`
    moved: Vec<String>,
}

impl Cleared {
    fn covers(&self, path: &str) -> bool {
        self.files.contains(path) || self.is_moved(path)
    }

    fn is_moved(&self, path: &str) -> bool {
        self.moved
            .iter()
            .any(|dir| path == dir || path.starts_with(&format!("{dir}/")))
    }
}

/// Make room where a path is a file on one side and a directory on the other
///
/// A candidate directory always replaces an installation file, saving a
/// user-owned file as `.glold` first. A candidate file replaces an
/// installation directory whose files are all untouched. A directory holding
/// user files is moved aside for a system path. Otherwise it stays and the
/// candidate's file is saved as `.glnew`.
fn clear_type_changes<C: PathClassifier + ?Sized>(
    input: &MergeInput<'_>,
    system: &C,
    plan: &mut MergePlan,
) -> Cleared {
    let MergeInput {
        diff,
        candidate,
        installation,
    } = input;
    let mut cleared = Cleared::default();

    for path in installation.files.keys() {
        if !candidate.contains_dir(path) || layout::is_bookkeeping(path) {
            continue;
        }
        if let Some(entry) = diff.get(path) {
            plan.actions.push(PlannedAction::SaveUserCopy(path.clone()));
            push_conflict(
                plan,
                path,
                entry.user_change(),
                UpdateChange::Removed,
                Resolution::Overwritten,
            );
        }
        log::debug!("{path} becomes a directory");
        plan.actions.push(PlannedAction::DeleteFile(path.clone()));
        cleared.files.insert(path.clone());
    }

    for path in candidate.files.keys() {
        if !installation.contains_dir(path) || layout::is_bookkeeping(path) {
            continue;
        }
        let user_owned = installation
            .files_under(path)
            .any(|f| diff.contains(f) || layout::is_sentinel(f));

        if !user_owned {
            log::debug!("{path} becomes a file");
            for file in installation.files_under(path) {
                plan.actions.push(PlannedAction::DeleteFile(file.to_string()));
                cleared.files.insert(file.to_string());
            }
            let mut dirs: Vec<&str> = installation.dirs_under(path).collect();
            dirs.reverse();
            dirs.push(path);
            for dir in dirs {
                plan.actions.push(PlannedAction::DeleteDir(dir.to_string()));
                cleared.dirs.insert(dir.to_string());
            }
        } else if system.is_system_path(path) {
            plan.actions.push(PlannedAction::MoveAside(path.clone()));
            plan.actions.push(PlannedAction::Install(path.clone()));
            push_conflict(
                plan,
                path,
                UserChange::Added,
                UpdateChange::Added,
                Resolution::Overwritten,
            );
            cleared.moved.push(path.clone());
        } else if !diff.contains(path) {
            plan.actions
                .push(PlannedAction::SaveCandidateCopy(path.clone()));
            push_conflict(
                plan,
                path,
                UserChange::Added,
                UpdateChange::Added,
                Resolution::UserPreserved,
            );
            cleared.files.insert(path.clone());
        }
    }

    cleared
}

/// Decide one locally changed path
fn resolve_entry<C: PathClassifier + ?Sized>(
    entry: &DiffEntry,
    candidate: &TreeSnapshot,
    system: &C,
    plan: &mut MergePlan,
) {
    let path = entry.path();
    let incoming = candidate.hash_of(path);
    let is_system = system.is_system_path(path);

    match entry {
        DiffEntry::Removed { baseline, .. } => {
            let Some(incoming) = incoming else {
                return;
            };
            let update = if incoming == baseline {
                UpdateChange::Unchanged
            } else {
                UpdateChange::Modified
            };
            if is_system {
                plan.actions.push(PlannedAction::Install(path.to_string()));
                push_conflict(plan, path, UserChange::Removed, update, Resolution::Overwritten);
            } else if update == UpdateChange::Modified {
                plan.actions
                    .push(PlannedAction::SaveCandidateCopy(path.to_string()));
                push_conflict(plan, path, UserChange::Removed, update, Resolution::UserPreserved);
            }
        }
        DiffEntry::Added { current, .. } => match incoming {
            Some(incoming) if incoming != current => {
                diverged(plan, path, UserChange::Added, UpdateChange::Added, is_system);
            }
            _ => {}
        },
        DiffEntry::Modified {
            baseline, current, ..
        } => match incoming {
            Some(incoming) if incoming == current => {}
            None if is_system => {
                plan.actions.push(PlannedAction::SaveUserCopy(path.to_string()));
                plan.actions.push(PlannedAction::DeleteFile(path.to_string()));
                push_conflict(
                    plan,
                    path,
                    UserChange::Modified,
                    UpdateChange::Removed,
                    Resolution::Overwritten,
                );
            }
            None => push_conflict(
                plan,
                path,
                UserChange::Modified,
                UpdateChange::Removed,
                Resolution::UserPreserved,
            ),
            Some(incoming) if incoming == baseline => {
                if is_system {
                    plan.actions.push(PlannedAction::SaveUserCopy(path.to_string()));
                    plan.actions.push(PlannedAction::Install(path.to_string()));
                    push_conflict(
                        plan,
                        path,
                        UserChange::Modified,
                        UpdateChange::Unchanged,
                        Resolution::Overwritten,
                    );
                }
            }
            Some(_) => diverged(
                plan,
                path,
                UserChange::Modified,
                UpdateChange::Modified,
                is_system,
            ),
        },
    }
}

/// Both sides changed the content of `path` differently
fn diverged(
    plan: &mut MergePlan,
    path: &str,
    user: UserChange,
    update: UpdateChange,
    is_system: bool,
) {
    if is_system {
        plan.actions.push(PlannedAction::SaveUserCopy(path.to_string()));
        plan.actions.push(PlannedAction::Install(path.to_string()));
        push_conflict(plan, path, user, update, Resolution::Overwritten);
    } else {
        plan.actions
            .push(PlannedAction::SaveCandidateCopy(path.to_string()));
        push_conflict(plan, path, user, update, Resolution::UserPreserved);
    }
}

fn push_conflict(
    plan: &mut MergePlan,
    path: &str,
    user: UserChange,
    update: UpdateChange,
    resolution: Resolution,
) {
    log::debug!("Conflict on {path}: user {user}, update {update} -> {resolution}");
    plan.conflicts
        .push(FileConflict::new(path, user, update, resolution));
}

/// Bring every path the user did not touch in line with the candidate
fn sync_untouched(input: &MergeInput<'_>, cleared: &Cleared, plan: &mut MergePlan) {
    let MergeInput {
        diff,
        candidate,
        installation,
    } = input;

    let ignored = |path: &str| {
        diff.contains(path)
            || cleared.covers(path)
            || layout::is_sentinel(path)
            || layout::is_bookkeeping(path)
    };

    // Directories the user emptied by deleting files stay deleted
    let user_removed: Vec<&str> = diff
        .entries()
        .filter(|e| matches!(e, DiffEntry::Removed { .. }))
        .map(DiffEntry::path)
        .collect();

    for dir in &candidate.dirs {
        if installation.contains_dir(dir) || layout::is_bookkeeping(dir) {
            continue;
        }
        let prefix = format!("{dir}/");
        if user_removed.iter().any(|p| p.starts_with(&prefix)) {
            continue;
        }
        plan.actions.push(PlannedAction::CreateDir(dir.clone()));
    }

    for (path, hash) in &candidate.files {
        if ignored(path) {
            continue;
        }
        if installation.hash_of(path) != Some(hash.as_str()) {
            plan.actions.push(PlannedAction::Install(path.clone()));
        }
    }

    for path in installation.files.keys() {
        if ignored(path) || candidate.contains_file(path) {
            continue;
        }
        plan.actions.push(PlannedAction::DeleteFile(path.clone()));
    }

    plan_dir_removals(installation, candidate, cleared, plan);
}

/// Remove installation directories that the deletions leave empty
fn plan_dir_removals(
    installation: &TreeSnapshot,
    candidate: &TreeSnapshot,
    cleared: &Cleared,
    plan: &mut MergePlan,
) {
    let deleted: BTreeSet<&str> = plan
        .actions
        .iter()
        .filter_map(|a| match a {
            PlannedAction::DeleteFile(p) => Some(p.as_str()),
            _ => None,
        })
        .collect();

    // Files the plan writes that the installation snapshot does not know about
    let written: Vec<String> = plan
        .actions
        .iter()
        .filter_map(|a| match a {
            PlannedAction::SaveUserCopy(p) => Some(layout::user_copy_of(p)),
            PlannedAction::SaveCandidateCopy(p) => Some(layout::candidate_copy_of(p)),
            PlannedAction::Install(p) => Some(p.clone()),
            _ => None,
        })
        .collect();

    let mut removed: BTreeSet<String> = cleared.dirs.clone();
    let mut removals = Vec::new();

    // Reverse lexical order visits children before their parents
    for dir in installation.dirs.iter().rev() {
        if candidate.contains_dir(dir)
            || layout::is_bookkeeping(dir)
            || removed.contains(dir)
            || cleared.is_moved(dir)
        {
            continue;
        }
        let mut files = installation.files_under(dir).peekable();
        if files.peek().is_none() {
            continue;
        }
        if !files.all(|f| deleted.contains(f)) {
            continue;
        }
        let prefix = format!("{dir}/");
        if written.iter().any(|w| w.starts_with(&prefix)) {
            continue;
        }
        if !installation.dirs_under(dir).all(|d| removed.contains(d)) {
            continue;
        }
        removed.insert(dir.clone());
        removals.push(PlannedAction::DeleteDir(dir.clone()));
    }

    plan.actions.extend(removals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoSystemPaths;
    use manifest::hash_bytes;

    fn tree(files: &[(&str, &str)]) -> TreeSnapshot {
        let mut tree = TreeSnapshot::default();
        for (path, content) in files {
            tree.files.insert(path.to_string(), hash_bytes(content.as_bytes()));
            let mut parent = *path;
            while let Some((dir, _)) = parent.rsplit_once('/') {
                tree.dirs.insert(dir.to_string());
                parent = dir;
            }
        }
        tree
    }

    fn h(content: &str) -> String {
        hash_bytes(content.as_bytes())
    }

    fn removed(path: &str, baseline: &str) -> DiffEntry {
        DiffEntry::Removed {
            path: path.into(),
            baseline: h(baseline),
        }
    }

    fn added(path: &str, current: &str) -> DiffEntry {
        DiffEntry::Added {
            path: path.into(),
            current: h(current),
        }
    }

    fn modified(path: &str, baseline: &str, current: &str) -> DiffEntry {
        DiffEntry::Modified {
            path: path.into(),
            baseline: h(baseline),
            current: h(current),
        }
    }

    fn run(
        diff: Vec<DiffEntry>,
        candidate: &[(&str, &str)],
        installation: &[(&str, &str)],
        system: &[&str],
    ) -> MergePlan {
        let diff = FsDiff::from_entries(diff);
        let candidate = tree(candidate);
        let installation = tree(installation);
        let system: Vec<String> = system.iter().map(|s| s.to_string()).collect();
        let classifier = move |p: &str| system.iter().any(|s| s == p);
        plan(
            &MergeInput {
                diff: &diff,
                candidate: &candidate,
                installation: &installation,
            },
            &classifier,
        )
    }

    fn conflict(
        path: &str,
        user: UserChange,
        update: UpdateChange,
        r: Resolution,
    ) -> FileConflict {
        FileConflict::new(path, user, update, r)
    }

    fn install(p: &str) -> PlannedAction {
        PlannedAction::Install(p.into())
    }

    #[test]
    fn test_no_changes_empty_plan() {
        let files = [("a.txt", "a"), ("conf/b.xml", "b")];
        let plan = run(vec![], &files, &files, &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_removed_absent_in_candidate() {
        let plan = run(vec![removed("x", "1")], &[], &[], &["x"]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_removed_unchanged_non_system_stays_removed() {
        let plan = run(vec![removed("x", "1")], &[("x", "1")], &[], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_removed_unchanged_system_restored() {
        let plan = run(vec![removed("x", "1")], &[("x", "1")], &[], &["x"]);
        assert_eq!(plan.actions, vec![install("x")]);
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "x",
                UserChange::Removed,
                UpdateChange::Unchanged,
                Resolution::Overwritten
            )]
        );
    }

    #[test]
    fn test_removed_changed_non_system_saves_candidate_copy() {
        let plan = run(vec![removed("x", "1")], &[("x", "2")], &[], &[]);
        assert_eq!(plan.actions, vec![PlannedAction::SaveCandidateCopy("x".into())]);
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "x",
                UserChange::Removed,
                UpdateChange::Modified,
                Resolution::UserPreserved
            )]
        );
    }

    #[test]
    fn test_removed_changed_system_installed() {
        let plan = run(vec![removed("x", "1")], &[("x", "2")], &[], &["x"]);
        assert_eq!(plan.actions, vec![install("x")]);
        assert_eq!(plan.conflicts[0].update, UpdateChange::Modified);
        assert!(plan.conflicts[0].is_overwritten());
    }

    #[test]
    fn test_added_not_in_candidate_untouched() {
        let plan = run(vec![added("mine.txt", "u")], &[], &[("mine.txt", "u")], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_added_same_content_no_conflict() {
        let plan = run(vec![added("x", "u")], &[("x", "u")], &[("x", "u")], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_added_diverged_non_system() {
        let plan = run(vec![added("x", "u")], &[("x", "c")], &[("x", "u")], &[]);
        assert_eq!(plan.actions, vec![PlannedAction::SaveCandidateCopy("x".into())]);
        assert_eq!(
            plan.conflicts,
            vec![conflict("x", UserChange::Added, UpdateChange::Added, Resolution::UserPreserved)]
        );
    }

    #[test]
    fn test_added_diverged_system() {
        let plan = run(vec![added("x", "u")], &[("x", "c")], &[("x", "u")], &["x"]);
        assert_eq!(
            plan.actions,
            vec![PlannedAction::SaveUserCopy("x".into()), install("x")]
        );
        assert!(plan.conflicts[0].is_overwritten());
    }

    #[test]
    fn test_modified_candidate_matches_user() {
        let plan = run(vec![modified("x", "b", "u")], &[("x", "u")], &[("x", "u")], &["x"]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_modified_candidate_missing_non_system() {
        let plan = run(vec![modified("x", "b", "u")], &[], &[("x", "u")], &[]);
        assert!(plan.actions.is_empty());
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "x",
                UserChange::Modified,
                UpdateChange::Removed,
                Resolution::UserPreserved
            )]
        );
    }

    #[test]
    fn test_modified_candidate_missing_system() {
        let plan = run(vec![modified("x", "b", "u")], &[], &[("x", "u")], &["x"]);
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::SaveUserCopy("x".into()),
                PlannedAction::DeleteFile("x".into())
            ]
        );
        assert!(plan.conflicts[0].is_overwritten());
    }

    #[test]
    fn test_modified_candidate_equals_baseline_non_system() {
        let plan = run(vec![modified("x", "b", "u")], &[("x", "b")], &[("x", "u")], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_modified_candidate_equals_baseline_system() {
        let plan = run(vec![modified("x", "b", "u")], &[("x", "b")], &[("x", "u")], &["x"]);
        assert_eq!(
            plan.actions,
            vec![PlannedAction::SaveUserCopy("x".into()), install("x")]
        );
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "x",
                UserChange::Modified,
                UpdateChange::Unchanged,
                Resolution::Overwritten
            )]
        );
    }

    #[test]
    fn test_modified_true_divergence() {
        let user = run(vec![modified("x", "b", "u")], &[("x", "c")], &[("x", "u")], &[]);
        assert_eq!(user.actions, vec![PlannedAction::SaveCandidateCopy("x".into())]);
        assert_eq!(user.conflicts[0].update, UpdateChange::Modified);
        assert_eq!(user.conflicts[0].resolution, Resolution::UserPreserved);

        let system = run(vec![modified("x", "b", "u")], &[("x", "c")], &[("x", "u")], &["x"]);
        assert_eq!(system.conflicts[0].resolution, Resolution::Overwritten);
    }

    #[test]
    fn test_bulk_install_and_delete() {
        let plan = run(
            vec![],
            &[("keep", "k"), ("changed", "new"), ("lib/new.jar", "n")],
            &[("keep", "k"), ("changed", "old"), ("obsolete", "o")],
            &[],
        );
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::CreateDir("lib".into()),
                install("changed"),
                install("lib/new.jar"),
                PlannedAction::DeleteFile("obsolete".into()),
            ]
        );
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn test_bulk_skips_sentinels_and_user_files() {
        let plan = run(
            vec![added("mine.txt", "u")],
            &[],
            &[("mine.txt", "u"), ("conf/a.xml.glnew", "c"), ("conf/b.xml.glold", "o")],
            &[],
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_dirs_removed_deepest_first() {
        let plan = run(
            vec![],
            &[("keep", "k")],
            &[("keep", "k"), ("old/a", "1"), ("old/sub/b", "2")],
            &[],
        );
        let dirs: Vec<_> = plan
            .actions
            .iter()
            .filter(|a| matches!(a, PlannedAction::DeleteDir(_)))
            .cloned()
            .collect();
        assert_eq!(
            dirs,
            vec![
                PlannedAction::DeleteDir("old/sub".into()),
                PlannedAction::DeleteDir("old".into())
            ]
        );
        // Directory removals come last
        assert!(matches!(plan.actions.last(), Some(PlannedAction::DeleteDir(_))));
    }

    #[test]
    fn test_dir_with_user_file_kept() {
        let plan = run(
            vec![added("old/mine.txt", "u")],
            &[],
            &[("old/a", "1"), ("old/mine.txt", "u")],
            &[],
        );
        assert_eq!(plan.actions, vec![PlannedAction::DeleteFile("old/a".into())]);
    }

    #[test]
    fn test_dir_receiving_sentinel_kept() {
        let plan = run(
            vec![modified("old/conf.xml", "b", "u")],
            &[],
            &[("old/conf.xml", "u")],
            &["old/conf.xml"],
        );
        assert!(!plan.actions.iter().any(|a| matches!(a, PlannedAction::DeleteDir(_))));
    }

    #[test]
    fn test_user_removed_dir_not_recreated() {
        let plan = run(
            vec![removed("docs/readme", "r")],
            &[("docs/readme", "r")],
            &[],
            &[],
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let make = || {
            run(
                vec![added("b", "u"), modified("a", "1", "2"), removed("c", "3")],
                &[("a", "9"), ("b", "8"), ("c", "7"), ("d", "6")],
                &[("a", "2"), ("b", "u"), ("e", "5")],
                &["b"],
            )
        };
        assert_eq!(make(), make());
        let paths: Vec<_> = make().conflicts.iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_system_paths_classifier() {
        let diff = FsDiff::from_entries([added("x", "u")]);
        let candidate = tree(&[("x", "c")]);
        let installation = tree(&[("x", "u")]);
        let plan = plan(
            &MergeInput {
                diff: &diff,
                candidate: &candidate,
                installation: &installation,
            },
            &NoSystemPaths,
        );
        assert_eq!(plan.conflicts[0].resolution, Resolution::UserPreserved);
    }

    #[test]
    fn test_file_replaced_by_candidate_dir() {
        let plan = run(vec![], &[("lib/foo/a.jar", "1")], &[("lib/foo", "file")], &[]);
        assert!(plan.conflicts.is_empty());
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::DeleteFile("lib/foo".into()),
                PlannedAction::CreateDir("lib/foo".into()),
                install("lib/foo/a.jar"),
            ]
        );
    }

    #[test]
    fn test_user_file_saved_before_candidate_dir() {
        let plan = run(
            vec![modified("lib/foo", "0", "file")],
            &[("lib/foo/a.jar", "1")],
            &[("lib/foo", "file")],
            &[],
        );
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "lib/foo",
                UserChange::Modified,
                UpdateChange::Removed,
                Resolution::Overwritten
            )]
        );
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::SaveUserCopy("lib/foo".into()),
                PlannedAction::DeleteFile("lib/foo".into()),
                PlannedAction::CreateDir("lib/foo".into()),
                install("lib/foo/a.jar"),
            ]
        );
    }

    #[test]
    fn test_dir_replaced_by_candidate_file() {
        let plan = run(
            vec![],
            &[("lib/foo", "file")],
            &[("lib/foo/a.jar", "1"), ("lib/foo/sub/b.jar", "2")],
            &[],
        );
        assert!(plan.conflicts.is_empty());
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::DeleteFile("lib/foo/a.jar".into()),
                PlannedAction::DeleteFile("lib/foo/sub/b.jar".into()),
                PlannedAction::DeleteDir("lib/foo/sub".into()),
                PlannedAction::DeleteDir("lib/foo".into()),
                install("lib/foo"),
            ]
        );
    }

    #[test]
    fn test_user_dir_moved_aside_for_system_file() {
        let plan = run(
            vec![added("lib/foo/mine.jar", "u")],
            &[("lib/foo", "file")],
            &[("lib/foo/mine.jar", "u")],
            &["lib/foo"],
        );
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "lib/foo",
                UserChange::Added,
                UpdateChange::Added,
                Resolution::Overwritten
            )]
        );
        assert_eq!(
            plan.actions,
            vec![PlannedAction::MoveAside("lib/foo".into()), install("lib/foo")]
        );
    }

    #[test]
    fn test_user_dir_kept_for_non_system_file() {
        let plan = run(
            vec![added("lib/foo/mine.jar", "u")],
            &[("lib/foo", "file")],
            &[("lib/foo/mine.jar", "u"), ("lib/foo/a.jar", "1")],
            &[],
        );
        assert_eq!(
            plan.conflicts,
            vec![conflict(
                "lib/foo",
                UserChange::Added,
                UpdateChange::Added,
                Resolution::UserPreserved
            )]
        );
        assert_eq!(
            plan.actions,
            vec![
                PlannedAction::SaveCandidateCopy("lib/foo".into()),
                PlannedAction::DeleteFile("lib/foo/a.jar".into()),
            ]
        );
    }
}
