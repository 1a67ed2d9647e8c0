//! Reference extraction: turns a revision range into a cross-reference
//! dataset of fix/revert edges and upstream equivalences.

mod patterns;

use std::collections::{BTreeSet, HashMap};

use fixgap_core::{CommitInfo, CommitSource, RepoError, XrefDataset, XrefRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Scans every commit in `range` and builds the cross-reference dataset.
///
/// Two passes over the same commits: the first collects upstream
/// equivalences for the whole range, the second emits one row per
/// detected reference edge, in reverse-chronological commit order. A
/// commit without references is stamped with a single empty-reference
/// row; a commit whose only detected reference was itself produces no
/// row at all.
///
/// # Errors
///
/// Fails only when the range cannot be resolved. Unresolvable or
/// self-referencing identifiers inside messages are logged and skipped.
pub fn extract(source: &impl CommitSource, range: &str) -> Result<XrefDataset, ExtractError> {
    let commits = source.resolve_range(range)?;
    tracing::info!(range, commits = commits.len(), "scanning commit history");

    let upstream_index = build_upstream_index(source, &commits);

    let mut rows = Vec::new();
    for commit in &commits {
        stamp_commit(source, commit, &upstream_index, &mut rows);
    }

    Ok(XrefDataset::new(rows))
}

/// Maps each commit to the upstream commit it claims to backport.
///
/// At most one upstream id is recorded per commit; identifiers the
/// repository cannot resolve are discarded, and no key ever maps to
/// itself.
fn build_upstream_index(
    source: &impl CommitSource,
    commits: &[CommitInfo],
) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for commit in commits {
        let Some(candidate) = patterns::upstream_sha(&commit.message) else {
            continue;
        };
        let Some(upstream) = source.resolve_identifier(candidate) else {
            continue;
        };
        if upstream == commit.hexsha {
            continue;
        }
        index.insert(commit.hexsha.clone(), upstream);
    }
    index
}

/// Resolved identifiers referenced by fixes/revert tags in the message.
/// Duplicates collapse; order is normalized for deterministic output.
fn find_references(source: &impl CommitSource, commit: &CommitInfo) -> BTreeSet<String> {
    let mut references = BTreeSet::new();
    for line in commit.message.lines() {
        let Some(candidate) = patterns::referenced_sha(line) else {
            continue;
        };
        match source.resolve_identifier(candidate) {
            Some(full) => {
                references.insert(full);
            }
            None => tracing::info!(
                commit = %commit.hexsha,
                reference = candidate,
                "dropping unresolvable commit reference"
            ),
        }
    }
    references
}

fn stamp_commit(
    source: &impl CommitSource,
    commit: &CommitInfo,
    upstream_index: &HashMap<String, String>,
    rows: &mut Vec<XrefRow>,
) {
    let references = find_references(source, commit);

    if references.is_empty() {
        rows.push(make_row(commit, None, upstream_index));
        return;
    }

    for reference in references {
        if reference == commit.hexsha {
            // Dropped without a replacement stamping row; see DESIGN.md.
            tracing::warn!(commit = %commit.hexsha, "ignoring self-referencing fix tag");
            continue;
        }
        let refcommit = source.lookup_commit(&reference);
        rows.push(make_row(commit, refcommit.as_ref(), upstream_index));
    }
}

fn make_row(
    commit: &CommitInfo,
    refcommit: Option<&CommitInfo>,
    upstream_index: &HashMap<String, String>,
) -> XrefRow {
    XrefRow {
        commit_hexsha: commit.hexsha.clone(),
        commit_summary: commit.summary.clone(),
        commit_datetime: commit.datetime,
        commit_upstream_hexsha: upstream_index.get(&commit.hexsha).cloned(),
        refcommit_hexsha: refcommit.map(|info| info.hexsha.clone()),
        refcommit_datetime: refcommit.map(|info| info.datetime),
        refcommit_upstream_hexsha: refcommit
            .and_then(|info| upstream_index.get(&info.hexsha).cloned()),
    }
}
