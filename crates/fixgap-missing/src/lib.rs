//! Missing-fix correlation: given a target dataset and a reference
//! dataset, finds fixes present on the reference side whose fixed
//! commit is confirmed present in the target while the fix itself is
//! not.

mod blacklist;

use std::collections::{HashMap, HashSet};

use fixgap_core::{MissingFixCandidate, XrefDataset, XrefRow};

pub use blacklist::{Blacklist, BlacklistError};

/// Which target-side column a correlation pass keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKey {
    /// The target commit's upstream identifier: catches fixes whose tag
    /// names the upstream form of a commit the target backported.
    Upstream,
    /// The target commit's own identifier: catches fixes whose tag
    /// names a commit the target carries directly.
    Local,
}

/// Computes missing-fix candidates for `target` based on the reference
/// edges recorded in `reference`.
///
/// Runs the upstream-keyed pass and the local-keyed pass and
/// concatenates their results; a fix that both passes discover is
/// intentionally reported twice. When a blacklist is supplied,
/// candidates whose missing-commit upstream identifier contains any
/// entry are dropped. An empty result means the audit is clean.
pub fn find_missing(
    target: &XrefDataset,
    reference: &XrefDataset,
    blacklist: Option<&Blacklist>,
) -> Vec<MissingFixCandidate> {
    let mut candidates = missing_fixes_based_on(target, TargetKey::Upstream, reference);
    candidates.extend(missing_fixes_based_on(target, TargetKey::Local, reference));
    tracing::debug!(candidates = candidates.len(), "correlation passes finished");

    if let Some(blacklist) = blacklist {
        let before = candidates.len();
        candidates.retain(|candidate| {
            !candidate
                .missing_commit_upstream
                .as_deref()
                .is_some_and(|upstream| blacklist.matches(upstream))
        });
        tracing::debug!(removed = before - candidates.len(), "blacklist applied");
    }

    candidates
}

/// One correlation pass: inner-join reference edges onto the chosen
/// target key column, then anti-join away fixes already present in the
/// target.
fn missing_fixes_based_on(
    target: &XrefDataset,
    key: TargetKey,
    reference: &XrefDataset,
) -> Vec<MissingFixCandidate> {
    let target_sel = dedup_last(target.rows(), |row| target_key(row, key));
    let reference_sel = dedup_last(reference.rows(), |row| row.refcommit_hexsha.as_deref());

    let target_keys: HashSet<&str> = target_sel.iter().map(|(key, _)| *key).collect();
    let reference_by_key: HashMap<&str, &XrefRow> = reference_sel
        .iter()
        .map(|(key, row)| (*key, *row))
        .collect();

    let mut candidates = Vec::new();
    for (join_key, target_row) in &target_sel {
        let Some(fix_row) = reference_by_key.get(join_key) else {
            continue;
        };

        // Reference rows without an upstream identifier stand in with
        // their local identifier, so non-upstream-tracked branches can
        // still serve as the reference side.
        let fix_upstream = fix_row
            .commit_upstream_hexsha
            .as_deref()
            .unwrap_or(&fix_row.commit_hexsha);

        // Anti-join: keep the fix only when it is absent from the
        // target under the same key column.
        let fix_in_target_col = match key {
            TargetKey::Upstream => fix_upstream,
            TargetKey::Local => fix_row.commit_hexsha.as_str(),
        };
        if target_keys.contains(fix_in_target_col) {
            continue;
        }

        candidates.push(MissingFixCandidate {
            missing_commit_upstream: Some(fix_upstream.to_owned()),
            missing_commit_stable: fix_row.commit_hexsha.clone(),
            missing_commit_summary: fix_row.commit_summary.clone(),
            based_on_commit_upstream: target_row.commit_upstream_hexsha.clone(),
            based_on_commit_stable: target_row.commit_hexsha.clone(),
        });
    }
    candidates
}

fn target_key(row: &XrefRow, key: TargetKey) -> Option<&str> {
    match key {
        TargetKey::Upstream => row.commit_upstream_hexsha.as_deref(),
        TargetKey::Local => Some(row.commit_hexsha.as_str()),
    }
}

/// Deduplicates rows on a key column, keeping the last occurrence per
/// key at its original position and dropping rows with an empty key.
fn dedup_last<'a>(
    rows: &'a [XrefRow],
    key_of: impl Fn(&'a XrefRow) -> Option<&'a str>,
) -> Vec<(&'a str, &'a XrefRow)> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<Option<(&str, &XrefRow)>> = vec![None; rows.len()];
    for (idx, row) in rows.iter().enumerate() {
        let Some(key) = key_of(row) else {
            continue;
        };
        if let Some(previous) = position.insert(key, idx) {
            kept[previous] = None;
        }
        kept[idx] = Some((key, row));
    }
    kept.into_iter().flatten().collect()
}
