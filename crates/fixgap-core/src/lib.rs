mod git;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub use git::{CommitInfo, GitContext, RepoError};

/// Version-control access the reference extractor depends on.
///
/// [`GitContext`] is the live implementation; tests substitute an
/// in-memory source so extraction logic runs without a repository.
pub trait CommitSource {
    /// Enumerates the commits selected by `range`, newest first.
    ///
    /// # Errors
    ///
    /// Fails when the range expression cannot be resolved.
    fn resolve_range(&self, range: &str) -> Result<Vec<CommitInfo>, RepoError>;

    /// Expands a possibly abbreviated identifier to its full form, or
    /// `None` when the repository does not know it. A miss here is
    /// never fatal.
    fn resolve_identifier(&self, candidate: &str) -> Option<String>;

    /// Commit metadata for a resolved identifier.
    fn lookup_commit(&self, hexsha: &str) -> Option<CommitInfo>;
}

/// Column names of the serialized cross-reference table, sorted
/// lexicographically. Both the codec and the correlation engine rely on
/// this order being stable.
pub const XREF_COLUMNS: [&str; 7] = [
    "Commit_datetime",
    "Commit_hexsha",
    "Commit_summary",
    "Commit_upstream_hexsha",
    "Refcommit_datetime",
    "Refcommit_hexsha",
    "Refcommit_upstream_hexsha",
];

/// One extracted cross-reference: a commit, the commit it references
/// through a fixes or revert tag (if any), and the upstream equivalents
/// of both (if known).
///
/// A commit with no detected reference still produces exactly one row
/// with the reference fields empty, so every scanned commit appears in
/// the dataset at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefRow {
    /// Full lowercase 40-hex id of the scanned commit.
    pub commit_hexsha: String,
    /// First line of the commit message.
    pub commit_summary: String,
    pub commit_datetime: DateTime<FixedOffset>,
    /// Upstream commit this commit is a backport of, if the message says so.
    pub commit_upstream_hexsha: Option<String>,
    /// Commit named by a fixes/revert tag in this commit's message.
    pub refcommit_hexsha: Option<String>,
    pub refcommit_datetime: Option<DateTime<FixedOffset>>,
    /// Upstream equivalent of the referenced commit, if known.
    pub refcommit_upstream_hexsha: Option<String>,
}

/// An ordered, immutable collection of [`XrefRow`] values.
///
/// Row order follows the reverse-chronological commit traversal that
/// produced the rows. Transformations never mutate a dataset in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XrefDataset {
    rows: Vec<XrefRow>,
}

impl XrefDataset {
    pub fn new(rows: Vec<XrefRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[XrefRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<XrefRow>> for XrefDataset {
    fn from(rows: Vec<XrefRow>) -> Self {
        Self::new(rows)
    }
}

impl IntoIterator for XrefDataset {
    type Item = XrefRow;
    type IntoIter = std::vec::IntoIter<XrefRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A fix that is plausibly missing from the target branch: the fixing
/// commit was found on the reference branch, the commit it fixes is
/// confirmed present in the target dataset, and the fix itself is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFixCandidate {
    /// Upstream id of the missing fix. Falls back to the local id when
    /// the reference branch does not track upstream equivalence.
    pub missing_commit_upstream: Option<String>,
    /// Local id of the missing fix on the reference branch.
    pub missing_commit_stable: String,
    pub missing_commit_summary: String,
    /// Upstream id of the target-side commit that justified the match.
    pub based_on_commit_upstream: Option<String>,
    /// Local id of the target-side commit that justified the match.
    pub based_on_commit_stable: String,
}

impl MissingFixCandidate {
    /// The id to display for the missing commit: upstream when known,
    /// otherwise the local id.
    pub fn missing_commit(&self) -> &str {
        self.missing_commit_upstream
            .as_deref()
            .unwrap_or(&self.missing_commit_stable)
    }

    /// The id to display for the commit the match was based on.
    pub fn based_on_commit(&self) -> &str {
        self.based_on_commit_upstream
            .as_deref()
            .unwrap_or(&self.based_on_commit_stable)
    }
}
