use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not a git repository: {0}")]
    NotAGitRepository(String),
    #[error("invalid revision '{spec}': {reason}")]
    InvalidRevision { spec: String, reason: String },
    #[error("git error: {0}")]
    Git(String),
}

/// Read access to a git repository, scoped to one opened handle.
///
/// All identifier lookups go through this context so callers never
/// assume an ambient working directory.
pub struct GitContext {
    repo: gix::Repository,
}

/// Commit metadata as read from the repository. Immutable input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full lowercase 40-hex id.
    pub hexsha: String,
    /// First line of the message.
    pub summary: String,
    /// Full message text.
    pub message: String,
    pub datetime: DateTime<FixedOffset>,
}

impl GitContext {
    pub fn open(path: &Path) -> Result<Self, RepoError> {
        gix::discover(path)
            .map(|repo| Self { repo })
            .map_err(|err| RepoError::NotAGitRepository(format!("{}: {err}", path.display())))
    }

    /// Enumerates the commits selected by `range` in reverse-chronological
    /// order, using the repository's native revision syntax (`a..b`,
    /// `v1^..v2`, a single tip, ...).
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidRevision`] when the range expression
    /// cannot be resolved, before any traversal starts.
    pub fn commits_in_range(&self, range: &str) -> Result<Vec<CommitInfo>, RepoError> {
        let (base, tip) = self.range_endpoints(range)?;

        // `a..b` selects commits reachable from b but not from a. The
        // exclusion side is materialized as a set and filtered out while
        // walking from the tip, newest first.
        let mut hidden = HashSet::new();
        if let Some(base) = base {
            for entry in self.walk_from(base)? {
                let Ok(info) = entry else {
                    continue;
                };
                hidden.insert(info.id);
            }
        }

        let mut commits = Vec::new();
        for entry in self.walk_from(tip)? {
            let Ok(info) = entry else {
                continue;
            };
            if hidden.contains(&info.id) {
                continue;
            }
            if let Some(commit) = self.commit_info(info.id) {
                commits.push(commit);
            }
        }

        Ok(commits)
    }

    /// Checks that `range` resolves in this repository without walking it.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidRevision`] when it does not.
    pub fn verify_range(&self, range: &str) -> Result<(), RepoError> {
        self.range_endpoints(range).map(|_| ())
    }

    fn range_endpoints(
        &self,
        range: &str,
    ) -> Result<(Option<gix::ObjectId>, gix::ObjectId), RepoError> {
        let spec = self
            .repo
            .rev_parse(range)
            .map_err(|err| RepoError::InvalidRevision {
                spec: range.to_owned(),
                reason: err.to_string(),
            })?;

        match spec.detach() {
            gix::revision::plumbing::Spec::Include(id) => Ok((None, id)),
            gix::revision::plumbing::Spec::Range { from, to } => Ok((Some(from), to)),
            other => Err(RepoError::InvalidRevision {
                spec: range.to_owned(),
                reason: format!("unsupported revision form: {other:?}"),
            }),
        }
    }

    /// Resolves an abbreviated or full identifier to the full lowercase
    /// form, or `None` when the repository does not know it.
    pub fn resolve_id(&self, candidate: &str) -> Option<String> {
        if candidate.is_empty() {
            return None;
        }
        let id = self.repo.rev_parse_single(candidate).ok()?;
        Some(id.to_string().to_ascii_lowercase())
    }

    /// Looks up one commit by identifier.
    pub fn commit(&self, hexsha: &str) -> Option<CommitInfo> {
        let id = self.repo.rev_parse_single(hexsha).ok()?;
        self.commit_info(id.detach())
    }

    fn walk_from(
        &self,
        tip: gix::ObjectId,
    ) -> Result<gix::revision::Walk<'_>, RepoError> {
        self.repo
            .rev_walk([tip])
            .sorting(gix::revision::walk::Sorting::ByCommitTime(
                gix::traverse::commit::simple::CommitTimeOrder::NewestFirst,
            ))
            .all()
            .map_err(|err| RepoError::Git(format!("failed to start revision walk: {err}")))
    }

    fn commit_info(&self, id: gix::ObjectId) -> Option<CommitInfo> {
        let commit = self.repo.find_commit(id).ok()?;

        let raw = commit.message_raw_sloppy();
        let message = String::from_utf8_lossy(raw.as_ref()).into_owned();
        let summary = first_line(raw.as_ref());

        let datetime = commit
            .time()
            .map(commit_datetime)
            .unwrap_or_else(|_| epoch());

        Some(CommitInfo {
            hexsha: id.to_string().to_ascii_lowercase(),
            summary,
            message,
            datetime,
        })
    }
}

impl crate::CommitSource for GitContext {
    fn resolve_range(&self, range: &str) -> Result<Vec<CommitInfo>, RepoError> {
        self.commits_in_range(range)
    }

    fn resolve_identifier(&self, candidate: &str) -> Option<String> {
        self.resolve_id(candidate)
    }

    fn lookup_commit(&self, hexsha: &str) -> Option<CommitInfo> {
        self.commit(hexsha)
    }
}

fn commit_datetime(time: gix::date::Time) -> DateTime<FixedOffset> {
    let utc = DateTime::from_timestamp(time.seconds, 0).unwrap_or(DateTime::UNIX_EPOCH);
    match FixedOffset::east_opt(time.offset) {
        Some(tz) => utc.with_timezone(&tz),
        None => utc.fixed_offset(),
    }
}

fn epoch() -> DateTime<FixedOffset> {
    DateTime::UNIX_EPOCH.fixed_offset()
}

fn first_line(bytes: &[u8]) -> String {
    let line = bytes
        .split(|byte| *byte == b'\n')
        .next()
        .unwrap_or_default();
    String::from_utf8_lossy(line).trim().to_owned()
}
