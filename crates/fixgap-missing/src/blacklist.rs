use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::{fs, io};

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("failed to read blacklist {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

static HEX_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9a-f]{10,40}\b").expect("hex token pattern is valid")
});

/// Operator-supplied exclusion list: hexadecimal identifier substrings
/// extracted from free-form text. A candidate is blacklisted when its
/// missing-commit upstream identifier contains any entry as a
/// substring, so short prefixes are enough to blacklist a commit.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    /// Reads a blacklist from a text file.
    ///
    /// # Errors
    ///
    /// Returns [`BlacklistError::Unreadable`] when the file cannot be
    /// read; this must surface before any correlation work starts.
    pub fn from_path(path: &Path) -> Result<Self, BlacklistError> {
        let text = fs::read_to_string(path).map_err(|source| BlacklistError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(&text))
    }

    /// Extracts every 10-40 character hex token from free-form text.
    pub fn from_text(text: &str) -> Self {
        let entries = HEX_TOKEN
            .find_iter(text)
            .map(|token| token.as_str().to_owned())
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether `identifier` contains any blacklist entry as a substring.
    pub fn matches(&self, identifier: &str) -> bool {
        self.entries.iter().any(|entry| identifier.contains(entry))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn extracts_hex_tokens_from_free_text() {
        let text = "\
# intentionally skipped:
54a20552e1fa1254dccf0cfba58ba2353f7e38b8  revert-only change
short: abc123 (ignored)
prefix 9d2a789c1d is fine too
not-hex: zzzzzzzzzzzz
";
        let blacklist = Blacklist::from_text(text);

        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.matches("54a20552e1fa1254dccf0cfba58ba2353f7e38b8"));
        assert!(blacklist.matches("9d2a789c1db75d0f55b14fa57bec548d94332ad6"));
        assert!(!blacklist.matches("abc123abc123abc123abc123abc123abc123abc1"));
    }

    #[test]
    fn empty_text_matches_nothing() {
        let blacklist = Blacklist::from_text("");
        assert!(blacklist.is_empty());
        assert!(!blacklist.matches("54a20552e1fa1254dccf0cfba58ba2353f7e38b8"));
    }

    #[test]
    fn from_path_reads_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("blacklist.txt");
        fs::write(&path, "54a20552e1fa\n").expect("write blacklist");

        let blacklist = Blacklist::from_path(&path).expect("read blacklist");
        assert_eq!(blacklist.len(), 1);
        assert!(blacklist.matches("54a20552e1fa1254dccf0cfba58ba2353f7e38b8"));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let temp = tempdir().expect("tempdir");
        let result = Blacklist::from_path(&temp.path().join("absent.txt"));
        assert!(matches!(result, Err(BlacklistError::Unreadable { .. })));
    }
}
