//! Commit-message patterns for upstream equivalence and fix/revert
//! references.
//!
//! Precedence is fixed: within one message, the full upstream line form
//! is tried before the line-start form, and on each line the revert form
//! is tried before the fixes form. The first form that matches wins.

use std::sync::LazyLock;

use regex::Regex;

/// `commit <hex 10-40> upstream.` on a line of its own, tolerating
/// brackets, stray punctuation and the common `comit`/`upsream` typos.
static UPSTREAM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[?\s*[Cc]omm?[it]{2}\s*(?P<sha>[0-9a-f]{10,40})\s+[Uu]pst?ream\.?\s*\]?\s*$")
        .expect("upstream line pattern is valid")
});

/// `upstream commit <hex 40>` at line start.
static UPSTREAM_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[?\s*[Uu]pst?ream\s+[Cc]omm?[it]{2}\s*(?P<sha>[0-9a-f]{40})")
        .expect("upstream prefix pattern is valid")
});

/// A revert's explanation of what the reverted commit was upstream:
/// when the preceding line ends like this, the upstream line below it
/// describes the reverted commit, not the commit being scanned.
static REVERT_DISCLAIMER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"reverts commit [0-9a-f]{40},? which (?:is|was)$")
        .expect("revert disclaimer pattern is valid")
});

/// `revert ... commit ... <hex 5-40>` as a whole word.
static REVERT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Rr]evert.{0,10}[Cc]ommit.*\s(?P<sha>[0-9a-f]{5,40})\b")
        .expect("revert reference pattern is valid")
});

/// `fixes ... <hex 5-40>` as a whole word.
static FIXES_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ff]ixes.{0,10}\s(?P<sha>[0-9a-f]{5,40})\b")
        .expect("fixes reference pattern is valid")
});

/// Identifier of the upstream commit this message claims to backport,
/// if any. At most one is ever reported per message.
pub(crate) fn upstream_sha(message: &str) -> Option<&str> {
    find_upstream(message, &UPSTREAM_LINE).or_else(|| find_upstream(message, &UPSTREAM_PREFIX))
}

fn find_upstream<'a>(message: &'a str, pattern: &Regex) -> Option<&'a str> {
    let mut previous: Option<&str> = None;
    for line in message.lines() {
        if let Some(caps) = pattern.captures(line) {
            let disqualified = previous.is_some_and(|prev| REVERT_DISCLAIMER.is_match(prev));
            if !disqualified {
                return caps.name("sha").map(|m| m.as_str());
            }
        }
        previous = Some(line);
    }
    None
}

/// Identifier referenced by a fixes or revert tag on this line, if any.
pub(crate) fn referenced_sha(line: &str) -> Option<&str> {
    REVERT_REF
        .captures(line)
        .or_else(|| FIXES_REF.captures(line))
        .and_then(|caps| caps.name("sha"))
        .map(|m| m.as_str())
}
