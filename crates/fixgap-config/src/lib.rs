//! Audit checklist configuration: a TOML file with one `[[check]]`
//! table per branch pair to audit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One target/reference pair to audit. Output file names are relative
/// to the audit's destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    /// Revision range of the branch being audited.
    pub stable_rev: String,
    /// Dataset file name for the audited branch.
    pub stable_out: String,
    /// Revision range of the branch fixes are taken from.
    pub other_rev: String,
    /// Dataset file name for the reference branch.
    pub other_out: String,
    /// Report file name for this pair.
    pub missing_out: String,
    /// Optional per-pair blacklist file, resolved relative to the
    /// config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuditConfig {
    #[serde(default)]
    pub check: Vec<CheckItem>,
}

/// Loads and validates an audit checklist.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, contains no checks,
/// or a check leaves a required field blank.
pub fn load_audit_config(path: &Path) -> Result<AuditConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let parsed: AuditConfig = toml::from_str(&raw)?;
    let config = normalize_config(parsed);

    if config.check.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{}: no [[check]] entries",
            path.display()
        )));
    }
    for (index, item) in config.check.iter().enumerate() {
        for (field, value) in [
            ("stable_rev", &item.stable_rev),
            ("stable_out", &item.stable_out),
            ("other_rev", &item.other_rev),
            ("other_out", &item.other_out),
            ("missing_out", &item.missing_out),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{}: check #{}: {} must not be empty",
                    path.display(),
                    index + 1,
                    field
                )));
            }
        }
    }
    Ok(config)
}

fn normalize_config(mut config: AuditConfig) -> AuditConfig {
    for item in &mut config.check {
        item.stable_rev = item.stable_rev.trim().to_owned();
        item.stable_out = item.stable_out.trim().to_owned();
        item.other_rev = item.other_rev.trim().to_owned();
        item.other_out = item.other_out.trim().to_owned();
        item.missing_out = item.missing_out.trim().to_owned();
        item.blacklist = item
            .blacklist
            .take()
            .filter(|blacklist| !blacklist.as_os_str().is_empty());
    }
    config
}
