use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::Command;

use fixgap_core::{GitContext, RepoError};
use tempfile::tempdir;

#[test]
fn commits_in_range_walks_reverse_chronologically() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    let first = commit_file(workspace, "one.txt", "first commit", 1_577_836_801)?;
    let second = commit_file(workspace, "two.txt", "second commit", 1_577_836_802)?;
    let third = commit_file(workspace, "three.txt", "third commit", 1_577_836_803)?;

    let context = GitContext::open(workspace)?;
    let commits = context.commits_in_range(&format!("{first}..{third}"))?;

    let hexshas: Vec<&str> = commits.iter().map(|commit| commit.hexsha.as_str()).collect();
    assert_eq!(hexshas, vec![third.as_str(), second.as_str()]);
    assert_eq!(commits[0].summary, "third commit");
    assert!(commits[0].datetime > commits[1].datetime);
    Ok(())
}

#[test]
fn empty_range_yields_no_commits() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    let only = commit_file(workspace, "one.txt", "first commit", 1_577_836_801)?;

    let context = GitContext::open(workspace)?;
    let commits = context.commits_in_range(&format!("{only}..{only}"))?;

    assert!(commits.is_empty());
    Ok(())
}

#[test]
fn single_tip_selects_full_history() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    commit_file(workspace, "one.txt", "first commit", 1_577_836_801)?;
    let second = commit_file(workspace, "two.txt", "second commit", 1_577_836_802)?;

    let context = GitContext::open(workspace)?;
    let commits = context.commits_in_range(&second)?;

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].hexsha, second);
    Ok(())
}

#[test]
fn unknown_revision_is_invalid() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;
    commit_file(workspace, "one.txt", "first commit", 1_577_836_801)?;

    let context = GitContext::open(workspace)?;
    let result = context.commits_in_range("no-such-tag..HEAD");

    assert!(matches!(result, Err(RepoError::InvalidRevision { .. })));
    Ok(())
}

#[test]
fn resolve_id_expands_abbreviated_identifiers() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;
    let full = commit_file(workspace, "one.txt", "first commit", 1_577_836_801)?;

    let context = GitContext::open(workspace)?;
    assert_eq!(context.resolve_id(&full[..10]), Some(full.clone()));
    assert_eq!(context.resolve_id(&full), Some(full.clone()));
    assert_eq!(context.resolve_id("0123456789abcdef0123"), None);
    assert_eq!(context.resolve_id(""), None);

    let commit = context.commit(&full[..10]).ok_or("expected commit")?;
    assert_eq!(commit.hexsha, full);
    assert_eq!(commit.summary, "first commit");
    Ok(())
}

#[test]
fn non_git_directory_fails_to_open() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let result = GitContext::open(temp.path());
    assert!(matches!(result, Err(RepoError::NotAGitRepository(_))));
    Ok(())
}

fn run_git(workspace: &Path, args: &[&str], date: Option<i64>) -> Result<String, Box<dyn Error>> {
    let mut command = Command::new("git");
    command.args(args).current_dir(workspace);
    if let Some(seconds) = date {
        let stamp = format!("{seconds} +0000");
        command
            .env("GIT_AUTHOR_DATE", &stamp)
            .env("GIT_COMMITTER_DATE", &stamp);
    }
    let output = command.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {:?} failed: {}", args, stderr.trim()).into());
    }
    Ok(String::from_utf8(output.stdout)?.trim().to_owned())
}

fn init_git_repo(workspace: &Path) -> Result<(), Box<dyn Error>> {
    run_git(workspace, &["init"], None)?;
    run_git(workspace, &["config", "user.name", "Fixgap Test"], None)?;
    run_git(
        workspace,
        &["config", "user.email", "fixgap-test@example.com"],
        None,
    )?;
    Ok(())
}

fn commit_file(
    workspace: &Path,
    file: &str,
    message: &str,
    date: i64,
) -> Result<String, Box<dyn Error>> {
    fs::write(workspace.join(file), format!("{message}\n"))?;
    run_git(workspace, &["add", "."], None)?;
    run_git(workspace, &["commit", "-m", message], Some(date))?;
    Ok(run_git(workspace, &["rev-parse", "--verify", "HEAD"], None)?.to_ascii_lowercase())
}
