use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::Command;

use fixgap_core::GitContext;
use fixgap_xref::extract;
use tempfile::tempdir;

/// History a -> b -> c -> d where c backports a and d fixes a:
/// extracting a..d must stamp b, record c's upstream equivalence to a,
/// and produce a reference edge from d to a.
#[test]
fn extract_finds_fixes_and_upstream_references() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    let a = commit_file(workspace, "a.txt", "first change", 1_577_836_801)?;
    let b = commit_file(workspace, "b.txt", "second change", 1_577_836_802)?;
    let c = commit_file(
        workspace,
        "c.txt",
        &format!("backport first change\n\ncommit {a} upstream.\n"),
        1_577_836_803,
    )?;
    let d = commit_file(
        workspace,
        "d.txt",
        &format!("fix first change\n\nFixes: {} (\"first change\")\n", &a[..12]),
        1_577_836_804,
    )?;

    let context = GitContext::open(workspace)?;
    let dataset = extract(&context, &format!("{a}..{d}"))?;
    let rows = dataset.rows();

    assert_eq!(rows.len(), 3);

    let fix_row = &rows[0];
    assert_eq!(fix_row.commit_hexsha, d);
    assert_eq!(fix_row.commit_summary, "fix first change");
    assert_eq!(fix_row.refcommit_hexsha.as_deref(), Some(a.as_str()));
    assert!(fix_row.refcommit_datetime.is_some());
    assert_eq!(fix_row.refcommit_upstream_hexsha, None);

    let backport_row = &rows[1];
    assert_eq!(backport_row.commit_hexsha, c);
    assert_eq!(backport_row.commit_upstream_hexsha.as_deref(), Some(a.as_str()));
    assert_eq!(backport_row.refcommit_hexsha, None);

    let stamp_row = &rows[2];
    assert_eq!(stamp_row.commit_hexsha, b);
    assert_eq!(stamp_row.commit_upstream_hexsha, None);
    assert_eq!(stamp_row.refcommit_hexsha, None);

    Ok(())
}

#[test]
fn extract_resolves_abbreviated_revert_references() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    let a = commit_file(workspace, "a.txt", "first change", 1_577_836_801)?;
    let b = commit_file(
        workspace,
        "b.txt",
        &format!("Revert \"first change\"\n\nThis reverts commit {a}.\n"),
        1_577_836_802,
    )?;

    let context = GitContext::open(workspace)?;
    let dataset = extract(&context, &format!("{a}..{b}"))?;
    let rows = dataset.rows();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].commit_hexsha, b);
    assert_eq!(rows[0].refcommit_hexsha.as_deref(), Some(a.as_str()));
    Ok(())
}

#[test]
fn revert_disclaimer_does_not_leak_upstream_equivalence() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let workspace = temp.path();
    init_git_repo(workspace)?;

    let a = commit_file(workspace, "a.txt", "first change", 1_577_836_801)?;
    let b = commit_file(
        workspace,
        "b.txt",
        &format!(
            "Revert \"first change\"\n\nThis reverts commit {a} which is\ncommit {a} upstream.\n"
        ),
        1_577_836_802,
    )?;

    let context = GitContext::open(workspace)?;
    let dataset = extract(&context, &format!("{a}..{b}"))?;
    let rows = dataset.rows();

    // The revert still yields a reference edge to a, but must not be
    // indexed as a backport of a.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].commit_hexsha, b);
    assert_eq!(rows[0].refcommit_hexsha.as_deref(), Some(a.as_str()));
    assert_eq!(rows[0].commit_upstream_hexsha, None);
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
    fs::write(workspace.join(file), format!("{file}\n"))?;
    run_git(workspace, &["add", "."], None)?;
    run_git(workspace, &["commit", "-m", message], Some(date))?;
    Ok(run_git(workspace, &["rev-parse", "--verify", "HEAD"], None)?.to_ascii_lowercase())
}
