//! GitClient against a real repository, driven through the subprocess runner.

use std::fs;
use std::path::Path;
use std::process::Command;

use git2::Repository;
use tempfile::TempDir;

use git_release::git::{GitClient, ProcessGitRunner, STAGING_BRANCH};

fn git_binary_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Builds a throwaway repository with one commit.
fn setup_test_repo() -> TempDir {
    let temp_dir = TempDir::new().expect("Could not create temp dir");

    let repo = Repository::init(temp_dir.path()).expect("Could not init git repo");

    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }

    let content_path = temp_dir.path().join("README.md");
    fs::write(&content_path, b"Initial content\n").expect("Could not write initial file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new("README.md"))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");

    repo.commit(
        Some("HEAD"),
        &repo.signature().expect("Could not get sig"),
        &repo.signature().expect("Could not get sig"),
        "Initial commit",
        &tree,
        &[],
    )
    .expect("Could not create commit");

    temp_dir
}

#[test]
fn test_execute_captures_command_output() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let client = GitClient::new(ProcessGitRunner::new(repo.path()));

    let head = client.execute("rev-parse", &["HEAD"]).unwrap();
    assert_eq!(head.trim().len(), 40);
}

#[test]
fn test_current_branch_is_trimmed() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let client = GitClient::new(ProcessGitRunner::new(repo.path()));

    let branch = client.current_branch().unwrap();
    assert!(!branch.is_empty());
    assert!(!branch.ends_with('\n'));
}

#[test]
fn test_failed_command_reports_the_command_line() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let client = GitClient::new(ProcessGitRunner::new(repo.path()));

    let err = client
        .execute("checkout", &["does-not-exist"])
        .unwrap_err();
    assert!(err.to_string().contains("git checkout does-not-exist"));
}

#[test]
fn test_restore_returns_to_base_branch_and_drops_staging() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let mut client = GitClient::new(ProcessGitRunner::new(repo.path()));

    client.initialize().unwrap();
    let base = client.base_branch().unwrap().to_string();

    client.execute("checkout", &["-b", STAGING_BRANCH]).unwrap();
    assert_eq!(client.current_branch().unwrap(), STAGING_BRANCH);

    client.restore_base_branch().unwrap();
    assert_eq!(client.current_branch().unwrap(), base);

    // The staging branch is gone
    let verify = client.execute(
        "rev-parse",
        &["--verify", "--quiet", "refs/heads/tmp/release"],
    );
    assert!(verify.is_err());
}

#[test]
fn test_restore_twice_is_idempotent() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let mut client = GitClient::new(ProcessGitRunner::new(repo.path()));

    client.initialize().unwrap();
    client.execute("checkout", &["-b", STAGING_BRANCH]).unwrap();

    client.restore_base_branch().unwrap();
    // Second restore: already on base, still a success
    client.restore_base_branch().unwrap();
}

#[test]
fn test_delete_branch_of_missing_branch_is_silent() {
    if !git_binary_available() {
        return;
    }
    let repo = setup_test_repo();
    let client = GitClient::new(ProcessGitRunner::new(repo.path()));

    // Must not panic or propagate anything
    client.delete_branch("never-created");
}
