//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Create a git repository under a fresh temp dir, commit `files`, and
/// return its path alongside the guard keeping it alive.
pub async fn init_repo(files: &[(&str, &[u8])]) -> (PathBuf, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let repo = tmp.path().join("origin");
    std::fs::create_dir_all(&repo).unwrap();

    for (name, content) in files {
        let path = repo.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    run_git(&repo, &["init"]).await;
    run_git(&repo, &["config", "user.email", "test@repo-review.dev"]).await;
    run_git(&repo, &["config", "user.name", "Repo Review Tests"]).await;
    run_git(&repo, &["add", "."]).await;
    run_git(&repo, &["commit", "-m", "initial commit"]).await;

    (repo, tmp)
}

/// Run a git command inside `repo_dir` and panic on failure.
pub async fn run_git(repo_dir: &Path, args: &[&str]) {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await
        .unwrap_or_else(|e| panic!("failed to run git {}: {e}", args.join(" ")));

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit {}): {stderr}",
            args.join(" "),
            output.status
        );
    }
}

/// Number of entries directly under `dir`.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
