//! Fetcher tests against real git repositories cloned from local paths.

mod common;

use pretty_assertions::assert_eq;

use repo_review::config::FetchConfig;
use repo_review::fetcher::{FetchError, RepoFetcher, fetch_snapshot};
use repo_review::models::SnapshotKey;

fn fetcher(scratch: &std::path::Path, key_by: SnapshotKey, exclude_git_dir: bool) -> RepoFetcher {
    RepoFetcher::new(FetchConfig {
        scratch_dir: Some(scratch.to_path_buf()),
        key_by,
        exclude_git_dir,
        ..FetchConfig::default()
    })
}

#[tokio::test]
async fn clone_reads_text_files_and_cleans_up() {
    let (repo, _guard) = common::init_repo(&[
        ("main.py", b"print('hello')\n"),
        ("pkg/util.py", b"def add(a, b):\n    return a + b\n"),
        ("logo.png", &[0x89, b'P', b'N', b'G', 0, 0, 0, 13]),
    ])
    .await;
    let scratch = tempfile::tempdir().unwrap();

    let snapshot = fetcher(scratch.path(), SnapshotKey::FileName, true)
        .fetch(repo.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(snapshot["main.py"], "print('hello')\n");
    assert_eq!(snapshot["util.py"], "def add(a, b):\n    return a + b\n");
    assert!(!snapshot.contains_key("logo.png"));
    assert_eq!(snapshot.len(), 2);
    assert_eq!(common::entry_count(scratch.path()), 0);
}

#[tokio::test]
async fn git_metadata_included_by_default() {
    let (repo, _guard) = common::init_repo(&[("README.md", b"# demo\n")]).await;
    let scratch = tempfile::tempdir().unwrap();

    let snapshot = fetcher(scratch.path(), SnapshotKey::RelativePath, false)
        .fetch(repo.to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(snapshot["README.md"], "# demo\n");
    assert!(snapshot.contains_key(".git/HEAD"));
    assert!(snapshot.keys().all(|k| !k.ends_with(".git/index")));
}

#[tokio::test]
async fn failed_clone_reads_nothing_and_cleans_up() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");
    let parent = tempfile::tempdir().unwrap();

    let err = fetcher(parent.path(), SnapshotKey::FileName, false)
        .fetch(missing.to_str().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::CloneFailed { .. }), "got {err:?}");
    assert!(err.to_string().contains("clone failed"));
    assert_eq!(common::entry_count(parent.path()), 0);
}

#[tokio::test]
async fn fetch_snapshot_uses_given_config() {
    let (repo, _guard) = common::init_repo(&[("a/lib.rs", b"pub fn f() {}\n")]).await;
    let config = FetchConfig {
        key_by: SnapshotKey::RelativePath,
        exclude_git_dir: true,
        ..FetchConfig::default()
    };

    let snapshot = fetch_snapshot(repo.to_str().unwrap(), &config).await.unwrap();

    assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a/lib.rs"]);
}
