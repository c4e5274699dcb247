//! Repository fetcher: clone into a scratch directory and load text files.
//!
//! Each fetch owns its checkout exclusively. The directory is a
//! [`tempfile::TempDir`] scoped to [`RepoFetcher::fetch`], so it is removed
//! on success, on clone failure, and when the future is dropped midway.

pub mod git;

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::FetchConfig;
use crate::constants::BINARY_SNIFF_LEN;
use crate::models::CodeSnapshot;

/// Name of the VCS metadata directory skipped by `exclude_git_dir`.
const GIT_DIR: &str = ".git";

/// Errors from the fetcher. Unreadable files are not errors; they are
/// logged and left out of the snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to create scratch directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("clone failed for {url} ({status}): {stderr}")]
    CloneFailed {
        url: String,
        status: String,
        stderr: String,
    },

    #[error("reading the checkout failed: {0}")]
    ReadTask(#[from] tokio::task::JoinError),
}

/// Clones repositories and reads them into [`CodeSnapshot`]s.
#[derive(Debug, Clone, Default)]
pub struct RepoFetcher {
    config: FetchConfig,
}

impl RepoFetcher {
    /// Create a fetcher with the given settings.
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Clone `url` and return the text files it contains.
    ///
    /// Nothing is read when the clone fails.
    pub async fn fetch(&self, url: &str) -> Result<CodeSnapshot, FetchError> {
        let checkout = self.scratch_dir()?;
        tracing::debug!("scratch checkout at {}", checkout.path().display());

        let result = match git::clone_repo(&self.config.git_program, url, checkout.path()).await {
            Ok(()) => self.read_tree(checkout.path()).await,
            Err(e) => Err(e),
        };

        let path = checkout.path().to_path_buf();
        if let Err(e) = checkout.close() {
            tracing::warn!("failed to remove scratch checkout {}: {e}", path.display());
        }

        result
    }

    /// Walk `root` and load every text file under it.
    ///
    /// A file is text when its first [`BINARY_SNIFF_LEN`] bytes contain no
    /// null byte and the whole file decodes as UTF-8. Anything else is
    /// skipped. The walk runs on the blocking pool.
    pub async fn read_tree(&self, root: &Path) -> Result<CodeSnapshot, FetchError> {
        let root = root.to_path_buf();
        let config = self.config.clone();
        let snapshot = tokio::task::spawn_blocking(move || walk_tree(&root, &config)).await?;
        tracing::info!("read {} text file(s)", snapshot.len());
        Ok(snapshot)
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir, FetchError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.config.temp_prefix);
        let dir = match &self.config.scratch_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        dir.map_err(FetchError::TempDir)
    }
}

/// Convenience wrapper: fetch `url` with `config`.
pub async fn fetch_snapshot(url: &str, config: &FetchConfig) -> Result<CodeSnapshot, FetchError> {
    RepoFetcher::new(config.clone()).fetch(url).await
}

/// Synchronous walk behind [`RepoFetcher::read_tree`].
fn walk_tree(root: &Path, config: &FetchConfig) -> CodeSnapshot {
    let mut snapshot = CodeSnapshot::new();
    let exclude_git = config.exclude_git_dir;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(exclude_git && e.depth() > 0 && e.file_name() == GIT_DIR));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("error walking {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(key) = config.key_by.key_for(root, entry.path()) else {
            continue;
        };

        match read_text_file(entry.path()) {
            Ok(Some(content)) => {
                if snapshot.insert(key.clone(), content).is_some() {
                    tracing::debug!("{key} overwritten by {}", entry.path().display());
                }
            }
            Ok(None) => tracing::debug!("skipping binary file {}", entry.path().display()),
            Err(e) => tracing::error!("Error reading {key}: {e}"),
        }
    }

    snapshot
}

/// Read `path` as UTF-8 text, or `None` if its head contains a null byte.
fn read_text_file(path: &Path) -> std::io::Result<Option<String>> {
    if has_null_byte_prefix(path)? {
        return Ok(None);
    }
    std::fs::read_to_string(path).map(Some)
}

/// Whether the first [`BINARY_SNIFF_LEN`] bytes of `path` include `\0`.
fn has_null_byte_prefix(path: &Path) -> std::io::Result<bool> {
    let file = std::fs::File::open(path)?;
    let mut head = Vec::with_capacity(BINARY_SNIFF_LEN);
    file.take(BINARY_SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head.contains(&0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnapshotKey;
    use pretty_assertions::assert_eq;

    fn fetcher(key_by: SnapshotKey, exclude_git_dir: bool) -> RepoFetcher {
        RepoFetcher::new(FetchConfig {
            key_by,
            exclude_git_dir,
            ..FetchConfig::default()
        })
    }

    #[tokio::test]
    async fn reads_text_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.go"), "package main\n").unwrap();
        std::fs::create_dir_all(dir.path().join("internal/api")).unwrap();
        std::fs::write(dir.path().join("internal/api/handler.go"), "package api\n").unwrap();

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["main.go"], "package main\n");
        assert_eq!(snapshot["handler.go"], "package api\n");
    }

    #[tokio::test]
    async fn null_byte_in_head_excludes_file_whatever_its_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("looks_like_code.rs"), [b'f', b'n', 0, b' ']).unwrap();
        std::fs::write(dir.path().join("zeros.bin"), vec![0u8; 1024]).unwrap();
        std::fs::write(dir.path().join("ok.txt"), "fine").unwrap();

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["ok.txt"]);
    }

    #[tokio::test]
    async fn null_byte_after_sniff_window_is_not_sniffed() {
        // The heuristic only inspects the head; past it, the file is read
        // as text (and a null byte is valid UTF-8).
        let dir = tempfile::tempdir().unwrap();
        let mut content = vec![b'a'; BINARY_SNIFF_LEN];
        content.push(0);
        std::fs::write(dir.path().join("late_null.txt"), &content).unwrap();

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(snapshot["late_null.txt"].len(), BINARY_SNIFF_LEN + 1);
    }

    #[tokio::test]
    async fn invalid_utf8_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latin1.txt"), [0xFF, 0xFE, b'A']).unwrap();
        std::fs::write(dir.path().join("good.txt"), "hello").unwrap();

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert!(!snapshot.contains_key("latin1.txt"));
        assert_eq!(snapshot["good.txt"], "hello");
    }

    #[tokio::test]
    async fn same_file_name_keeps_last_walked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("a/mod.rs"), "first").unwrap();
        std::fs::write(dir.path().join("b/mod.rs"), "second").unwrap();

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["mod.rs"], "second");
    }

    #[tokio::test]
    async fn relative_path_keys_avoid_collisions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("a/mod.rs"), "first").unwrap();
        std::fs::write(dir.path().join("b/mod.rs"), "second").unwrap();

        let snapshot = fetcher(SnapshotKey::RelativePath, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(snapshot["a/mod.rs"], "first");
        assert_eq!(snapshot["b/mod.rs"], "second");
    }

    #[tokio::test]
    async fn git_dir_walked_unless_excluded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();

        let all = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();
        assert!(all.contains_key("HEAD"));
        assert!(all.contains_key(".gitignore"));

        let filtered = fetcher(SnapshotKey::FileName, true)
            .read_tree(dir.path())
            .await
            .unwrap();
        assert!(!filtered.contains_key("HEAD"));
        assert!(filtered.contains_key(".gitignore"));
    }

    #[tokio::test]
    async fn walk_order_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }

        let snapshot = fetcher(SnapshotKey::FileName, false)
            .read_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            vec!["a.txt", "b.txt", "c.txt"]
        );
    }

    #[test]
    fn walk_is_plain_blocking_io() {
        // Runs on the blocking pool, so it must not need a runtime.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "pub fn f() {}\n").unwrap();
        std::fs::write(dir.path().join("blob"), [0u8, 1, 2]).unwrap();

        let snapshot = walk_tree(dir.path(), &FetchConfig::default());

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["lib.rs"]);
    }

    #[tokio::test]
    async fn failed_clone_removes_scratch_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let fetcher = RepoFetcher::new(FetchConfig {
            git_program: "false".into(),
            scratch_dir: Some(scratch.path().to_path_buf()),
            ..FetchConfig::default()
        });

        let err = fetcher.fetch("https://example.com/r.git").await.unwrap_err();

        assert!(matches!(err, FetchError::CloneFailed { .. }));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
