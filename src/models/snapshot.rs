//! Code snapshot types.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Text contents of a fetched repository, keyed per [`SnapshotKey`].
///
/// Insertion order follows the (sorted) directory walk.
pub type CodeSnapshot = IndexMap<String, String>;

/// How files are keyed in a [`CodeSnapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotKey {
    /// Last path segment only. Same-named files in different directories
    /// overwrite each other; the one walked last wins.
    #[default]
    FileName,
    /// Path relative to the checkout root, `/`-separated.
    RelativePath,
}

impl SnapshotKey {
    /// Compute the key for `path`, which must live under `root`.
    pub fn key_for(self, root: &Path, path: &Path) -> Option<String> {
        match self {
            SnapshotKey::FileName => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            SnapshotKey::RelativePath => {
                let rel = path.strip_prefix(root).ok()?;
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("/"))
                }
            }
        }
    }
}

impl std::str::FromStr for SnapshotKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file-name" | "filename" => Ok(SnapshotKey::FileName),
            "relative-path" | "path" => Ok(SnapshotKey::RelativePath),
            other => Err(format!(
                "unsupported snapshot key: '{other}'. Supported: file-name, relative-path"
            )),
        }
    }
}
