//! Git CLI wrapper for cloning.
//!
//! Shells out via `tokio::process::Command`.

use std::path::Path;
use std::process::Stdio;

use super::FetchError;

/// Run `<program> clone <url> <dest>` and wait for it to finish.
///
/// Credential prompts are disabled so an unknown or private remote fails
/// instead of blocking on stdin.
pub async fn clone_repo(program: &str, url: &str, dest: &Path) -> Result<(), FetchError> {
    tracing::info!("cloning {url}");

    let output = tokio::process::Command::new(program)
        .arg("clone")
        .arg(url)
        .arg(dest)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| FetchError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!("failed to clone {url}: {stderr}");
        return Err(FetchError::CloneFailed {
            url: url.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(())
}
