//! Archive download and local caching

use crate::{Result, WarcflowError};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Downloads remote archives into a local directory.
///
/// The local filename is the remote URL, percent-encoded, so it stays unique
/// and reversible. A file that already exists locally is reused as-is, which
/// is what makes interrupted runs cheap to resume.
pub struct ArchiveDownloader {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl ArchiveDownloader {
    pub fn new(client: reqwest::Client, download_dir: &Path) -> Self {
        Self {
            client,
            download_dir: download_dir.to_path_buf(),
        }
    }

    /// Local path an archive URL maps to
    pub fn local_path(&self, remote_url: &str) -> PathBuf {
        let name: String = url::form_urlencoded::byte_serialize(remote_url.as_bytes()).collect();
        self.download_dir.join(name)
    }

    /// Ensures the archive is on disk and returns its local path
    pub async fn fetch(&self, remote_url: &str) -> Result<PathBuf> {
        let local = self.local_path(remote_url);
        if local.exists() {
            tracing::info!("found local file {}, not downloading again", local.display());
            return Ok(local);
        }

        tokio::fs::create_dir_all(&self.download_dir).await?;
        tracing::info!("downloading {} (local: {})", remote_url, local.display());

        let mut response = self
            .client
            .get(remote_url)
            .send()
            .await
            .map_err(|e| WarcflowError::Http {
                url: remote_url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(WarcflowError::Download {
                url: remote_url.to_string(),
                message: format!("server returned {}", response.status()),
            });
        }

        // Write to a temp name first so a crashed download never passes the
        // exists() reuse check above
        let partial = partial_path(&local);
        let mut file = tokio::fs::File::create(&partial).await?;
        while let Some(chunk) = response.chunk().await.map_err(|e| WarcflowError::Http {
            url: remote_url.to_string(),
            source: e,
        })? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, &local).await?;

        tracing::info!("download completed: {}", local.display());
        Ok(local)
    }
}

/// Appends `.part` to the whole filename. Replacing the extension instead
/// would collide for URLs differing only in their final extension.
fn partial_path(local: &Path) -> PathBuf {
    let mut name = local.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
