use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::digest::{digests_match, sha256_file};
use crate::{AcquireError, ArchiveDescriptor, DatasetName, Result, DESCRIPTORS};

/// Exponential backoff around a single download. Only transfer errors retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_attempts: 1, initial_backoff: Duration::ZERO }
    }

    /// Wait before attempt `attempt + 1` (attempts are 1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << shift)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_backoff: Duration::from_millis(500) }
    }
}

pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(timeout: Option<Duration>, retry: RetryPolicy) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| AcquireError::transfer("<client>", e))?;
        Ok(Self { client, retry })
    }

    pub fn with_client(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Download `descriptor` into `dest_dir` unless the file is already there.
    /// An existing file is returned as-is; its content is not checked here.
    pub async fn fetch(&self, descriptor: &ArchiveDescriptor, dest_dir: &Path) -> Result<PathBuf> {
        let dest = dest_dir.join(descriptor.file_name());
        if dest.exists() {
            info!(dataset = %descriptor.name, path = %dest.display(), "archive present, skipping download");
            return Ok(dest);
        }

        info!(dataset = %descriptor.name, url = descriptor.url, "downloading");
        self.fetch_url_with_retry(descriptor.url, &dest).await?;
        Ok(dest)
    }

    pub async fn fetch_url_with_retry(&self, url: &str, dest: &Path) -> Result<()> {
        let mut attempt: u32 = 1;
        loop {
            match self.fetch_url(url, dest).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        url,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "download failed, retrying: {e}"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Stream `url` to `<dest>.part`, then rename onto `dest`.
    /// A failed transfer removes the partial file and never touches `dest`.
    pub async fn fetch_url(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AcquireError::io(parent, e))?;
        }

        let part = part_path(dest);
        match self.stream_to(url, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| AcquireError::io(dest, e))?;
                info!(url, bytes, path = %dest.display(), "download complete");
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, part: &Path) -> Result<u64> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::transfer(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AcquireError::transfer(url, format!("HTTP {status}")));
        }

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| AcquireError::io(part, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await.map_err(|e| AcquireError::transfer(url, e))? {
            file.write_all(&chunk).await.map_err(|e| AcquireError::io(part, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| AcquireError::io(part, e))?;
        Ok(written)
    }

    /// Fetch, then check the digest. Cached archives are re-hashed unless
    /// `trust_cached` is set.
    pub async fn fetch_verified(
        &self,
        descriptor: &ArchiveDescriptor,
        dest_dir: &Path,
        trust_cached: bool,
    ) -> Result<PathBuf> {
        let cached = dest_dir.join(descriptor.file_name()).exists();
        let path = self.fetch(descriptor, dest_dir).await?;

        if cached && trust_cached {
            info!(dataset = %descriptor.name, "trusting cached archive without checksum");
            return Ok(path);
        }

        info!(dataset = %descriptor.name, path = %path.display(), "verifying checksum");
        let actual = hash_off_thread(path.clone()).await?;
        if !digests_match(&actual, descriptor.sha256) {
            // Move it aside so a later trusted run cannot pick it up.
            let bad = quarantine_path(&path);
            tokio::fs::rename(&path, &bad)
                .await
                .map_err(|e| AcquireError::io(&path, e))?;
            warn!(
                dataset = %descriptor.name,
                cached,
                moved_to = %bad.display(),
                "checksum mismatch, archive quarantined"
            );
            return Err(AcquireError::Integrity {
                path,
                expected: descriptor.sha256.to_string(),
                actual,
            });
        }
        info!(dataset = %descriptor.name, "checksum ok");
        Ok(path)
    }

    /// Every configured archive, in order. The first failure aborts.
    pub async fn fetch_all(
        &self,
        raw_dir: &Path,
        trust_cached: bool,
    ) -> Result<BTreeMap<DatasetName, PathBuf>> {
        let mut out = BTreeMap::new();
        for descriptor in DESCRIPTORS.iter() {
            let path = self.fetch_verified(descriptor, raw_dir, trust_cached).await?;
            out.insert(descriptor.name, path);
        }
        Ok(out)
    }
}

async fn hash_off_thread(path: PathBuf) -> Result<String> {
    let for_err = path.clone();
    tokio::task::spawn_blocking(move || sha256_file(&path))
        .await
        .map_err(|e| AcquireError::io(for_err, std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Where an archive that failed its checksum is moved: `<dest>.bad`.
pub fn quarantine_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".bad");
    PathBuf::from(s)
}

pub fn part_path(dest: &Path) -> PathBuf {
    let mut s = dest.as_os_str().to_owned();
    s.push(".part");
    PathBuf::from(s)
}
