use anyhow::{Context, Result};

/// Run filesystem-heavy work (extraction, hashing, npy loads) off the async
/// workers.
pub async fn run_blocking<R, E, F>(what: &'static str, f: F) -> Result<R>
where
    R: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce() -> std::result::Result<R, E> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .with_context(|| format!("{what}: blocking task failed"))?
        .with_context(|| what.to_string())
}
