use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use archives::{acquire_and_verify_all, AcquisitionReport, Fetcher, RetryPolicy};
use tracing::{info, warn};

use crate::blocking::run_blocking;
use crate::cli::{ExtractArgs, FetchArgs, PrepareArgs};
use crate::config::AppConfig;

pub async fn prepare_data(cfg: &AppConfig, args: PrepareArgs) -> Result<ExitCode> {
    let raw_dir = args.raw_dir.unwrap_or_else(|| cfg.raw_dir.clone());
    let processed_dir = args.processed_dir.unwrap_or_else(|| cfg.processed_dir.clone());
    ensure_dir(&raw_dir).await?;
    ensure_dir(&processed_dir).await?;

    if args.skip_download {
        info!("skipping download");
    } else {
        fetch_into(cfg, &raw_dir, args.trust_cached).await?;
    }

    if args.skip_extract {
        info!("skipping extraction");
        return Ok(ExitCode::SUCCESS);
    }

    let report = extract_all(raw_dir, processed_dir).await?;
    if let Some(path) = &args.report {
        write_report(path, &report).await?;
    }
    Ok(exit_for(&report))
}

pub async fn fetch(cfg: &AppConfig, args: FetchArgs) -> Result<ExitCode> {
    let raw_dir = args.raw_dir.unwrap_or_else(|| cfg.raw_dir.clone());
    ensure_dir(&raw_dir).await?;
    fetch_into(cfg, &raw_dir, args.trust_cached).await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn extract(cfg: &AppConfig, args: ExtractArgs) -> Result<ExitCode> {
    let raw_dir = args.raw_dir.unwrap_or_else(|| cfg.raw_dir.clone());
    let processed_dir = args.processed_dir.unwrap_or_else(|| cfg.processed_dir.clone());
    ensure_dir(&processed_dir).await?;
    let report = extract_all(raw_dir, processed_dir).await?;
    Ok(exit_for(&report))
}

pub fn fetcher(cfg: &AppConfig) -> Result<Fetcher> {
    let retry = RetryPolicy {
        max_attempts: cfg.fetch_retries,
        initial_backoff: cfg.fetch_backoff,
    };
    Fetcher::new(cfg.fetch_timeout, retry).context("Failed to build HTTP client")
}

async fn fetch_into(cfg: &AppConfig, raw_dir: &Path, trust_cached: bool) -> Result<()> {
    let paths = fetcher(cfg)?
        .fetch_all(raw_dir, trust_cached)
        .await
        .context("Download failed")?;
    for (name, path) in &paths {
        info!(dataset = %name, path = %path.display(), "archive ready");
    }
    Ok(())
}

pub async fn extract_all(raw_dir: PathBuf, processed_dir: PathBuf) -> Result<AcquisitionReport> {
    let report = run_blocking("extract archives", move || {
        acquire_and_verify_all(&raw_dir, &processed_dir)
    })
    .await?;

    for check in report.results.values() {
        info!(
            dataset = %check.dataset,
            files = check.actual,
            expected = check.expected,
            ok = check.success,
            "verification"
        );
    }
    let missing = report.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|n| n.as_str()).collect();
        warn!(missing = %names.join(", "), "archives not found in raw directory");
    }
    Ok(report)
}

pub fn exit_for(report: &AcquisitionReport) -> ExitCode {
    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Write to a sibling tmp file, then rename over the target.
pub async fn write_report(path: &Path, report: &AcquisitionReport) -> Result<()> {
    let json = report.to_json().context("Failed to serialize report")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move report into {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))
}
