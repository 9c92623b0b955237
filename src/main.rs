use anyhow::Context;
use std::{path::Path, process::ExitCode, sync::Arc};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod models;
mod report;
mod services;

use config::{AppConfig, Credentials};
use errors::AppError;
use report::ActionLog;
use services::{
    redirect_parser,
    s3_store::{self, S3Store},
    sync_service::{SyncOptions, SyncService},
};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Logging setup (stderr; stdout carries the action log) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<(), AppError> {
    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting s3redirect with config: {:?}", cfg);

    let contents = read_redirects(cfg.redirects.as_deref()).await?;

    // --- Credentials + bucket, before any per-key work ---
    let credentials =
        Credentials::from_key_file(&cfg.key_file).map_err(|source| AppError::Credentials {
            path: cfg.key_file.clone(),
            source,
        })?;
    let client = s3_store::connect(&credentials, &cfg.s3);
    let store = S3Store::resolve(client, &cfg.bucket)
        .await
        .map_err(AppError::Bucket)?;
    tracing::info!("Resolved bucket {}", store.bucket());

    let mut log = ActionLog::stdout(cfg.format);
    if cfg.dry_run {
        log.notice("This is a dry run");
    }

    let desired = redirect_parser::parse(contents.lines(), cfg.key_options.clone())
        .entries(|diag| tracing::warn!(line = diag.line, "{}", diag));

    let service = SyncService::new(
        Arc::new(store),
        SyncOptions {
            delete: cfg.delete,
            dry_run: cfg.dry_run,
        },
    );
    let report = service
        .run(desired, |action| log.record(action))
        .await
        .map_err(AppError::Sync)?;
    for dup in &report.duplicates {
        tracing::info!(
            "Key {} appears in redirect entries {} and {}; the later one was written as new",
            dup.key,
            dup.first,
            dup.again
        );
    }
    if report.actions.is_empty() {
        tracing::info!("Bucket {} already up to date", cfg.bucket);
    }

    Ok(())
}

/// Read the whole redirects file, or stdin when no path is given.
async fn read_redirects(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading redirects file {}", path.display())),
        None => {
            let mut contents = String::new();
            tokio::io::stdin()
                .read_to_string(&mut contents)
                .await
                .context("reading redirects from stdin")?;
            Ok(contents)
        }
    }
}
