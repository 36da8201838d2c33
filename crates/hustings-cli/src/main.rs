//! Hustings CLI: ingest, evict and inspect stored media.
//!
//! Configuration comes from the environment (`.env` supported); see
//! `hustings_core::Config::from_env`.

use anyhow::{anyhow, Context};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use hustings_cli::{default_stem, guess_content_type};
use hustings_core::{Config, MediaFamily};
use hustings_infra::{init_telemetry, shutdown_telemetry, LogFormat};
use hustings_processing::MediaPipeline;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hustings", about = "Media ingestion and storage lifecycle")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcode a local file into a namespace and print its URL
    Ingest {
        /// Path to the file to ingest
        file: PathBuf,
        /// Target namespace, e.g. `party` or `voters/jane_doe`
        #[arg(long)]
        namespace: String,
        /// Declared content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// Stored filename stem (defaults to `<file stem>_<millis>`)
        #[arg(long)]
        stem: Option<String>,
    },
    /// Delete the asset behind a published URL
    Evict {
        /// Published URL
        url: String,
    },
    /// Create a namespace directory and print its path
    Resolve {
        /// Namespace, e.g. `voters/jane_doe`
        namespace: String,
    },
    /// Print the on-disk path of a published URL
    Locate {
        /// Published URL
        url: String,
    },
}

#[derive(Serialize)]
struct IngestOutput {
    url: String,
    family: MediaFamily,
    content_type: String,
    namespace: String,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry("hustings-cli", LogFormat::from_env())
        .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let pipeline = MediaPipeline::from_config(&config)
        .await
        .context("Failed to initialize media pipeline")?;

    let result = run(cli.command, &pipeline).await;
    shutdown_telemetry().await;
    result
}

async fn run(command: Commands, pipeline: &MediaPipeline) -> anyhow::Result<()> {
    match command {
        Commands::Ingest {
            file,
            namespace,
            content_type,
            stem,
        } => {
            let content_type = match content_type {
                Some(ct) => ct,
                None => guess_content_type(&file)
                    .map(str::to_string)
                    .with_context(|| {
                        format!(
                            "Cannot guess content type of {}; pass --content-type",
                            file.display()
                        )
                    })?,
            };
            let family = pipeline.classifier().classify(&content_type)?;
            let stem = stem.unwrap_or_else(|| default_stem(&file));

            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let url = pipeline
                .ingest(Bytes::from(data), &content_type, &namespace, &stem)
                .await
                .with_context(|| format!("Failed to ingest {}", file.display()))?;

            print_json(&IngestOutput {
                url,
                family,
                content_type,
                namespace,
            })?;
        }
        Commands::Evict { url } => {
            let outcome = pipeline.evict(&url).await;
            print_json(&serde_json::json!({
                "url": url,
                "evicted": outcome.is_some(),
                "file_removed": outcome.map(|o| o.file_removed).unwrap_or(false),
                "pruned_dirs": outcome.map(|o| o.pruned_dirs).unwrap_or(0),
            }))?;
        }
        Commands::Resolve { namespace } => {
            let storage = pipeline.storage();
            let parsed = storage.namespace_rules().parse(&namespace)?;
            let directory = storage
                .resolve(&parsed)
                .await
                .with_context(|| format!("Failed to resolve namespace {}", namespace))?;
            print_json(&serde_json::json!({
                "namespace": namespace,
                "effective_path": parsed.effective_path(),
                "directory": directory.display().to_string(),
            }))?;
        }
        Commands::Locate { url } => {
            let path = pipeline
                .storage()
                .locate(&url)
                .with_context(|| format!("Not a stored asset URL: {}", url))?;
            print_json(&serde_json::json!({
                "url": url,
                "path": path.display().to_string(),
                "exists": path.is_file(),
            }))?;
        }
    }

    Ok(())
}
