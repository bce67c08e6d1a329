//! MaskRoute CLI
//!
//! Command-line driver for masking text before it reaches a language model
//! and restoring the original values in the model's response.

use anyhow::Context;
use clap::{Parser, Subcommand};
use maskroute_pii::{MaskedDocument, MaskerConfig, PiiMasker};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "maskroute")]
#[command(version, about = "MaskRoute - Reversible PII masking for LLM prompts", long_about = None)]
struct Cli {
    /// Path to a YAML or TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MASKROUTE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Seed for reproducible replacement values
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask PII in text read from a file or stdin
    Mask {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the substitution map to this file for a later unmask
        #[arg(long)]
        map_out: Option<PathBuf>,

        /// Print the whole masked document as JSON instead of the masked text
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Restore original values in text using a saved map
    Unmask {
        /// Map file written by `mask --map-out`
        #[arg(short, long)]
        map: PathBuf,

        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Show what would be masked, grouped by category
    Inspect {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MaskerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MaskerConfig::default(),
    };

    // Environment overrides the file, flags override both
    config.merge_env();
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    init_tracing(&config.log_level)?;

    match cli.command {
        Commands::Mask {
            input,
            map_out,
            json,
        } => {
            let doc = mask_input(config, input.as_deref()).await?;

            if let Some(path) = &map_out {
                let map = serde_json::to_string_pretty(&doc)?;
                std::fs::write(path, map)
                    .with_context(|| format!("failed to write map {}", path.display()))?;
                info!("Substitution map written to {}", path.display());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                write_stdout(doc.masked_text())?;
            }
        }
        Commands::Unmask { map, input } => {
            let contents = std::fs::read_to_string(&map)
                .with_context(|| format!("failed to read map {}", map.display()))?;
            let doc: MaskedDocument = serde_json::from_str(&contents)
                .with_context(|| format!("invalid map file {}", map.display()))?;

            let text = String::from_utf8(read_input(input.as_deref())?)
                .context("input is not valid UTF-8")?;
            debug!(
                substitutions = doc.substitutions().len(),
                "Unmasking input"
            );

            write_stdout(&doc.unmask(&text)?)?;
        }
        Commands::Inspect { input } => {
            let masker = PiiMasker::from_config(config)?;
            let text = read_text(input.as_deref())?;
            let matches = masker.detect(&text)?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
    }

    Ok(())
}

async fn mask_input(config: MaskerConfig, input: Option<&Path>) -> anyhow::Result<MaskedDocument> {
    let masker = Arc::new(PiiMasker::from_config(config)?);
    let text = read_text(input)?;
    Ok(masker.mask_offloaded(text).await?)
}

fn read_text(input: Option<&Path>) -> anyhow::Result<String> {
    let text = String::from_utf8(read_input(input)?).map_err(|e| {
        maskroute_pii::Error::MalformedInput(format!("input is not valid UTF-8: {}", e))
    })?;
    Ok(text)
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(level.to_string()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
