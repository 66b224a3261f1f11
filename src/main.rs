//! Setaccio CLI: sift an Italian word list through a local LLM.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use setaccio::classifier::OllamaClient;
use setaccio::config::{self, FilterConfig};
use setaccio::progress::ProgressEvent;
use setaccio::runner::FilterRunner;

#[derive(Parser, Debug)]
#[command(name = "setaccio", version)]
#[command(about = "Splits an Italian word list into words to exclude and words to keep")]
struct Args {
    /// Input word list, one word per line
    #[arg(short, long, default_value = "dizionarioEsteso.txt")]
    input: PathBuf,

    /// Ollama endpoint
    #[arg(long, default_value = "http://localhost:11434")]
    endpoint: String,

    /// Model asked for the verdicts
    #[arg(short, long, default_value = "deepseek-r1:1.5b")]
    model: String,

    /// Words per request
    #[arg(short, long, default_value_t = 55)]
    batch_size: usize,

    /// Save the checkpoint every N batches
    #[arg(long, default_value_t = 100)]
    checkpoint_interval: u64,

    /// Checkpoint file for crash recovery
    #[arg(long, default_value = "checkpoint.json")]
    checkpoint: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Output file for words to exclude
    #[arg(long, default_value = "parole_da_escludere.txt")]
    excluded: PathBuf,

    /// Output file for words to keep
    #[arg(long, default_value = "parole_valide.txt")]
    valid: PathBuf,

    /// Output file for words that never got a verdict
    #[arg(long, default_value = "parole_con_errori.txt")]
    unknown: PathBuf,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Replace the built-in prompt with this file (must contain {words_list})
    #[arg(long)]
    prompt_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<FilterConfig, Box<dyn Error>> {
        let mut config = FilterConfig {
            endpoint_url: self.endpoint,
            model: self.model,
            input_path: self.input,
            batch_size: self.batch_size,
            checkpoint_path: self.checkpoint,
            request_timeout_secs: self.timeout,
            checkpoint_interval: self.checkpoint_interval,
            excluded_path: self.excluded,
            valid_path: self.valid,
            unknown_path: self.unknown,
            temperature: self.temperature,
            ..FilterConfig::default()
        };
        if let Some(path) = self.prompt_file {
            config.prompt_template = fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read prompt file {}: {e}", path.display()))?;
        }
        Ok(config)
    }
}

fn print_progress(event: ProgressEvent) {
    match event {
        ProgressEvent::Started {
            total_words,
            resumed_from,
            total_batches,
        } => {
            if resumed_from > 0 {
                println!(
                    "Resuming from word {resumed_from} of {total_words} ({total_batches} batches left)"
                );
            } else {
                println!("Classifying {total_words} words in {total_batches} batches");
            }
        }
        ProgressEvent::BatchCompleted {
            batch,
            total_batches,
            next_index,
            total_words,
        } => {
            println!("Batch {batch}/{total_batches} done ({next_index}/{total_words} words)");
        }
        ProgressEvent::CheckpointSaved {
            next_index, eta, ..
        } => match eta {
            Some(eta) => println!(
                "Checkpoint saved at word {next_index}, done around {}",
                eta.format("%H:%M")
            ),
            None => println!("Checkpoint saved at word {next_index}"),
        },
        ProgressEvent::Completed {
            excluded,
            valid,
            unknown,
            duration_ms,
        } => {
            println!(
                "Done in {:.1}s: {excluded} excluded, {valid} valid, {unknown} without a verdict",
                duration_ms as f64 / 1000.0
            );
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = args.into_config()?;

    let client = OllamaClient::new(&config.endpoint_url, config.request_timeout_secs);
    let mut runner = FilterRunner::from_config(config)?;
    let summary = runner.run(&client, Some(&print_progress))?;

    tracing::info!(
        total_words = summary.total_words,
        excluded = summary.excluded,
        valid = summary.valid,
        unknown = summary.unknown,
        batches = summary.batches_processed,
        "Word list sifted"
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!(error = %e, "Setaccio failed");
        std::process::exit(1);
    }
}
