use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use domainfinder::batch::{self, BatchEntry, BatchOptions, BatchReader};
use domainfinder::cli::{self, Cli};
use domainfinder::config::{self, AppConfig, ConfigError};
use domainfinder::logger::{RunLogger, VerbosityLevel};
use domainfinder::output;
use domainfinder::pipeline::ResolutionPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_verbose_count(cli.verbose);
    init_tracing(verbosity);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_PATH));

    // Handle --init flag first (before any other processing)
    if cli.init {
        match AppConfig::create_default_config(&config_path) {
            Ok(path) => {
                println!("Created default configuration file at: {}", path.display());
                println!("Add your API keys to this file, then run domainfinder again.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    if cli.has_too_many_names() {
        println!("{}", cli::suggest_file_input());
        return Ok(());
    }

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        eprintln!("Usage: domainfinder <NAMES>... [-c <CATEGORY>...] or domainfinder -f <FILE>");
        std::process::exit(2);
    }

    let mut app_config = load_config(&config_path);
    app_config.apply_env_overrides();

    let logger = match &cli.log_file {
        Some(path) => RunLogger::with_log_file(verbosity, path),
        None => RunLogger::new(verbosity),
    };
    logger.debug(&format!("Loaded configuration from {}", config_path.display()));

    let pipeline = ResolutionPipeline::from_config(&app_config)?;
    let options = BatchOptions::from_config(&app_config.batch, app_config.resolution.abort_on_no_candidates);

    let file_entries: Box<dyn Iterator<Item = Result<BatchEntry>>> = match &cli.file {
        Some(path) => {
            logger.info(&format!("Reading company names from {}", path.display()));
            Box::new(BatchReader::from_path(path)?)
        }
        None => Box::new(std::iter::empty()),
    };
    let name_entries = cli.names.iter().map(|name| Ok::<_, anyhow::Error>(BatchEntry::new(name.as_str())));
    let entries = file_entries.chain(name_entries);

    logger.start_run(cli.known_query_count());
    let format = cli.format;

    let summary = batch::run_batch(&pipeline, entries, &cli.categories, options, |outcome| {
        match &outcome.result {
            Ok(companies) => {
                logger.record_query(&outcome.query.raw_name, companies.len(), outcome.duration_secs);
                let rendered = output::render(format, &outcome.query, companies)?;
                logger.print_result(&rendered);
            }
            Err(e) => {
                logger.record_query_failed(&outcome.query.raw_name, &e.to_string(), outcome.duration_secs);
                logger.error(&e.to_string());
            }
        }
        logger.update_progress(&outcome.query.raw_name);
        Ok(())
    })
    .await;

    logger.finish_run();

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            logger.error(&format!("Batch run failed: {:#}", e));
            export_logs(&logger);
            std::process::exit(1);
        }
    };

    if let Some(path) = &cli.summary {
        batch::export_batch_summary(&summary, path)
            .with_context(|| format!("Failed to export summary to {}", path.display()))?;
        logger.record_summary_file(path);
    }

    logger.print_final_summary();
    export_logs(&logger);

    if summary.was_aborted() {
        std::process::exit(1);
    }
    Ok(())
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`
fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("domainfinder={}", verbosity.tracing_directive())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> AppConfig {
    match AppConfig::load_from_path(path) {
        Ok(cfg) => cfg,
        Err(ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config(&path) {
                Ok(Some(created_path)) => {
                    println!("Created default configuration file at: {}", created_path.display());
                    println!("Add your API keys to this file, then run domainfinder again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("Configuration file not found at: {}", path.display());
                    eprintln!("Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

fn export_logs(logger: &RunLogger) {
    if let Err(e) = logger.export_logs() {
        eprintln!("Failed to export logs: {:#}", e);
    }
}
