use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Errors, progress bar and results only (default)
    Summary = 1,  // Per-query progress and the final run summary
    Detailed = 2, // Warnings about skipped candidates and failed queries
    Debug = 3,    // Everything
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Silent,
            1 => VerbosityLevel::Summary,
            2 => VerbosityLevel::Detailed,
            3.. => VerbosityLevel::Debug,
        }
    }

    /// Default `tracing` filter directive for this verbosity
    pub fn tracing_directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Silent => "error",
            VerbosityLevel::Summary => "warn",
            VerbosityLevel::Detailed => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// User-facing run log. Messages go to stderr so stdout carries only results.
#[derive(Clone)]
pub struct RunLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<Mutex<Option<ProgressBar>>>,
    metadata: Arc<Mutex<RunMetadata>>,
    log_buffer: Arc<Mutex<Vec<String>>>,
    log_file_path: Option<PathBuf>,
}

#[derive(Default, Clone, Debug)]
pub struct RunMetadata {
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub queries_processed: usize,
    pub queries_failed: usize,
    pub companies_ranked: usize,
    pub summary_file: Option<String>,
}

impl RunLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(Mutex::new(None)),
            metadata: Arc::new(Mutex::new(RunMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: None,
        }
    }

    pub fn with_log_file(verbosity: VerbosityLevel, log_file_path: impl Into<PathBuf>) -> Self {
        Self {
            log_file_path: Some(log_file_path.into()),
            ..Self::new(verbosity)
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    /// Always shown
    pub fn error(&self, message: &str) {
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let msg = format!("[{}] {}: {}", Local::now().format("%H:%M:%S%.3f"), level, message);

        if self.log_file_path.is_some() {
            if let Ok(mut buffer) = self.log_buffer.lock() {
                buffer.push(msg.clone());
            }
        }

        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.suspend(|| eprintln!("{}", msg));
                return;
            }
        }
        eprintln!("{}", msg);
    }

    /// Write one result block to stdout without tearing the progress bar
    pub fn print_result(&self, block: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.suspend(|| println!("{}", block));
                return;
            }
        }
        println!("{}", block);
    }

    /// Start timing the run. A progress bar is shown when the number of
    /// queries is known up front.
    pub fn start_run(&self, total_queries: Option<u64>) {
        if let Some(total) = total_queries {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            if let Ok(mut guard) = self.progress_bar.lock() {
                *guard = Some(pb);
            }
        }

        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.start_time = Some(Local::now());
        }
    }

    pub fn update_progress(&self, message: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message.to_string());
            }
        }
    }

    fn advance_progress(&self) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.inc(1);
            }
        }
    }

    pub fn finish_run(&self) {
        if let Ok(mut guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.end_time = Some(Local::now());
        }
    }

    pub fn record_query(&self, raw_name: &str, companies: usize, duration_secs: f64) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.queries_processed += 1;
            metadata.companies_ranked += companies;
        }
        self.advance_progress();
        self.info(&format!(
            "Resolved '{}': {} ranked companies in {:.2}s",
            raw_name, companies, duration_secs
        ));
    }

    pub fn record_query_failed(&self, raw_name: &str, error: &str, duration_secs: f64) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.queries_processed += 1;
            metadata.queries_failed += 1;
        }
        self.advance_progress();
        self.warn(&format!("Query '{}' failed after {:.2}s: {}", raw_name, duration_secs, error));
    }

    pub fn record_summary_file(&self, path: &Path) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.summary_file = Some(path.display().to_string());
        }
        self.info(&format!("Batch summary written to {}", path.display()));
    }

    pub fn metadata(&self) -> RunMetadata {
        self.metadata.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Print the run summary to stderr when running with `-v` or more
    pub fn print_final_summary(&self) {
        if self.verbosity < VerbosityLevel::Summary {
            return;
        }
        let metadata = self.metadata();

        eprintln!("\n=== RESOLUTION SUMMARY ===");
        if let (Some(start), Some(end)) = (metadata.start_time, metadata.end_time) {
            let duration = (end - start).num_milliseconds() as f64 / 1000.0;
            eprintln!("Run Duration: {:.2}s", duration);
        }
        eprintln!("Queries Processed: {}", metadata.queries_processed);
        eprintln!("Queries Failed: {}", metadata.queries_failed);
        eprintln!("Companies Ranked: {}", metadata.companies_ranked);
        if let Some(path) = &metadata.summary_file {
            eprintln!("Summary Exported: {}", path);
        }
        eprintln!("==========================\n");
    }

    /// Export all collected log lines to the configured file
    pub fn export_logs(&self) -> Result<()> {
        let Some(log_file_path) = &self.log_file_path else {
            return Ok(());
        };

        if let Some(parent) = log_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .with_context(|| format!("Failed to open log file: {}", log_file_path.display()))?;

        if let Ok(buffer) = self.log_buffer.lock() {
            for entry in buffer.iter() {
                writeln!(file, "{}", entry)?;
            }
        }
        file.flush()?;
        Ok(())
    }
}
