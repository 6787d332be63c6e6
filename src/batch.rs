//! Batch resolution of many company names read from a CSV-like file
//!
//! Supports:
//! - One company name per line, or a name followed by its own categories
//! - Quoted names containing commas (`"Acme, Inc.", software`)
//! - An optional `name` header row and `#` comment lines
//! - Rows that are not valid UTF-8, decoded lossily with a warning
//! - Chunked, streaming consumption so input size does not bound memory
//! - Bounded parallelism within each chunk with outcomes kept in input order

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::company::{Company, Query};
use crate::config::BatchConfig;
use crate::error::ResolveError;
use crate::pipeline::ResolutionPipeline;

/// One company to resolve from a batch input
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub name: String,
    /// Categories for this entry only; empty means use the run's defaults
    pub categories: Vec<String>,
}

impl BatchEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_categories(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            categories,
        }
    }

    /// First field is the name; an empty name skips the row even when
    /// categories follow
    fn from_fields(fields: Vec<String>) -> Option<Self> {
        let mut fields = fields.into_iter();
        let name = fields.next().filter(|n| !n.is_empty())?;
        let categories = fields.filter(|c| !c.is_empty()).collect();
        Some(Self::with_categories(name, categories))
    }

    fn to_query(&self, default_categories: &[String]) -> Query {
        let query = Query::new(self.name.as_str());
        if self.categories.is_empty() {
            query.with_categories(default_categories)
        } else {
            query.with_categories(&self.categories)
        }
    }
}

/// Streaming reader over batch entries. Records are pulled from the
/// underlying reader one at a time.
pub struct BatchReader<R: Read> {
    records: csv::ByteRecordsIntoIter<R>,
    line: u64,
    failed: bool,
}

impl BatchReader<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: Read> BatchReader<R> {
    pub fn from_reader(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_byte_records();
        Self {
            records,
            line: 0,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for BatchReader<R> {
    type Item = Result<BatchEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    // A failing reader keeps failing
                    self.failed = e.is_io_error();
                    return Some(Err(anyhow::Error::new(e).context("Failed to read batch input record")));
                }
            };
            self.line += 1;

            // Header row
            if self.line == 1 && record.get(0).is_some_and(|f| f.eq_ignore_ascii_case(b"name")) {
                continue;
            }

            let mut lossy = false;
            let fields: Vec<String> = record
                .iter()
                .map(|field| match String::from_utf8_lossy(field) {
                    Cow::Borrowed(text) => text.to_string(),
                    Cow::Owned(text) => {
                        lossy = true;
                        text
                    }
                })
                .collect();
            if lossy {
                warn!("Batch record {} is not valid UTF-8; invalid bytes replaced", self.line);
            }

            match BatchEntry::from_fields(fields) {
                Some(entry) => return Some(Ok(entry)),
                None => debug!("Skipping batch record {} with empty name", self.line),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub parallel: usize,
    pub abort_on_no_candidates: bool,
}

impl BatchOptions {
    pub fn from_config(batch: &BatchConfig, abort_on_no_candidates: bool) -> Self {
        Self {
            chunk_size: batch.chunk_size,
            parallel: batch.parallel,
            abort_on_no_candidates,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            parallel: 1,
            abort_on_no_candidates: true,
        }
    }
}

/// Result of resolving one batch entry, handed to the caller's sink
#[derive(Debug)]
pub struct QueryOutcome {
    pub query: Query,
    pub result: Result<Vec<Company>, ResolveError>,
    pub duration_secs: f64,
}

/// Counters for a batch run. Per-query results go to the sink, not here.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_queries: usize,
    pub resolved: usize,
    pub failed: usize,
    pub total_companies: usize,
    /// Input records that could not be read and were never resolved
    pub skipped_records: usize,
    /// Set when the run stopped early because a query found no candidates
    pub aborted_on: Option<String>,
    pub total_duration_secs: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            total_queries: 0,
            resolved: 0,
            failed: 0,
            total_companies: 0,
            skipped_records: 0,
            aborted_on: None,
            total_duration_secs: 0.0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    fn record(&mut self, outcome: &QueryOutcome) {
        self.total_queries += 1;
        match &outcome.result {
            Ok(companies) => {
                self.resolved += 1;
                self.total_companies += companies.len();
            }
            Err(_) => self.failed += 1,
        }
    }

    pub fn finalize(&mut self) {
        let completed_at = Utc::now();
        self.total_duration_secs = (completed_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        self.completed_at = Some(completed_at);
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted_on.is_some()
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve every entry, delivering outcomes to `sink` in input order.
///
/// At most `chunk_size` entries are held at once. An entry the input could
/// not produce is counted as skipped and the run moves on. A
/// `NoCandidatesFound` outcome stops the run after it is delivered when
/// `abort_on_no_candidates` is set; other failures are delivered and the run
/// continues.
pub async fn run_batch<I, F>(
    pipeline: &ResolutionPipeline,
    entries: I,
    default_categories: &[String],
    options: BatchOptions,
    mut sink: F,
) -> Result<BatchSummary>
where
    I: IntoIterator<Item = Result<BatchEntry>>,
    F: FnMut(&QueryOutcome) -> Result<()>,
{
    let chunk_size = options.chunk_size.max(1);
    let parallel = options.parallel.max(1);
    let mut summary = BatchSummary::new();
    let mut entries = entries.into_iter();
    let mut chunk_index = 0usize;

    loop {
        let mut chunk = Vec::with_capacity(chunk_size);
        for entry in entries.by_ref() {
            match entry {
                Ok(entry) => chunk.push(entry),
                Err(e) => {
                    warn!("Skipping unreadable batch entry: {:#}", e);
                    summary.skipped_records += 1;
                }
            }
            if chunk.len() == chunk_size {
                break;
            }
        }
        if chunk.is_empty() {
            break;
        }
        chunk_index += 1;
        debug!("Processing batch chunk {} ({} entries)", chunk_index, chunk.len());

        let outcomes = stream::iter(chunk)
            .map(|entry| resolve_entry(pipeline, entry, default_categories))
            .buffered(parallel);
        futures::pin_mut!(outcomes);

        while let Some(outcome) = outcomes.next().await {
            summary.record(&outcome);
            sink(&outcome)?;

            if let Err(e) = &outcome.result {
                if options.abort_on_no_candidates && e.is_no_candidates() {
                    warn!("Stopping batch: {}", e);
                    summary.aborted_on = Some(outcome.query.raw_name.clone());
                    summary.finalize();
                    return Ok(summary);
                }
            }
        }
    }

    summary.finalize();
    info!(
        "Batch complete: {} queries, {} resolved, {} failed, {} skipped records",
        summary.total_queries, summary.resolved, summary.failed, summary.skipped_records
    );
    Ok(summary)
}

async fn resolve_entry(pipeline: &ResolutionPipeline, entry: BatchEntry, default_categories: &[String]) -> QueryOutcome {
    let query = entry.to_query(default_categories);
    let start = Instant::now();
    let result = pipeline.resolve_one(&query).await;
    QueryOutcome {
        query,
        result,
        duration_secs: start.elapsed().as_secs_f64(),
    }
}

/// Export batch summary to JSON file
pub fn export_batch_summary(summary: &BatchSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .context("Failed to serialize batch summary")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write batch summary to: {}", output_path.display()))?;

    Ok(())
}
