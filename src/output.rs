//! Rendering of ranked results for the terminal.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::company::{Company, Query};

/// Line printed after every result block
pub const RESULT_DELIMITER: &str = "==========================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    query: &'a str,
    results: &'a [Company],
}

/// Header, one line per company, delimiter
pub fn format_result_block(raw_name: &str, companies: &[Company]) -> String {
    let mut block = format!("'{}' results :", raw_name);
    for company in companies {
        block.push('\n');
        block.push_str(&company.to_string());
    }
    block.push('\n');
    block.push_str(RESULT_DELIMITER);
    block
}

pub fn format_json_line(raw_name: &str, companies: &[Company]) -> Result<String> {
    serde_json::to_string(&JsonResult {
        query: raw_name,
        results: companies,
    })
    .context("Failed to serialize results")
}

pub fn render(format: OutputFormat, query: &Query, companies: &[Company]) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_result_block(&query.raw_name, companies)),
        OutputFormat::Json => format_json_line(&query.raw_name, companies),
    }
}
