//! Resolve a company's official web domain from its name.
//!
//! Candidates come from a web search source and an autocomplete source, are
//! enriched with organization keywords, scored against the query and the
//! requested categories, then ranked.

pub mod batch;
pub mod cli;
pub mod company;
pub mod config;
pub mod discovery;
pub mod domain_utils;
pub mod enrichment;
pub mod error;
pub mod logger;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod rate_limit;
pub mod scoring;
pub mod similarity;

pub use company::{Company, Query};
pub use error::{ResolveError, SourceError};
pub use pipeline::ResolutionPipeline;
