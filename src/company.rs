//! Core records: the user's query and the companies resolved for it.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::domain_utils;

/// A company name to resolve, with the optional categories to match against
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The name exactly as the user typed it
    pub raw_name: String,
    /// Lowercased, whitespace removed
    pub name: String,
    /// Lowercased categories; `None` when none were requested
    pub categories: Option<BTreeSet<String>>,
}

impl Query {
    pub fn new(raw_name: impl Into<String>) -> Self {
        let raw_name = raw_name.into();
        let name = domain_utils::normalize_query(&raw_name);
        Self {
            raw_name: raw_name.trim().to_string(),
            name,
            categories: None,
        }
    }

    /// Attach categories. Blank entries are dropped; an empty list leaves the
    /// query without categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = categories
            .into_iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self.categories = if set.is_empty() { None } else { Some(set) };
        self
    }
}

/// A candidate domain enriched with organization metadata and similarity scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub name: String,
    pub domain: String,
    pub tags: BTreeSet<String>,
    /// Jaccard index against the requested categories; `None` when no
    /// categories were requested
    pub category_similarity: Option<f64>,
    pub name_distance: usize,
    pub name_distance_ratio: f64,
}

impl Company {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, keywords: &[String]) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            tags: normalize_tags(keywords),
            category_similarity: None,
            name_distance: 0,
            name_distance_ratio: 0.0,
        }
    }

    pub fn has_category_score(&self) -> bool {
        self.category_similarity.is_some()
    }

    /// Category similarity with "not requested" reported as `0.0`
    pub fn jaccard_index(&self) -> f64 {
        self.category_similarity.unwrap_or(0.0)
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // {:?} keeps the trailing ".0" on whole floats
        write!(
            f,
            "Name: {}, Domain: {}, Jaccard_index: {:?}, Levenstein Distance: {}",
            self.name,
            self.domain,
            self.jaccard_index(),
            self.name_distance
        )
    }
}

/// Split multi-word keywords into lowercase single-word tags
pub fn normalize_tags(keywords: &[String]) -> BTreeSet<String> {
    keywords
        .iter()
        .flat_map(|k| k.split_whitespace())
        .map(|t| t.to_lowercase())
        .collect()
}
