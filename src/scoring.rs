//! Per-company similarity scoring against a query.

use crate::company::{Company, Query};
use crate::domain_utils;
use crate::similarity::{edit_distance, jaccard};

/// Annotate a company with its category similarity and name distance.
///
/// Category similarity is only computed when the query carries categories.
/// Name distance compares the domain root (text before the first dot) with the
/// normalized query; the ratio is relative to the query length.
pub fn score(mut company: Company, query: &Query) -> Company {
    company.category_similarity = query
        .categories
        .as_ref()
        .map(|categories| jaccard(&company.tags, categories));

    let root = domain_utils::domain_root(&company.domain);
    let distance = edit_distance(root, &query.name);
    company.name_distance = distance.distance;
    company.name_distance_ratio = distance.ratio;

    company
}

pub fn score_all(companies: Vec<Company>, query: &Query) -> Vec<Company> {
    companies.into_iter().map(|c| score(c, query)).collect()
}
