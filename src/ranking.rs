//! Two-tier ordering of scored companies.
//!
//! Companies with a positive category similarity come first, most similar
//! first. Everything else follows, closest domain name first. Both sorts are
//! stable, so equal scores keep discovery order (search results ahead of
//! autocomplete suggestions).

use crate::company::Company;

pub fn rank(companies: Vec<Company>) -> Vec<Company> {
    let (mut by_category, mut by_name): (Vec<Company>, Vec<Company>) = companies
        .into_iter()
        .partition(|c| c.category_similarity.is_some_and(|s| s > 0.0));

    by_category.sort_by(|a, b| b.jaccard_index().total_cmp(&a.jaccard_index()));
    by_name.sort_by(|a, b| a.name_distance_ratio.total_cmp(&b.name_distance_ratio));

    by_category.extend(by_name);
    by_category
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(domain: &str, similarity: Option<f64>, ratio: f64) -> Company {
        let mut c = Company::new(domain, domain, &[]);
        c.category_similarity = similarity;
        c.name_distance_ratio = ratio;
        c
    }

    fn domains(ranked: &[Company]) -> Vec<&str> {
        ranked.iter().map(|c| c.domain.as_str()).collect()
    }

    #[test]
    fn test_category_tier_before_name_tier() {
        let ranked = rank(vec![
            company("c.com", None, 0.0),
            company("b.com", Some(0.25), 0.5),
            company("a.com", Some(0.67), 2.0),
        ]);
        assert_eq!(domains(&ranked), vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_name_distance_fallback() {
        let ranked = rank(vec![
            company("y.com", None, 1.25),
            company("x.com", None, 0.0),
        ]);
        assert_eq!(domains(&ranked), vec!["x.com", "y.com"]);
    }

    #[test]
    fn test_zero_similarity_falls_into_name_tier() {
        let ranked = rank(vec![
            company("zero.com", Some(0.0), 0.0),
            company("scored.com", Some(0.1), 3.0),
            company("far.com", Some(0.0), 1.0),
        ]);
        assert_eq!(domains(&ranked), vec!["scored.com", "zero.com", "far.com"]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let ranked = rank(vec![
            company("microsoft.com", None, 0.0),
            company("microsoft.io", None, 0.0),
            company("first.com", Some(0.5), 9.0),
            company("second.com", Some(0.5), 0.0),
        ]);
        assert_eq!(
            domains(&ranked),
            vec!["first.com", "second.com", "microsoft.com", "microsoft.io"]
        );
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
