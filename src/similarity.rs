//! Set and string similarity measures used to score candidate companies.

use std::collections::BTreeSet;

/// Result of an edit distance comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDistance {
    /// Minimum number of single-character edits
    pub distance: usize,
    /// `distance` divided by the character length of the reference string,
    /// `0.0` when the reference string is empty
    pub ratio: f64,
}

/// Jaccard index of two sets: `|a ∩ b| / |a ∪ b|`.
///
/// Two empty sets have no union and score `0.0`.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Levenshtein distance between `s1` and `s2` with unit costs, plus the
/// distance relative to the length of `s2`.
pub fn edit_distance(s1: &str, s2: &str) -> EditDistance {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    let distance = if a.is_empty() {
        b.len()
    } else if b.is_empty() {
        a.len()
    } else {
        levenshtein(&a, &b)
    };

    let ratio = if b.is_empty() {
        0.0
    } else {
        distance as f64 / b.len() as f64
    };

    EditDistance { distance, ratio }
}

/// Full `(|a|+1) x (|b|+1)` dynamic programming table.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let rows = a.len() + 1;
    let cols = b.len() + 1;
    let mut table = vec![vec![0usize; cols]; rows];

    for (row, cells) in table.iter_mut().enumerate() {
        cells[0] = row;
    }
    for col in 0..cols {
        table[0][col] = col;
    }

    for row in 1..rows {
        for col in 1..cols {
            table[row][col] = if a[row - 1] == b[col - 1] {
                table[row - 1][col - 1]
            } else {
                let deletion = table[row - 1][col] + 1;
                let insertion = table[row][col - 1] + 1;
                let substitution = table[row - 1][col - 1] + 1;
                deletion.min(insertion).min(substitution)
            };
        }
    }

    table[a.len()][b.len()]
}
