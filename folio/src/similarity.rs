//! Token-level similarity measures backing the evaluation comparators.

use hashbrown::HashMap;

/// Lowercases `text` and splits it into alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// Cosine similarity of two token lists over their token-frequency vectors,
/// 0 whenever either list is empty.
pub fn cosine(a: &[String], b: &[String]) -> f64 {
    let freq_a = frequencies(a);
    let freq_b = frequencies(b);
    let mut dot = 0.0;
    for (token, &count_a) in &freq_a {
        if let Some(&count_b) = freq_b.get(token) {
            dot += (count_a * count_b) as f64;
        }
    }
    let norm_sq = |freq: &HashMap<&str, usize>| {
        freq.values().map(|&count| (count * count) as f64).sum::<f64>()
    };
    let denom_sq = norm_sq(&freq_a) * norm_sq(&freq_b);
    if denom_sq == 0.0 {
        return 0.0;
    }
    dot / denom_sq.sqrt()
}

fn frequencies(tokens: &[String]) -> HashMap<&str, usize> {
    let mut freq = HashMap::new();
    for token in tokens {
        *freq.entry(token.as_str()).or_insert(0) += 1;
    }
    freq
}

/// Local token-sequence alignment with unit match score.
///
/// With both penalties at zero the best local alignment counts the tokens of
/// a longest common subsequence, which is the instantiation the evaluation
/// engine uses for free-text fields.
#[derive(Clone, Copy, Debug)]
pub struct SmithWaterman {
    pub gap_penalty: f64,
    pub mismatch_penalty: f64,
}

impl SmithWaterman {
    pub fn new(gap_penalty: f64, mismatch_penalty: f64) -> Self {
        Self {
            gap_penalty,
            mismatch_penalty,
        }
    }

    /// Best local alignment score between `a` and `b`.
    pub fn score(&self, a: &[String], b: &[String]) -> f64 {
        let mut best = 0.0_f64;
        let mut prev = vec![0.0_f64; b.len() + 1];
        let mut curr = vec![0.0_f64; b.len() + 1];
        for token_a in a {
            for (j, token_b) in b.iter().enumerate() {
                let j = j + 1;
                let diagonal = if token_a == token_b {
                    prev[j - 1] + 1.0
                } else {
                    prev[j - 1] - self.mismatch_penalty
                };
                let cell = diagonal
                    .max(prev[j] - self.gap_penalty)
                    .max(curr[j - 1] - self.gap_penalty)
                    .max(0.0);
                curr[j] = cell;
                best = best.max(cell);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        best
    }
}

/// Strips leading zeros from each whitespace-separated component, keeping a
/// lone zero, and joins the components with single spaces.
pub fn normalize_date_zeros(date: &str) -> String {
    date.split_whitespace()
        .map(|component| {
            let stripped = component.trim_start_matches('0');
            if stripped.is_empty() {
                "0"
            } else {
                stripped
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
