use std::collections::BTreeMap;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use crate::records::{EvaluationRecord, FieldValue};
use crate::similarity::{cosine, normalize_date_zeros, tokenize, SmithWaterman};

const COSINE_MATCH_THRESHOLD: f64 = 0.8;
const SET_MATCH_THRESHOLD: f64 = FRAC_1_SQRT_2;

/// How one field's expected and extracted values are compared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparator {
    /// Plain string equality.
    Exact,
    /// String equality after per-component leading-zero stripping.
    ExactDate,
    /// Token cosine similarity above a fixed 0.8 threshold.
    CosineThreshold,
    /// Local alignment score over the expected token count, recorded as a
    /// continuous sample rather than thresholded.
    SmithWatermanRatio,
    /// Per-item set matching at cosine sqrt(2)/2, recorded as one precision
    /// and one recall sample per document.
    SetPrecisionRecall,
}

/// A field name bound to its comparison policy.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPolicy {
    pub field: String,
    pub comparator: Comparator,
}

impl FieldPolicy {
    pub fn new(field: &str, comparator: Comparator) -> Self {
        Self {
            field: field.to_string(),
            comparator,
        }
    }
}

/// The comparator assignment used for final document metadata.
pub fn metadata_policies() -> Vec<FieldPolicy> {
    vec![
        FieldPolicy::new("title", Comparator::SmithWatermanRatio),
        FieldPolicy::new("authors", Comparator::SetPrecisionRecall),
        FieldPolicy::new("affiliations", Comparator::SetPrecisionRecall),
        FieldPolicy::new("abstract", Comparator::SmithWatermanRatio),
        FieldPolicy::new("keywords", Comparator::SetPrecisionRecall),
        FieldPolicy::new("journal", Comparator::CosineThreshold),
        FieldPolicy::new("volume", Comparator::Exact),
        FieldPolicy::new("issue", Comparator::Exact),
        FieldPolicy::new("pages", Comparator::Exact),
        FieldPolicy::new("year", Comparator::Exact),
        FieldPolicy::new("doi", Comparator::Exact),
        FieldPolicy::new("date", Comparator::ExactDate),
    ]
}

/// Accumulated outcome of one statistic across the observed corpus.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldStat {
    Matches { correct: usize, total: usize },
    Scores(Vec<f64>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricKind {
    Accuracy,
    MeanScore,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accuracy => "accuracy",
            Self::MeanScore => "mean score",
        };
        f.pad(name)
    }
}

/// One summarized statistic: the metric value in `[0, 1]` and the number of
/// documents it was measured over.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSummary {
    pub kind: MetricKind,
    pub value: f64,
    pub population: usize,
}

/// Corpus-level accumulator comparing extracted metadata against ground
/// truth, one [`observe`](EvaluationEngine::observe) call per document.
///
/// A document whose expected value for a field is absent or empty is skipped
/// for that field's statistics, never scored as wrong. Extraction misses on
/// a present expected value do count against the field.
pub struct EvaluationEngine {
    policies: Vec<FieldPolicy>,
    stats: BTreeMap<String, FieldStat>,
}

impl EvaluationEngine {
    pub fn new(policies: Vec<FieldPolicy>) -> Self {
        let mut stats = BTreeMap::new();
        for policy in &policies {
            match policy.comparator {
                Comparator::Exact | Comparator::ExactDate | Comparator::CosineThreshold => {
                    stats.insert(
                        policy.field.clone(),
                        FieldStat::Matches {
                            correct: 0,
                            total: 0,
                        },
                    );
                }
                Comparator::SmithWatermanRatio => {
                    stats.insert(policy.field.clone(), FieldStat::Scores(vec![]));
                }
                Comparator::SetPrecisionRecall => {
                    stats.insert(
                        format!("{} precision", policy.field),
                        FieldStat::Scores(vec![]),
                    );
                    stats.insert(
                        format!("{} recall", policy.field),
                        FieldStat::Scores(vec![]),
                    );
                }
            }
        }
        Self { policies, stats }
    }

    /// Scores one document pair and folds the outcome into the corpus
    /// statistics.
    pub fn observe(&mut self, expected: &EvaluationRecord, extracted: &EvaluationRecord) {
        let Self { policies, stats } = self;
        for policy in policies.iter() {
            let exp = match expected.get(&policy.field) {
                Some(value) => value,
                None => continue,
            };
            let ext = extracted.get(&policy.field);
            match policy.comparator {
                Comparator::Exact => {
                    let hit = ext.map_or(false, |ext| ext.text() == exp.text());
                    record_match(stats, &policy.field, hit);
                }
                Comparator::ExactDate => {
                    let expected_date = normalize_date_zeros(&exp.text());
                    let hit = ext
                        .map_or(false, |ext| normalize_date_zeros(&ext.text()) == expected_date);
                    record_match(stats, &policy.field, hit);
                }
                Comparator::CosineThreshold => {
                    let expected_tokens = tokenize(&exp.text());
                    let hit = ext.map_or(false, |ext| {
                        cosine(&expected_tokens, &tokenize(&ext.text())) > COSINE_MATCH_THRESHOLD
                    });
                    record_match(stats, &policy.field, hit);
                }
                Comparator::SmithWatermanRatio => {
                    let expected_tokens = tokenize(&exp.text());
                    if expected_tokens.is_empty() {
                        continue;
                    }
                    let extracted_tokens = ext.map(|ext| tokenize(&ext.text())).unwrap_or_default();
                    let aligner = SmithWaterman::new(0.0, 0.0);
                    let ratio = aligner.score(&expected_tokens, &extracted_tokens)
                        / expected_tokens.len() as f64;
                    record_score(stats, &policy.field, ratio);
                }
                Comparator::SetPrecisionRecall => {
                    let expected_items = tokenize_items(exp);
                    let extracted_items = ext.map(tokenize_items).unwrap_or_default();
                    let matched_extracted = extracted_items
                        .iter()
                        .filter(|item| {
                            expected_items
                                .iter()
                                .any(|exp| cosine(item, exp) > SET_MATCH_THRESHOLD)
                        })
                        .count();
                    let precision = if extracted_items.is_empty() {
                        0.0
                    } else {
                        matched_extracted as f64 / extracted_items.len() as f64
                    };
                    let matched_expected = expected_items
                        .iter()
                        .filter(|item| {
                            extracted_items
                                .iter()
                                .any(|ext| cosine(item, ext) > SET_MATCH_THRESHOLD)
                        })
                        .count();
                    let recall = matched_expected as f64 / expected_items.len() as f64;
                    record_score(stats, &format!("{} precision", policy.field), precision);
                    record_score(stats, &format!("{} recall", policy.field), recall);
                }
            }
        }
    }

    /// The raw accumulated statistic behind `name`, mostly for inspection.
    pub fn stat(&self, name: &str) -> Option<&FieldStat> {
        self.stats.get(name)
    }

    /// Reduces the accumulated statistics to one value per field. Counter
    /// fields nothing was measured for and score fields with no samples are
    /// omitted. The output never depends on observation order: score samples
    /// are totally ordered before summation.
    pub fn summarize(&self) -> BTreeMap<String, FieldSummary> {
        let mut summary = BTreeMap::new();
        for (name, stat) in &self.stats {
            let entry = match stat {
                FieldStat::Matches { correct, total } => {
                    if *total == 0 {
                        continue;
                    }
                    FieldSummary {
                        kind: MetricKind::Accuracy,
                        value: *correct as f64 / *total as f64,
                        population: *total,
                    }
                }
                FieldStat::Scores(samples) => {
                    if samples.is_empty() {
                        continue;
                    }
                    let mut sorted = samples.clone();
                    sorted.sort_by(f64::total_cmp);
                    FieldSummary {
                        kind: MetricKind::MeanScore,
                        value: sorted.iter().sum::<f64>() / sorted.len() as f64,
                        population: sorted.len(),
                    }
                }
            };
            summary.insert(name.clone(), entry);
        }
        summary
    }

    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            summary: self.summarize(),
        }
    }
}

fn record_match(stats: &mut BTreeMap<String, FieldStat>, name: &str, hit: bool) {
    if let Some(FieldStat::Matches { correct, total }) = stats.get_mut(name) {
        *total += 1;
        if hit {
            *correct += 1;
        }
    }
}

fn record_score(stats: &mut BTreeMap<String, FieldStat>, name: &str, score: f64) {
    if let Some(FieldStat::Scores(samples)) = stats.get_mut(name) {
        samples.push(score);
    }
}

fn tokenize_items(value: &FieldValue) -> Vec<Vec<String>> {
    value.items().into_iter().map(tokenize).collect()
}

/// Printable per-field corpus summary.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    summary: BTreeMap<String, FieldSummary>,
}

impl EvaluationReport {
    pub fn summary(&self) -> &BTreeMap<String, FieldSummary> {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entry) in &self.summary {
            writeln!(
                f,
                "{:<24} {:<10} {:>7.2}% ({} documents)",
                name,
                entry.kind,
                entry.value * 100.0,
                entry.population
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(field: &str, value: &str) -> EvaluationRecord {
        let mut record = EvaluationRecord::new();
        record.set_single(field, value);
        record
    }

    #[test]
    fn test_exact_match_counts() {
        let mut engine = EvaluationEngine::new(vec![FieldPolicy::new("volume", Comparator::Exact)]);
        engine.observe(&single("volume", "12"), &single("volume", "12"));

        assert_eq!(
            Some(&FieldStat::Matches {
                correct: 1,
                total: 1
            }),
            engine.stat("volume")
        );
        let summary = engine.summarize();
        assert_eq!(1.0, summary["volume"].value);
        assert_eq!(MetricKind::Accuracy, summary["volume"].kind);
    }

    #[test]
    fn test_empty_expected_excludes_document() {
        let mut engine = EvaluationEngine::new(vec![FieldPolicy::new("volume", Comparator::Exact)]);
        engine.observe(&single("volume", ""), &single("volume", "12"));
        engine.observe(&EvaluationRecord::new(), &single("volume", "12"));

        assert_eq!(
            Some(&FieldStat::Matches {
                correct: 0,
                total: 0
            }),
            engine.stat("volume")
        );
        assert!(engine.summarize().is_empty());
    }

    #[test]
    fn test_missing_extraction_is_wrong() {
        let mut engine = EvaluationEngine::new(vec![FieldPolicy::new("volume", Comparator::Exact)]);
        engine.observe(&single("volume", "12"), &EvaluationRecord::new());

        assert_eq!(
            Some(&FieldStat::Matches {
                correct: 0,
                total: 1
            }),
            engine.stat("volume")
        );
    }

    #[test]
    fn test_date_leading_zeros_stripped() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("date", Comparator::ExactDate)]);
        engine.observe(&single("date", "2020 03"), &single("date", "2020 3"));
        engine.observe(&single("date", "2020 03"), &single("date", "2020 4"));

        assert_eq!(
            Some(&FieldStat::Matches {
                correct: 1,
                total: 2
            }),
            engine.stat("date")
        );
    }

    #[test]
    fn test_cosine_threshold_field() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("journal", Comparator::CosineThreshold)]);
        engine.observe(
            &single("journal", "Journal of Tests"),
            &single("journal", "journal of tests!"),
        );
        engine.observe(
            &single("journal", "Journal of Tests"),
            &single("journal", "Annals of Other Things"),
        );

        assert_eq!(
            Some(&FieldStat::Matches {
                correct: 1,
                total: 2
            }),
            engine.stat("journal")
        );
    }

    #[test]
    fn test_alignment_ratio_samples() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("title", Comparator::SmithWatermanRatio)]);
        engine.observe(&single("title", "a b c d"), &single("title", "a b x d"));
        engine.observe(&single("title", "p q"), &EvaluationRecord::new());
        engine.observe(&single("title", "!!!"), &single("title", "anything"));

        assert_eq!(
            Some(&FieldStat::Scores(vec![0.75, 0.0])),
            engine.stat("title")
        );
        assert_eq!(0.375, engine.summarize()["title"].value);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("abstract", Comparator::SmithWatermanRatio)]);
        engine.observe(
            &single("abstract", "We classify zones."),
            &single("abstract", "we CLASSIFY zones"),
        );

        assert_eq!(Some(&FieldStat::Scores(vec![1.0])), engine.stat("abstract"));
    }

    #[test]
    fn test_set_precision_recall() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("authors", Comparator::SetPrecisionRecall)]);
        let mut expected = EvaluationRecord::new();
        expected.set_list("authors", &["John Smith", "Anna Kowalska"]);
        let mut extracted = EvaluationRecord::new();
        extracted.set_list("authors", &["Smith, John", "B. Other"]);
        engine.observe(&expected, &extracted);

        assert_eq!(
            Some(&FieldStat::Scores(vec![0.5])),
            engine.stat("authors precision")
        );
        assert_eq!(
            Some(&FieldStat::Scores(vec![0.5])),
            engine.stat("authors recall")
        );
    }

    #[test]
    fn test_empty_extraction_scores_zero() {
        let mut engine =
            EvaluationEngine::new(vec![FieldPolicy::new("keywords", Comparator::SetPrecisionRecall)]);
        let mut expected = EvaluationRecord::new();
        expected.set_list("keywords", &["x", "y"]);
        engine.observe(&expected, &EvaluationRecord::new());

        assert_eq!(
            Some(&FieldStat::Scores(vec![0.0])),
            engine.stat("keywords precision")
        );
        assert_eq!(
            Some(&FieldStat::Scores(vec![0.0])),
            engine.stat("keywords recall")
        );
    }

    #[test]
    fn test_observation_order_does_not_matter() {
        let docs = [
            (single("title", "a b c d"), single("title", "a b x d")),
            (single("title", "p q"), EvaluationRecord::new()),
            (single("title", "r s t"), single("title", "r s t")),
        ];
        let mut forward = EvaluationEngine::new(metadata_policies());
        for (expected, extracted) in &docs {
            forward.observe(expected, extracted);
        }
        let mut backward = EvaluationEngine::new(metadata_policies());
        for (expected, extracted) in docs.iter().rev() {
            backward.observe(expected, extracted);
        }

        assert_eq!(forward.summarize(), backward.summarize());
    }

    #[test]
    fn test_fresh_engine_summarizes_empty() {
        let engine = EvaluationEngine::new(metadata_policies());
        assert!(engine.summarize().is_empty());
        assert!(engine.report().is_empty());
    }

    #[test]
    fn test_report_format() {
        let mut engine = EvaluationEngine::new(vec![FieldPolicy::new("volume", Comparator::Exact)]);
        engine.observe(&single("volume", "12"), &single("volume", "12"));
        engine.observe(&single("volume", "7"), &single("volume", "8"));

        assert_eq!(
            "volume                   accuracy     50.00% (2 documents)\n",
            &engine.report().to_string()
        );
    }
}
