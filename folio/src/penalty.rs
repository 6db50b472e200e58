use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::errors::{FolioError, Result};
use crate::features::TrainingSample;
use crate::labels::Label;

/// Per-class penalty multipliers balancing uneven label frequencies.
///
/// The most frequent class gets weight 1 and every other class the ratio of
/// the top count to its own, so misclassifying a rare class costs
/// proportionally more during training. Classes absent from the sample set
/// carry no entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassWeights {
    weights: BTreeMap<usize, f64>,
}

impl ClassWeights {
    /// Counts labels over `samples` and derives inverse-frequency weights.
    /// Unlabeled samples are ignored.
    ///
    /// # Errors
    ///
    /// [`FolioError::NoLabeledSamples`] when no sample carries a label.
    pub fn compute<'a, L, I>(samples: I) -> Result<Self>
    where
        L: Label + 'a,
        I: IntoIterator<Item = &'a TrainingSample<L>>,
    {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for sample in samples {
            if let Some(label) = sample.label {
                *counts.entry(label.ordinal()).or_insert(0) += 1;
            }
        }
        let max_count = counts.values().fold(0, |acc, &c| acc.max(c));
        if max_count == 0 {
            return Err(FolioError::no_labeled_samples());
        }
        let weights = counts
            .into_iter()
            .map(|(ordinal, count)| (ordinal, max_count as f64 / count as f64))
            .collect();
        Ok(Self { weights })
    }

    /// The weight of the class at `ordinal`, `None` when the class never
    /// occurred.
    pub fn get(&self, ordinal: usize) -> Option<f64> {
        self.weights.get(&ordinal).copied()
    }

    /// Ordinal and weight pairs in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights.iter().map(|(&ordinal, &weight)| (ordinal, weight))
    }

    pub fn to_pairs(&self) -> Vec<(usize, f64)> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::features::FeatureVector;
    use crate::labels::ZoneCategory;

    fn sample(label: Option<ZoneCategory>) -> TrainingSample<ZoneCategory> {
        let names: Arc<[String]> = vec!["f1".to_string()].into();
        let vector = FeatureVector::new(vec![0.0], names).unwrap();
        match label {
            Some(label) => TrainingSample::labeled(vector, label),
            None => TrainingSample::unlabeled(vector),
        }
    }

    #[test]
    fn test_balanced_classes_all_weigh_one() {
        let samples = vec![
            sample(Some(ZoneCategory::Metadata)),
            sample(Some(ZoneCategory::Body)),
            sample(Some(ZoneCategory::Metadata)),
            sample(Some(ZoneCategory::Body)),
        ];
        let weights = ClassWeights::compute(&samples).unwrap();

        assert_eq!(
            vec![(0, 1.0), (1, 1.0)],
            weights.to_pairs()
        );
    }

    #[test]
    fn test_rare_class_weighs_more() {
        let samples = vec![
            sample(Some(ZoneCategory::Body)),
            sample(Some(ZoneCategory::Body)),
            sample(Some(ZoneCategory::Body)),
            sample(Some(ZoneCategory::References)),
            sample(None),
        ];
        let weights = ClassWeights::compute(&samples).unwrap();

        assert_eq!(Some(1.0), weights.get(ZoneCategory::Body.ordinal()));
        assert_eq!(Some(3.0), weights.get(ZoneCategory::References.ordinal()));
        assert_eq!(None, weights.get(ZoneCategory::Metadata.ordinal()));
        assert_eq!(2, weights.len());
    }

    #[test]
    fn test_no_labeled_samples() {
        let samples = vec![sample(None), sample(None)];
        let result = ClassWeights::compute(&samples);

        assert!(result.is_err());
        assert_eq!(
            "NoLabeledSamplesError: no sample carries a label",
            &result.err().unwrap().to_string()
        );
    }
}
