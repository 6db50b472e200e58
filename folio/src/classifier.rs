use std::io::{BufRead, Read, Write};
use std::marker::PhantomData;
use std::sync::Arc;

use folio_svm::{Kernel, SvmModel, SvmParams};

use crate::errors::{FolioError, Result};
use crate::features::{FeatureVector, TrainingSample};
use crate::labels::Label;
use crate::penalty::ClassWeights;
use crate::scaling::ScaleTable;

/// Hyperparameters for [`ZoneClassifier::train`], passed by value so no two
/// training runs can observe each other's settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingParams {
    pub kernel: Kernel,
    pub cost: f64,
    pub epsilon: f64,
    pub shrinking: bool,
}

impl Default for TrainingParams {
    /// The long-serving zone classification settings: a cubic polynomial
    /// kernel with gamma 1/8 and coef0 1/2, cost 8.
    fn default() -> Self {
        Self {
            kernel: Kernel::Polynomial {
                degree: 3,
                gamma: 0.125,
                coef0: 0.5,
            },
            cost: 8.0,
            epsilon: 1e-3,
            shrinking: true,
        }
    }
}

/// A trained zone classifier: the ordered feature list it was built over,
/// the scale table fitted on its training corpus and the margin model.
///
/// Once trained the classifier is immutable and can be shared freely across
/// readers.
pub struct ZoneClassifier<L> {
    feature_names: Arc<[String]>,
    scaling: ScaleTable,
    svm: SvmModel,
    _label: PhantomData<L>,
}

impl<L> ZoneClassifier<L>
where
    L: Label,
{
    /// Trains a classifier over the labeled subset of `samples`.
    ///
    /// The scale table is fitted on the same subset, every vector passes
    /// through it before reaching the optimizer, and labels are mapped to
    /// their ordinals for the solver.
    ///
    /// # Arguments
    ///
    /// * `samples` - Feature vectors with optional labels; unlabeled ones
    ///   are ignored.
    /// * `weights` - Per-class penalty multipliers.
    /// * `params` - Kernel, cost and tolerance settings.
    ///
    /// # Errors
    ///
    /// [`FolioError::InsufficientData`] when no sample is labeled or all
    /// labeled samples share one label. Solver-side validation failures come
    /// back as [`FolioError::InvalidArgument`].
    pub fn train(
        samples: &[TrainingSample<L>],
        weights: &ClassWeights,
        params: TrainingParams,
    ) -> Result<Self> {
        let labeled: Vec<&TrainingSample<L>> =
            samples.iter().filter(|s| s.label.is_some()).collect();
        if labeled.is_empty() {
            return Err(FolioError::insufficient_data("the training set is empty"));
        }
        let mut ys = Vec::with_capacity(labeled.len());
        for sample in &labeled {
            if let Some(label) = sample.label {
                ys.push(label.ordinal());
            }
        }
        let mut distinct = ys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(FolioError::insufficient_data(
                "the training set contains a single class",
            ));
        }

        let scaling = ScaleTable::fit(labeled.iter().map(|s| &s.vector))?;
        let mut xs = Vec::with_capacity(labeled.len());
        for sample in &labeled {
            xs.push(scaling.apply(&sample.vector)?.into_values());
        }

        let svm_params = SvmParams {
            kernel: params.kernel,
            cost: params.cost,
            epsilon: params.epsilon,
            shrinking: params.shrinking,
            class_weights: weights.to_pairs(),
        };
        let svm = folio_svm::train(&xs, &ys, &svm_params)?;

        Ok(Self {
            feature_names: Arc::clone(&labeled[0].vector.names),
            scaling,
            svm,
            _label: PhantomData,
        })
    }

    /// Classifies one feature vector.
    ///
    /// # Errors
    ///
    /// [`FolioError::DimensionMismatch`] when the vector length differs from
    /// the model's feature list, [`FolioError::CorruptModel`] when the model
    /// votes for an ordinal outside the label enumeration.
    pub fn predict(&self, vector: &FeatureVector) -> Result<L> {
        if vector.len() != self.feature_names.len() {
            return Err(FolioError::dimension_mismatch(
                self.feature_names.len(),
                vector.len(),
            ));
        }
        let scaled = self.scaling.apply(vector)?;
        let ordinal = self.svm.predict(scaled.values())?;
        L::from_ordinal(ordinal).ok_or_else(|| {
            FolioError::corrupt_model(format!("class ordinal {ordinal} does not name a label"))
        })
    }

    pub fn dimension(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn scaling(&self) -> &ScaleTable {
        &self.scaling
    }

    /// Recovers aggregate per-feature weights from the pairwise decision
    /// functions.
    ///
    /// For each class pair the primal hyperplane is rebuilt from the two
    /// classes' support-vector ranges, and its per-dimension magnitudes are
    /// summed over all pairs, so one strongly discriminating pair cannot be
    /// erased by another.
    pub fn feature_weights(&self) -> Vec<(String, f64)> {
        let dim = self.feature_names.len();
        let ranges = self.svm.class_ranges();
        let k = self.svm.n_classes();
        let mut aggregate = vec![0.0; dim];
        for i in 0..k {
            for j in i + 1..k {
                let mut w = vec![0.0; dim];
                for m in ranges[i].clone() {
                    let coef = self.svm.coefficients[j - 1][m];
                    for (f, &sv) in self.svm.support_vectors[m].iter().enumerate() {
                        w[f] += coef * sv;
                    }
                }
                for m in ranges[j].clone() {
                    let coef = self.svm.coefficients[i][m];
                    for (f, &sv) in self.svm.support_vectors[m].iter().enumerate() {
                        w[f] += coef * sv;
                    }
                }
                for (total, part) in aggregate.iter_mut().zip(&w) {
                    *total += part.abs();
                }
            }
        }
        self.feature_names
            .iter()
            .cloned()
            .zip(aggregate)
            .collect()
    }

    /// Exports the feature list and margin model.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write_model<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let config = bincode::config::standard();
        bincode::encode_into_std_write(&self.feature_names.to_vec(), wtr, config)?;
        bincode::encode_into_std_write(&self.svm, wtr, config)?;
        Ok(())
    }

    /// Exports the scale table in its text form.
    ///
    /// # Errors
    ///
    /// [`FolioError::InvalidArgument`] when the table is the identity, which
    /// has nothing to persist.
    pub fn write_ranges<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        self.scaling.write_ranges(wtr)
    }

    /// Restores a classifier written by [`ZoneClassifier::write_model`].
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source holding the model bytes.
    /// * `ranges` - The range table source; `None` means identity scaling.
    ///
    /// # Errors
    ///
    /// [`FolioError::CorruptModel`] when the model bytes cannot be decoded
    /// or disagree with their own feature list; range table failures as in
    /// [`ScaleTable::read_ranges`].
    pub fn read_model<R>(rdr: &mut R, ranges: Option<&mut dyn BufRead>) -> Result<Self>
    where
        R: Read,
    {
        let config = bincode::config::standard();
        let feature_names: Vec<String> = bincode::decode_from_std_read(rdr, config)
            .map_err(|e| FolioError::corrupt_model(e.to_string()))?;
        let svm: SvmModel = bincode::decode_from_std_read(rdr, config)
            .map_err(|e| FolioError::corrupt_model(e.to_string()))?;
        if svm.dim != feature_names.len() {
            return Err(FolioError::corrupt_model(format!(
                "the model names {} features but expects {} dimensions",
                feature_names.len(),
                svm.dim
            )));
        }
        let scaling = match ranges {
            Some(ranges) => ScaleTable::read_ranges(ranges, feature_names.len())?,
            None => ScaleTable::identity(),
        };
        Ok(Self {
            feature_names: feature_names.into(),
            scaling,
            svm,
            _label: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{MetadataPart, ZoneCategory};

    fn names(n: usize) -> Arc<[String]> {
        (1..=n).map(|i| format!("f{i}")).collect::<Vec<_>>().into()
    }

    fn sample<L>(label: Option<L>, values: Vec<f64>, names: &Arc<[String]>) -> TrainingSample<L> {
        let vector = FeatureVector::new(values, Arc::clone(names)).unwrap();
        match label {
            Some(label) => TrainingSample::labeled(vector, label),
            None => TrainingSample::unlabeled(vector),
        }
    }

    fn linear_params() -> TrainingParams {
        TrainingParams {
            kernel: Kernel::Linear,
            cost: 10.0,
            ..TrainingParams::default()
        }
    }

    fn two_cluster_samples() -> Vec<TrainingSample<ZoneCategory>> {
        let names = names(2);
        #[rustfmt::skip]
        let rows = [
            (Some(ZoneCategory::Metadata), 0.0, 0.0),
            (Some(ZoneCategory::Metadata), 1.0, 0.5),
            (Some(ZoneCategory::Metadata), 0.5, 1.0),
            (Some(ZoneCategory::Body), 9.0, 10.0),
            (Some(ZoneCategory::Body), 10.0, 9.5),
            (Some(ZoneCategory::Body), 10.2, 10.0),
            (None, 5.0, 5.0),
        ];
        rows.iter()
            .map(|&(label, a, b)| sample(label, vec![a, b], &names))
            .collect()
    }

    #[test]
    fn test_train_predict_separable() {
        let samples = two_cluster_samples();
        let weights = ClassWeights::compute(&samples).unwrap();
        let classifier = ZoneClassifier::train(&samples, &weights, linear_params()).unwrap();

        for s in samples.iter().filter(|s| s.label.is_some()) {
            assert_eq!(s.label, Some(classifier.predict(&s.vector).unwrap()));
        }
    }

    #[test]
    fn test_train_rejects_empty() {
        let labeled = two_cluster_samples();
        let weights = ClassWeights::compute(&labeled).unwrap();
        let names = names(2);
        let unlabeled = vec![sample::<ZoneCategory>(None, vec![0.0, 0.0], &names)];

        let result = ZoneClassifier::train(&unlabeled, &weights, linear_params());
        assert!(result.is_err());
        assert_eq!(
            "InsufficientDataError: the training set is empty",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_train_rejects_single_class() {
        let labeled = two_cluster_samples();
        let weights = ClassWeights::compute(&labeled).unwrap();
        let names = names(2);
        let one_class = vec![
            sample(Some(ZoneCategory::Body), vec![0.0, 0.0], &names),
            sample(Some(ZoneCategory::Body), vec![1.0, 1.0], &names),
        ];

        let result = ZoneClassifier::train(&one_class, &weights, linear_params());
        assert!(result.is_err());
        assert_eq!(
            "InsufficientDataError: the training set contains a single class",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let samples = two_cluster_samples();
        let weights = ClassWeights::compute(&samples).unwrap();
        let classifier = ZoneClassifier::train(&samples, &weights, linear_params()).unwrap();

        let short = FeatureVector::new(vec![1.0], names(1)).unwrap();
        let result = classifier.predict(&short);
        assert!(result.is_err());
        assert_eq!(
            "DimensionMismatchError: expected 2 dimensions, got 1",
            &result.err().unwrap().to_string()
        );
    }

    fn cluster_samples<L>(labels: &[L]) -> Vec<TrainingSample<L>>
    where
        L: Label,
    {
        let names = names(2);
        let centers = [
            (0.0, 0.0),
            (8.0, 0.0),
            (0.0, 8.0),
            (8.0, 8.0),
            (4.0, 4.0),
        ];
        let mut samples = vec![];
        for (c, &label) in labels.iter().enumerate() {
            let (cx, cy) = centers[c];
            for (dx, dy) in [(0.0, 0.0), (0.4, 0.2), (-0.2, 0.4)] {
                samples.push(sample(Some(label), vec![cx + dx, cy + dy], &names));
            }
        }
        samples
    }

    #[test]
    fn test_feature_weights_cover_every_dimension() {
        let label_sets: [&[MetadataPart]; 3] = [
            &[MetadataPart::Title, MetadataPart::Author],
            &[
                MetadataPart::Title,
                MetadataPart::Author,
                MetadataPart::Abstract,
            ],
            &[
                MetadataPart::Title,
                MetadataPart::Author,
                MetadataPart::Affiliation,
                MetadataPart::Abstract,
                MetadataPart::Keywords,
            ],
        ];
        for labels in label_sets {
            let samples = cluster_samples(labels);
            let weights = ClassWeights::compute(&samples).unwrap();
            let classifier = ZoneClassifier::train(&samples, &weights, linear_params()).unwrap();

            let feature_weights = classifier.feature_weights();
            assert_eq!(classifier.dimension(), feature_weights.len());
            assert_eq!("f1", &feature_weights[0].0);
            assert_eq!("f2", &feature_weights[1].0);
            assert!(feature_weights.iter().all(|(_, w)| w.is_finite()));
            assert!(feature_weights.iter().any(|(_, w)| *w > 0.0));
        }
    }

    #[test]
    fn test_model_round_trip() {
        let samples = two_cluster_samples();
        let weights = ClassWeights::compute(&samples).unwrap();
        let classifier = ZoneClassifier::train(&samples, &weights, linear_params()).unwrap();

        let mut model_buf = vec![];
        classifier.write_model(&mut model_buf).unwrap();
        let mut range_buf = vec![];
        classifier.write_ranges(&mut range_buf).unwrap();

        let mut ranges = range_buf.as_slice();
        let restored = ZoneClassifier::<ZoneCategory>::read_model(
            &mut model_buf.as_slice(),
            Some(&mut ranges),
        )
        .unwrap();

        assert_eq!(classifier.feature_names(), restored.feature_names());
        assert_eq!(classifier.scaling(), restored.scaling());
        for s in samples.iter().filter(|s| s.label.is_some()) {
            assert_eq!(s.label, Some(restored.predict(&s.vector).unwrap()));
        }
    }

    #[test]
    fn test_read_model_without_ranges_is_identity() {
        let samples = two_cluster_samples();
        let weights = ClassWeights::compute(&samples).unwrap();
        let classifier = ZoneClassifier::train(&samples, &weights, linear_params()).unwrap();

        let mut model_buf = vec![];
        classifier.write_model(&mut model_buf).unwrap();
        let restored =
            ZoneClassifier::<ZoneCategory>::read_model(&mut model_buf.as_slice(), None).unwrap();

        assert!(restored.scaling().is_identity());
        assert_eq!(classifier.feature_names(), restored.feature_names());
    }

    #[test]
    fn test_read_model_garbage() {
        let result =
            ZoneClassifier::<ZoneCategory>::read_model(&mut [0xffu8, 0xff].as_slice(), None);

        assert!(matches!(result, Err(FolioError::CorruptModel(_))));
    }
}
