//! # Folio
//!
//! Folio classifies document page zones with a kernel support-vector model
//! and measures extracted bibliographic metadata against ground truth.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use folio::{
//!     ClassWeights, FeatureVector, Kernel, TrainingParams, TrainingSample, ZoneCategory,
//!     ZoneClassifier,
//! };
//!
//! let names: Arc<[String]> = vec!["x".to_string(), "y".to_string()].into();
//! let mut samples = vec![];
//! for (label, x, y) in [
//!     (ZoneCategory::Metadata, 0.0, 0.1),
//!     (ZoneCategory::Metadata, 0.2, 0.0),
//!     (ZoneCategory::Body, 1.0, 0.9),
//!     (ZoneCategory::Body, 0.9, 1.1),
//! ] {
//!     let vector = FeatureVector::new(vec![x, y], Arc::clone(&names)).unwrap();
//!     samples.push(TrainingSample::labeled(vector, label));
//! }
//!
//! let weights = ClassWeights::compute(&samples).unwrap();
//! let params = TrainingParams {
//!     kernel: Kernel::Linear,
//!     cost: 10.0,
//!     ..TrainingParams::default()
//! };
//! let classifier = ZoneClassifier::train(&samples, &weights, params).unwrap();
//!
//! let probe = FeatureVector::new(vec![0.1, 0.0], Arc::clone(&names)).unwrap();
//! assert_eq!(ZoneCategory::Metadata, classifier.predict(&probe).unwrap());
//! ```

pub mod errors;

mod classifier;
mod dataset;
mod evaluation;
mod features;
mod labels;
mod penalty;
mod records;
mod scaling;
mod similarity;
mod zones;

pub use classifier::{TrainingParams, ZoneClassifier};
pub use dataset::{read_libsvm, write_libsvm};
pub use evaluation::{
    metadata_policies, Comparator, EvaluationEngine, EvaluationReport, FieldPolicy, FieldStat,
    FieldSummary, MetricKind,
};
pub use features::{FeatureCalculator, FeatureVector, FeatureVectorBuilder, TrainingSample};
pub use folio_svm::Kernel;
pub use labels::{Label, MetadataPart, ZoneCategory};
pub use penalty::ClassWeights;
pub use records::{EvaluationRecord, FieldValue};
pub use scaling::{FeatureLimits, ScaleTable};
pub use similarity::{cosine, normalize_date_zeros, tokenize, SmithWaterman};
pub use zones::{coarse_registry, metadata_registry, Page, Zone};
