use std::sync::Arc;

use crate::errors::{FolioError, Result};

/// A single named feature: a pure function from an object in its context to
/// a real number.
pub trait FeatureCalculator<O, C> {
    /// Name of the feature, unique within a builder.
    fn name(&self) -> &str;

    /// Computes the feature value. Must be deterministic for a given pair.
    fn compute(&self, obj: &O, ctx: &C) -> f64;
}

/// An ordered, fixed-length numeric vector with a shared list of feature
/// names.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub(crate) values: Vec<f64>,
    pub(crate) names: Arc<[String]>,
}

impl FeatureVector {
    /// Creates a vector from raw values and a name list.
    ///
    /// # Errors
    ///
    /// [`FolioError::InvalidArgument`] if the lengths differ.
    pub fn new(values: Vec<f64>, names: Arc<[String]>) -> Result<Self> {
        if values.len() != names.len() {
            return Err(FolioError::invalid_argument(
                "values",
                format!("{} values for {} feature names", values.len(), names.len()),
            ));
        }
        Ok(Self { values, names })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks a value up by feature name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// A feature vector with an optional label, the unit of classifier training.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSample<L> {
    pub vector: FeatureVector,
    pub label: Option<L>,
}

impl<L> TrainingSample<L> {
    pub fn labeled(vector: FeatureVector, label: L) -> Self {
        Self {
            vector,
            label: Some(label),
        }
    }

    pub fn unlabeled(vector: FeatureVector) -> Self {
        Self {
            vector,
            label: None,
        }
    }
}

/// Composes an ordered set of feature calculators into fixed-dimension
/// vectors.
///
/// All vectors built by one builder share the same length and name order.
pub struct FeatureVectorBuilder<O, C> {
    calculators: Vec<Box<dyn FeatureCalculator<O, C>>>,
    names: Arc<[String]>,
}

impl<O, C> FeatureVectorBuilder<O, C> {
    /// Creates a builder from calculators evaluated in the given order.
    ///
    /// # Errors
    ///
    /// [`FolioError::InvalidArgument`] if the list is empty or two
    /// calculators share a name.
    pub fn new(calculators: Vec<Box<dyn FeatureCalculator<O, C>>>) -> Result<Self> {
        if calculators.is_empty() {
            return Err(FolioError::invalid_argument(
                "calculators",
                "contains no calculators",
            ));
        }
        let mut names = Vec::with_capacity(calculators.len());
        for calculator in &calculators {
            let name = calculator.name();
            if names.iter().any(|n| n == name) {
                return Err(FolioError::invalid_argument(
                    "calculators",
                    format!("duplicate feature name: {name}"),
                ));
            }
            names.push(name.to_string());
        }
        Ok(Self {
            calculators,
            names: names.into(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.calculators.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn shared_names(&self) -> Arc<[String]> {
        Arc::clone(&self.names)
    }

    /// Evaluates every calculator on the pair and concatenates the results.
    ///
    /// # Errors
    ///
    /// [`FolioError::FeatureComputation`] as soon as a calculator produces a
    /// non-finite value; no value is substituted.
    pub fn build(&self, obj: &O, ctx: &C) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.calculators.len());
        for calculator in &self.calculators {
            let value = calculator.compute(obj, ctx);
            if !value.is_finite() {
                return Err(FolioError::feature_computation(calculator.name(), value));
            }
            values.push(value);
        }
        Ok(FeatureVector {
            values,
            names: Arc::clone(&self.names),
        })
    }
}
