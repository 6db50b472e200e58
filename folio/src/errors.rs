//! Definition of errors.

use core::fmt;

use std::error::Error;

pub type Result<T, E = FolioError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum FolioError {
    FeatureComputation(FeatureComputationError),
    EmptyTrainingSet(EmptyTrainingSetError),
    InsufficientData(InsufficientDataError),
    NoLabeledSamples(NoLabeledSamplesError),
    ScaleDimensionMismatch(ScaleDimensionMismatchError),
    DimensionMismatch(DimensionMismatchError),
    CorruptModel(CorruptModelError),
    InvalidArgument(InvalidArgumentError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl FolioError {
    pub(crate) fn feature_computation<S>(feature: S, value: f64) -> Self
    where
        S: Into<String>,
    {
        Self::FeatureComputation(FeatureComputationError {
            feature: feature.into(),
            value,
        })
    }

    pub(crate) fn empty_training_set() -> Self {
        Self::EmptyTrainingSet(EmptyTrainingSetError)
    }

    pub(crate) fn insufficient_data<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InsufficientData(InsufficientDataError { msg: msg.into() })
    }

    pub(crate) fn no_labeled_samples() -> Self {
        Self::NoLabeledSamples(NoLabeledSamplesError)
    }

    pub(crate) fn scale_dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::ScaleDimensionMismatch(ScaleDimensionMismatchError { expected, actual })
    }

    pub(crate) fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch(DimensionMismatchError { expected, actual })
    }

    pub(crate) fn corrupt_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::CorruptModel(CorruptModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

impl fmt::Display for FolioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FeatureComputation(e) => e.fmt(f),
            Self::EmptyTrainingSet(e) => e.fmt(f),
            Self::InsufficientData(e) => e.fmt(f),
            Self::NoLabeledSamples(e) => e.fmt(f),
            Self::ScaleDimensionMismatch(e) => e.fmt(f),
            Self::DimensionMismatch(e) => e.fmt(f),
            Self::CorruptModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for FolioError {}

/// Error used when a feature calculator produces a non-finite value.
#[derive(Debug)]
pub struct FeatureComputationError {
    /// Name of the feature.
    pub(crate) feature: String,

    /// The offending value.
    pub(crate) value: f64,
}

impl fmt::Display for FeatureComputationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FeatureComputationError: {}: non-finite value ({})",
            self.feature, self.value
        )
    }
}

impl Error for FeatureComputationError {}

/// Error used when scaling limits are fitted over an empty corpus.
#[derive(Debug)]
pub struct EmptyTrainingSetError;

impl fmt::Display for EmptyTrainingSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EmptyTrainingSetError: no vectors to fit limits over")
    }
}

impl Error for EmptyTrainingSetError {}

/// Error used when a training set cannot support a classifier.
#[derive(Debug)]
pub struct InsufficientDataError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InsufficientDataError: {}", self.msg)
    }
}

impl Error for InsufficientDataError {}

/// Error used when every training sample is unlabeled.
#[derive(Debug)]
pub struct NoLabeledSamplesError;

impl fmt::Display for NoLabeledSamplesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NoLabeledSamplesError: no sample carries a label")
    }
}

impl Error for NoLabeledSamplesError {}

/// Error used when a restored range table disagrees with the feature set.
#[derive(Debug)]
pub struct ScaleDimensionMismatchError {
    pub(crate) expected: usize,
    pub(crate) actual: usize,
}

impl fmt::Display for ScaleDimensionMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ScaleDimensionMismatchError: expected {} dimensions, got {}",
            self.expected, self.actual
        )
    }
}

impl Error for ScaleDimensionMismatchError {}

/// Error used when a vector disagrees with the model's feature set.
#[derive(Debug)]
pub struct DimensionMismatchError {
    pub(crate) expected: usize,
    pub(crate) actual: usize,
}

impl fmt::Display for DimensionMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "DimensionMismatchError: expected {} dimensions, got {}",
            self.expected, self.actual
        )
    }
}

impl Error for DimensionMismatchError {}

/// Error used when persisted model state cannot be restored.
#[derive(Debug)]
pub struct CorruptModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for CorruptModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CorruptModelError: {}", self.msg)
    }
}

impl Error for CorruptModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

impl From<bincode::error::DecodeError> for FolioError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for FolioError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for FolioError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}

impl From<folio_svm::SvmError> for FolioError {
    fn from(error: folio_svm::SvmError) -> Self {
        match error {
            folio_svm::SvmError::EmptyProblem(_) => {
                Self::insufficient_data("the training set is empty")
            }
            folio_svm::SvmError::SingleClass(_) => {
                Self::insufficient_data("the training set contains a single class")
            }
            folio_svm::SvmError::DecodeError(e) => Self::DecodeError(e),
            folio_svm::SvmError::EncodeError(e) => Self::EncodeError(e),
            e => Self::invalid_argument("solver", e.to_string()),
        }
    }
}
