//! Definition of errors.

use core::fmt;

use std::error::Error;

pub type Result<T, E = SvmError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum SvmError {
    InvalidParameter(InvalidParameterError),
    EmptyProblem(EmptyProblemError),
    SingleClass(SingleClassError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
}

impl SvmError {
    pub(crate) fn invalid_parameter<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidParameter(InvalidParameterError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn empty_problem() -> Self {
        Self::EmptyProblem(EmptyProblemError)
    }

    pub(crate) fn single_class() -> Self {
        Self::SingleClass(SingleClassError)
    }
}

impl fmt::Display for SvmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidParameter(e) => e.fmt(f),
            Self::EmptyProblem(e) => e.fmt(f),
            Self::SingleClass(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
        }
    }
}

impl Error for SvmError {}

/// Error used when a training or prediction parameter is invalid.
#[derive(Debug)]
pub struct InvalidParameterError {
    /// Name of the parameter.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidParameterError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidParameterError {}

/// Error used when the training problem contains no samples.
#[derive(Debug)]
pub struct EmptyProblemError;

impl fmt::Display for EmptyProblemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EmptyProblemError: the training problem contains no samples")
    }
}

impl Error for EmptyProblemError {}

/// Error used when the training problem contains fewer than two classes.
#[derive(Debug)]
pub struct SingleClassError;

impl fmt::Display for SingleClassError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SingleClassError: the training problem contains a single class"
        )
    }
}

impl Error for SingleClassError {}

impl From<bincode::error::DecodeError> for SvmError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for SvmError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}
