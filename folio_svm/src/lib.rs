//! # folio_svm
//!
//! Kernel support-vector machine training and inference used by the folio
//! zone classifier: a sequential-minimal-optimization solver for the binary
//! sub-problems and a one-vs-one multi-class model with class-weighted costs.
//!
//! ## Examples
//!
//! ```
//! use folio_svm::{train, Kernel, SvmParams};
//!
//! let xs = vec![vec![0.0], vec![0.2], vec![1.0], vec![1.2]];
//! let ys = vec![0, 0, 1, 1];
//! let params = SvmParams {
//!     kernel: Kernel::Linear,
//!     cost: 10.0,
//!     epsilon: 1e-3,
//!     shrinking: true,
//!     class_weights: vec![],
//! };
//!
//! let model = train(&xs, &ys, &params).unwrap();
//! assert_eq!(0, model.predict(&[0.1]).unwrap());
//! assert_eq!(1, model.predict(&[1.1]).unwrap());
//! ```

pub mod errors;

mod kernel;
mod model;
mod solver;
mod train;

pub use errors::{Result, SvmError};
pub use kernel::Kernel;
pub use model::SvmModel;
pub use train::{train, SvmParams};
