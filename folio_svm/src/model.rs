use std::io::{Read, Write};
use std::ops::Range;

use bincode::{Decode, Encode};

use crate::errors::{Result, SvmError};
use crate::kernel::Kernel;

/// A trained one-vs-one multi-class model.
///
/// The layout follows the classic pairwise formulation: support vectors are
/// stored grouped by class, and `coefficients` is a `(k - 1) x n_sv` matrix
/// where the dual coefficients of the pair `(i, j)` occupy row `j - 1` over
/// class `i`'s columns and row `i` over class `j`'s columns. Columns outside
/// the two involved classes are zero for that pair.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct SvmModel {
    /// Kernel the model was trained with.
    pub kernel: Kernel,

    /// Feature dimensionality.
    pub dim: usize,

    /// Class ids in ascending order; positions index `sv_counts` and votes.
    pub class_ordinals: Vec<usize>,

    /// Number of support vectors per class.
    pub sv_counts: Vec<usize>,

    /// Support vectors, grouped by class in `class_ordinals` order.
    pub support_vectors: Vec<Vec<f64>>,

    /// Signed dual coefficients, `(k - 1)` rows of `n_sv` columns.
    pub coefficients: Vec<Vec<f64>>,

    /// Decision thresholds, one per class pair in `(0,1), (0,2), ..` order.
    pub rho: Vec<f64>,
}

impl SvmModel {
    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.class_ordinals.len()
    }

    /// Total number of support vectors.
    pub fn support_vector_count(&self) -> usize {
        self.support_vectors.len()
    }

    /// Per-class index ranges into the support-vector block.
    ///
    /// Computed once from `sv_counts`; every consumer slices through these
    /// ranges instead of re-deriving offsets.
    pub fn class_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::with_capacity(self.sv_counts.len());
        let mut start = 0;
        for &count in &self.sv_counts {
            ranges.push(start..start + count);
            start += count;
        }
        ranges
    }

    /// Predicts the class id of a vector by pairwise voting.
    ///
    /// # Errors
    ///
    /// [`SvmError::InvalidParameter`] is returned if the vector length does
    /// not match the model dimensionality.
    pub fn predict(&self, x: &[f64]) -> Result<usize> {
        if x.len() != self.dim {
            return Err(SvmError::invalid_parameter(
                "x",
                format!("expected {} dimensions, got {}", self.dim, x.len()),
            ));
        }

        let kernel_values: Vec<f64> = self
            .support_vectors
            .iter()
            .map(|sv| self.kernel.compute(x, sv))
            .collect();
        let ranges = self.class_ranges();
        let k = self.n_classes();
        let mut votes = vec![0usize; k];
        let mut pair = 0;
        for i in 0..k {
            for j in i + 1..k {
                let mut value = 0.0;
                for m in ranges[i].clone() {
                    value += self.coefficients[j - 1][m] * kernel_values[m];
                }
                for m in ranges[j].clone() {
                    value += self.coefficients[i][m] * kernel_values[m];
                }
                value -= self.rho[pair];
                if value > 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                pair += 1;
            }
        }

        // Ties resolve to the earliest class.
        let mut best = 0;
        for c in 1..k {
            if votes[c] > votes[best] {
                best = c;
            }
        }
        Ok(self.class_ordinals[best])
    }

    /// Exports the model.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        Ok(bincode::decode_from_std_read(
            rdr,
            bincode::config::standard(),
        )?)
    }
}
