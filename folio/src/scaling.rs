use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::errors::{FolioError, Result};
use crate::features::FeatureVector;

/// Observed value range of one feature dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureLimits {
    pub min: f64,
    pub max: f64,
}

/// A per-dimension linear transform from observed training ranges to a
/// target interval.
///
/// Tables are fitted once over a training corpus and applied at both train
/// and predict time. The identity table stands in when no range data is
/// available, e.g. a model persisted without its range file, and returns
/// every vector unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTable {
    lo: f64,
    hi: f64,
    limits: Option<Vec<FeatureLimits>>,
}

impl ScaleTable {
    /// Fits limits over a corpus, targeting the `[0, 1]` interval.
    ///
    /// # Errors
    ///
    /// [`FolioError::EmptyTrainingSet`] when `vectors` yields nothing and
    /// [`FolioError::InvalidArgument`] when the vectors disagree in length.
    pub fn fit<'a, I>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        Self::fit_with_target(vectors, 0.0, 1.0)
    }

    /// Fits limits over a corpus, targeting `[lo, hi]`.
    ///
    /// # Errors
    ///
    /// As [`ScaleTable::fit`]; additionally [`FolioError::InvalidArgument`]
    /// when `lo >= hi`.
    pub fn fit_with_target<'a, I>(vectors: I, lo: f64, hi: f64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        if lo >= hi {
            return Err(FolioError::invalid_argument(
                "target",
                format!("lower bound {lo} is not below upper bound {hi}"),
            ));
        }
        let mut limits: Option<Vec<FeatureLimits>> = None;
        for vector in vectors {
            match &mut limits {
                None => {
                    limits = Some(
                        vector
                            .values()
                            .iter()
                            .map(|&v| FeatureLimits { min: v, max: v })
                            .collect(),
                    );
                }
                Some(limits) => {
                    if vector.len() != limits.len() {
                        return Err(FolioError::invalid_argument(
                            "vectors",
                            format!(
                                "expected {} dimensions, got {}",
                                limits.len(),
                                vector.len()
                            ),
                        ));
                    }
                    for (limit, &v) in limits.iter_mut().zip(vector.values()) {
                        limit.min = limit.min.min(v);
                        limit.max = limit.max.max(v);
                    }
                }
            }
        }
        match limits {
            Some(limits) => Ok(Self {
                lo,
                hi,
                limits: Some(limits),
            }),
            None => Err(FolioError::empty_training_set()),
        }
    }

    /// The no-op table.
    pub fn identity() -> Self {
        Self {
            lo: 0.0,
            hi: 1.0,
            limits: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.limits.is_none()
    }

    /// Number of dimensions, `None` for the identity table.
    pub fn dimension(&self) -> Option<usize> {
        self.limits.as_ref().map(|l| l.len())
    }

    pub fn target(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Maps every dimension of `vector` from `[min, max]` to `[lo, hi]`.
    ///
    /// A degenerate dimension (`max == min`) maps to `lo`. Values never seen
    /// during fitting map by the same linear formula and may land outside
    /// the target interval.
    ///
    /// # Errors
    ///
    /// [`FolioError::DimensionMismatch`] when the vector length differs from
    /// the table's.
    pub fn apply(&self, vector: &FeatureVector) -> Result<FeatureVector> {
        let limits = match &self.limits {
            Some(limits) => limits,
            None => return Ok(vector.clone()),
        };
        if vector.len() != limits.len() {
            return Err(FolioError::dimension_mismatch(limits.len(), vector.len()));
        }
        let values = limits
            .iter()
            .zip(vector.values())
            .map(|(limit, &v)| {
                if limit.max > limit.min {
                    self.lo + (v - limit.min) * (self.hi - self.lo) / (limit.max - limit.min)
                } else {
                    self.lo
                }
            })
            .collect();
        Ok(FeatureVector {
            values,
            names: Arc::clone(&vector.names),
        })
    }

    /// Writes the table as text: one `lo hi` line, then one `min max` line
    /// per dimension in feature order.
    ///
    /// # Errors
    ///
    /// [`FolioError::InvalidArgument`] for the identity table, which has no
    /// ranges to persist, or any I/O error as is.
    pub fn write_ranges<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let limits = match &self.limits {
            Some(limits) => limits,
            None => {
                return Err(FolioError::invalid_argument(
                    "table",
                    "the identity table has no ranges",
                ))
            }
        };
        writeln!(wtr, "{} {}", self.lo, self.hi)?;
        for limit in limits {
            writeln!(wtr, "{} {}", limit.min, limit.max)?;
        }
        Ok(())
    }

    /// Restores a table written by [`ScaleTable::write_ranges`].
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    /// * `expected_dim` - Dimensionality of the active feature set.
    ///
    /// # Errors
    ///
    /// [`FolioError::ScaleDimensionMismatch`] when the restored dimension
    /// count is not `expected_dim`, [`FolioError::CorruptModel`] on
    /// malformed content.
    pub fn read_ranges<R>(rdr: R, expected_dim: usize) -> Result<Self>
    where
        R: BufRead,
    {
        let mut lines = vec![];
        for line in rdr.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        if lines.is_empty() {
            return Err(FolioError::corrupt_model("the range table is empty"));
        }
        let (lo, hi) = parse_pair(&lines[0])?;
        if lo >= hi {
            return Err(FolioError::corrupt_model(format!(
                "target interval [{lo}, {hi}] is empty"
            )));
        }
        if lines.len() - 1 != expected_dim {
            return Err(FolioError::scale_dimension_mismatch(
                expected_dim,
                lines.len() - 1,
            ));
        }
        let mut limits = Vec::with_capacity(expected_dim);
        for line in &lines[1..] {
            let (min, max) = parse_pair(line)?;
            if min > max {
                return Err(FolioError::corrupt_model(format!(
                    "inverted range [{min}, {max}]"
                )));
            }
            limits.push(FeatureLimits { min, max });
        }
        Ok(Self {
            lo,
            hi,
            limits: Some(limits),
        })
    }
}

fn parse_pair(line: &str) -> Result<(f64, f64)> {
    let mut parts = line.split_whitespace();
    let parse = |part: Option<&str>| {
        part.and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(|| FolioError::corrupt_model(format!("malformed range line: {line}")))
    };
    let first = parse(parts.next())?;
    let second = parse(parts.next())?;
    if parts.next().is_some() {
        return Err(FolioError::corrupt_model(format!(
            "malformed range line: {line}"
        )));
    }
    Ok((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors(rows: &[Vec<f64>]) -> Vec<FeatureVector> {
        let names: Arc<[String]> = (1..=rows[0].len())
            .map(|i| format!("f{i}"))
            .collect::<Vec<_>>()
            .into();
        rows.iter()
            .map(|row| FeatureVector::new(row.clone(), Arc::clone(&names)).unwrap())
            .collect()
    }

    #[test]
    fn test_fit_empty() {
        let result = ScaleTable::fit(&[]);

        assert!(result.is_err());
        assert_eq!(
            "EmptyTrainingSetError: no vectors to fit limits over",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_fit_ragged() {
        let names_a: Arc<[String]> = vec!["a".to_string()].into();
        let names_b: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        let vs = vec![
            FeatureVector::new(vec![1.0], names_a).unwrap(),
            FeatureVector::new(vec![1.0, 2.0], names_b).unwrap(),
        ];
        let result = ScaleTable::fit(&vs);

        assert!(result.is_err());
        assert_eq!(
            "InvalidArgumentError: vectors: expected 1 dimensions, got 2",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_apply_maps_into_target() {
        let vs = vectors(&[
            vec![0.0, 10.0, 7.0],
            vec![1.0, 12.5, 7.0],
            vec![4.0, 20.0, 7.0],
        ]);
        let table = ScaleTable::fit(&vs).unwrap();

        let scaled = table.apply(&vs[0]).unwrap();
        assert_eq!(vec![0.0, 0.0, 0.0], scaled.values().to_vec());
        let scaled = table.apply(&vs[1]).unwrap();
        assert_eq!(vec![0.25, 0.25, 0.0], scaled.values().to_vec());
        let scaled = table.apply(&vs[2]).unwrap();
        assert_eq!(vec![1.0, 1.0, 0.0], scaled.values().to_vec());
    }

    #[test]
    fn test_apply_degenerate_dimension_maps_to_lo() {
        let vs = vectors(&[vec![7.0], vec![7.0]]);
        let table = ScaleTable::fit_with_target(&vs, -1.0, 1.0).unwrap();

        let scaled = table.apply(&vs[0]).unwrap();
        assert_eq!(vec![-1.0], scaled.values().to_vec());
    }

    #[test]
    fn test_apply_does_not_clamp() {
        let vs = vectors(&[vec![0.0], vec![2.0]]);
        let table = ScaleTable::fit(&vs).unwrap();
        let outside = vectors(&[vec![4.0]]);

        let scaled = table.apply(&outside[0]).unwrap();
        assert_eq!(vec![2.0], scaled.values().to_vec());
    }

    #[test]
    fn test_apply_dimension_mismatch() {
        let vs = vectors(&[vec![0.0, 1.0], vec![2.0, 3.0]]);
        let table = ScaleTable::fit(&vs).unwrap();
        let short = vectors(&[vec![1.0]]);
        let result = table.apply(&short[0]);

        assert!(result.is_err());
        assert_eq!(
            "DimensionMismatchError: expected 2 dimensions, got 1",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_identity_returns_input() {
        let vs = vectors(&[vec![3.0, -5.0]]);
        let table = ScaleTable::identity();

        assert!(table.is_identity());
        assert_eq!(vs[0], table.apply(&vs[0]).unwrap());
    }

    #[test]
    fn test_ranges_round_trip() {
        let vs = vectors(&[vec![0.25, -3.5, 7.0], vec![1.75, 2.5, 7.0]]);
        let table = ScaleTable::fit_with_target(&vs, -1.0, 2.0).unwrap();

        let mut buf = vec![];
        table.write_ranges(&mut buf).unwrap();
        let restored = ScaleTable::read_ranges(buf.as_slice(), 3).unwrap();

        assert_eq!(table, restored);
    }

    #[test]
    fn test_ranges_text_layout() {
        let vs = vectors(&[vec![0.5, 2.0], vec![1.5, 4.0]]);
        let table = ScaleTable::fit(&vs).unwrap();

        let mut buf = vec![];
        table.write_ranges(&mut buf).unwrap();
        assert_eq!("0 1\n0.5 1.5\n2 4\n", &String::from_utf8(buf).unwrap());
    }

    #[test]
    fn test_read_ranges_dimension_mismatch() {
        let text = "0 1\n0 1\n0 1\n";
        let result = ScaleTable::read_ranges(text.as_bytes(), 3);

        assert!(result.is_err());
        assert_eq!(
            "ScaleDimensionMismatchError: expected 3 dimensions, got 2",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_read_ranges_malformed() {
        let text = "0 1\nzero one\n";
        let result = ScaleTable::read_ranges(text.as_bytes(), 1);

        assert!(result.is_err());
        assert_eq!(
            "CorruptModelError: malformed range line: zero one",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_write_ranges_identity() {
        let table = ScaleTable::identity();
        let mut buf = vec![];
        let result = table.write_ranges(&mut buf);

        assert!(result.is_err());
        assert_eq!(
            "InvalidArgumentError: table: the identity table has no ranges",
            &result.err().unwrap().to_string()
        );
    }
}
