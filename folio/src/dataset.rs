//! Text interchange format for training data, one sample per line:
//! the label ordinal followed by 1-based `index:value` pairs.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::errors::{FolioError, Result};
use crate::features::{FeatureVector, TrainingSample};
use crate::labels::Label;

/// Writes labeled samples in dataset text form, skipping unlabeled ones.
/// Returns the number of lines written.
///
/// # Errors
///
/// Any I/O error as is.
pub fn write_libsvm<'a, L, I, W>(samples: I, wtr: &mut W) -> Result<usize>
where
    L: Label + 'a,
    I: IntoIterator<Item = &'a TrainingSample<L>>,
    W: Write,
{
    let mut written = 0;
    for sample in samples {
        let label = match sample.label {
            Some(label) => label,
            None => continue,
        };
        write!(wtr, "{}", label.ordinal())?;
        for (i, value) in sample.vector.values().iter().enumerate() {
            write!(wtr, " {}:{:.5}", i + 1, value)?;
        }
        writeln!(wtr)?;
        written += 1;
    }
    Ok(written)
}

/// Reads a dataset written by [`write_libsvm`] back into dense samples.
///
/// Vectors are sized to the largest feature index in the file, absent
/// indices fill with zero, and feature names are synthesized as `f1`..`fN`.
///
/// # Errors
///
/// [`FolioError::InvalidArgument`] on a label ordinal outside `L` or a
/// malformed feature pair, with the offending 1-based line number.
pub fn read_libsvm<L, R>(rdr: R) -> Result<Vec<TrainingSample<L>>>
where
    L: Label,
    R: BufRead,
{
    let mut rows = vec![];
    let mut dim = 0;
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let n = i + 1;
        let mut parts = line.split_whitespace();
        let ordinal: usize = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| {
                FolioError::invalid_argument("data", format!("line {n}: malformed label"))
            })?;
        let label = L::from_ordinal(ordinal).ok_or_else(|| {
            FolioError::invalid_argument("data", format!("line {n}: unknown label ordinal {ordinal}"))
        })?;
        let mut pairs = vec![];
        for pair in parts {
            let (index, value) = pair
                .split_once(':')
                .and_then(|(index, value)| {
                    Some((index.parse::<usize>().ok()?, value.parse::<f64>().ok()?))
                })
                .ok_or_else(|| {
                    FolioError::invalid_argument(
                        "data",
                        format!("line {n}: malformed feature pair: {pair}"),
                    )
                })?;
            if index == 0 {
                return Err(FolioError::invalid_argument(
                    "data",
                    format!("line {n}: feature index must be positive"),
                ));
            }
            dim = dim.max(index);
            pairs.push((index, value));
        }
        rows.push((label, pairs));
    }
    let names: Arc<[String]> = (1..=dim).map(|i| format!("f{i}")).collect::<Vec<_>>().into();
    let mut samples = Vec::with_capacity(rows.len());
    for (label, pairs) in rows {
        let mut values = vec![0.0; dim];
        for (index, value) in pairs {
            values[index - 1] = value;
        }
        let vector = FeatureVector::new(values, Arc::clone(&names))?;
        samples.push(TrainingSample::labeled(vector, label));
    }
    Ok(samples)
}
