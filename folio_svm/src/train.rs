use crate::errors::{Result, SvmError};
use crate::kernel::Kernel;
use crate::model::SvmModel;
use crate::solver::{solve, BinaryProblem};

/// Training parameters, passed through unchanged from the caller.
#[derive(Clone, Debug)]
pub struct SvmParams {
    pub kernel: Kernel,

    /// Cost hyperparameter `C`.
    pub cost: f64,

    /// Stopping tolerance of the optimizer.
    pub epsilon: f64,

    /// Shrinking-heuristic hint. The optimizer keeps the full active set, so
    /// this does not change the solution.
    pub shrinking: bool,

    /// Per-class cost multipliers as `(class id, weight)` pairs; classes
    /// without an entry use 1.0.
    pub class_weights: Vec<(usize, f64)>,
}

/// Trains a one-vs-one multi-class model.
///
/// # Arguments
///
/// * `xs` - Feature vectors, one per sample.
/// * `ys` - Class ids, parallel to `xs`.
/// * `params` - Kernel, cost and tolerance settings.
///
/// # Returns
///
/// A model containing one binary decision function per class pair.
///
/// # Errors
///
/// [`SvmError::EmptyProblem`] if `xs` is empty, [`SvmError::SingleClass`] if
/// all samples share one class, and [`SvmError::InvalidParameter`] on
/// inconsistent dimensions or non-positive hyperparameters.
pub fn train(xs: &[Vec<f64>], ys: &[usize], params: &SvmParams) -> Result<SvmModel> {
    if xs.is_empty() {
        return Err(SvmError::empty_problem());
    }
    if ys.len() != xs.len() {
        return Err(SvmError::invalid_parameter(
            "ys",
            format!("expected {} labels, got {}", xs.len(), ys.len()),
        ));
    }
    let dim = xs[0].len();
    if dim == 0 {
        return Err(SvmError::invalid_parameter(
            "xs",
            "samples have no dimensions",
        ));
    }
    for (t, x) in xs.iter().enumerate() {
        if x.len() != dim {
            return Err(SvmError::invalid_parameter(
                "xs",
                format!("sample {} has {} dimensions, expected {}", t, x.len(), dim),
            ));
        }
    }
    if params.cost <= 0.0 {
        return Err(SvmError::invalid_parameter("cost", "must be positive"));
    }
    if params.epsilon <= 0.0 {
        return Err(SvmError::invalid_parameter("epsilon", "must be positive"));
    }
    for &(ordinal, weight) in &params.class_weights {
        if weight <= 0.0 {
            return Err(SvmError::invalid_parameter(
                "class_weights",
                format!("weight of class {ordinal} must be positive"),
            ));
        }
    }

    let mut class_ordinals: Vec<usize> = ys.to_vec();
    class_ordinals.sort_unstable();
    class_ordinals.dedup();
    let k = class_ordinals.len();
    if k < 2 {
        return Err(SvmError::single_class());
    }

    let mut members: Vec<Vec<usize>> = vec![vec![]; k];
    for (t, &y) in ys.iter().enumerate() {
        if let Ok(c) = class_ordinals.binary_search(&y) {
            members[c].push(t);
        }
    }

    let weight_of = |ordinal: usize| {
        params
            .class_weights
            .iter()
            .find(|(o, _)| *o == ordinal)
            .map_or(1.0, |(_, w)| *w)
    };

    // Solve every unordered pair; remember which samples end up as support
    // vectors anywhere.
    let mut solutions = Vec::with_capacity(k * (k - 1) / 2);
    let mut is_sv = vec![false; xs.len()];
    for i in 0..k {
        for j in i + 1..k {
            let sub_xs: Vec<&[f64]> = members[i]
                .iter()
                .chain(&members[j])
                .map(|&t| xs[t].as_slice())
                .collect();
            let mut sub_ys = vec![1.0; members[i].len()];
            sub_ys.resize(sub_xs.len(), -1.0);
            let problem = BinaryProblem {
                xs: sub_xs,
                ys: sub_ys,
                cp: params.cost * weight_of(class_ordinals[i]),
                cn: params.cost * weight_of(class_ordinals[j]),
            };
            let solution = solve(&problem, &params.kernel, params.epsilon);
            for (local, &t) in members[i].iter().chain(&members[j]).enumerate() {
                if solution.alpha[local] > 0.0 {
                    is_sv[t] = true;
                }
            }
            solutions.push(solution);
        }
    }

    // Gather support vectors grouped by class and remember their columns.
    let mut sv_column = vec![usize::MAX; xs.len()];
    let mut support_vectors = vec![];
    let mut sv_counts = vec![0; k];
    for (c, class_members) in members.iter().enumerate() {
        for &t in class_members {
            if is_sv[t] {
                sv_column[t] = support_vectors.len();
                support_vectors.push(xs[t].clone());
                sv_counts[c] += 1;
            }
        }
    }

    // Scatter each pair's signed multipliers into the coefficient matrix:
    // class i's entries to row j - 1, class j's entries to row i.
    let mut coefficients = vec![vec![0.0; support_vectors.len()]; k - 1];
    let mut rho = Vec::with_capacity(solutions.len());
    let mut pair = 0;
    for i in 0..k {
        for j in i + 1..k {
            let solution = &solutions[pair];
            rho.push(solution.rho);
            for (local, &t) in members[i].iter().enumerate() {
                let a = solution.alpha[local];
                if a > 0.0 {
                    coefficients[j - 1][sv_column[t]] = a;
                }
            }
            let offset = members[i].len();
            for (local, &t) in members[j].iter().enumerate() {
                let a = solution.alpha[offset + local];
                if a > 0.0 {
                    coefficients[i][sv_column[t]] = -a;
                }
            }
            pair += 1;
        }
    }

    Ok(SvmModel {
        kernel: params.kernel,
        dim,
        class_ordinals,
        sv_counts,
        support_vectors,
        coefficients,
        rho,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(kernel: Kernel, cost: f64) -> SvmParams {
        SvmParams {
            kernel,
            cost,
            epsilon: 1e-3,
            shrinking: true,
            class_weights: vec![],
        }
    }

    fn three_clusters() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut xs = vec![];
        let mut ys = vec![];
        let centers = [(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)];
        for (c, &(cx, cy)) in centers.iter().enumerate() {
            for (dx, dy) in [(0.0, 0.0), (0.2, 0.1), (-0.1, 0.2), (0.1, -0.2)] {
                xs.push(vec![cx + dx, cy + dy]);
                ys.push(c);
            }
        }
        (xs, ys)
    }

    #[test]
    fn test_empty_problem() {
        let result = train(&[], &[], &params(Kernel::Linear, 1.0));

        assert!(result.is_err());
        assert_eq!(
            "EmptyProblemError: the training problem contains no samples",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_single_class() {
        let xs = vec![vec![0.0], vec![1.0]];
        let result = train(&xs, &[3, 3], &params(Kernel::Linear, 1.0));

        assert!(result.is_err());
        assert_eq!(
            "SingleClassError: the training problem contains a single class",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_ragged_dimensions() {
        let xs = vec![vec![0.0], vec![1.0, 2.0]];
        let result = train(&xs, &[0, 1], &params(Kernel::Linear, 1.0));

        assert!(result.is_err());
        assert_eq!(
            "InvalidParameterError: xs: sample 1 has 2 dimensions, expected 1",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_binary_separable() {
        let xs = vec![
            vec![0.0, 0.3],
            vec![0.2, 0.1],
            vec![0.1, 0.2],
            vec![1.0, 0.9],
            vec![0.9, 1.1],
            vec![1.1, 1.0],
        ];
        let ys = vec![0, 0, 0, 1, 1, 1];
        let model = train(&xs, &ys, &params(Kernel::Linear, 10.0)).unwrap();

        assert_eq!(2, model.n_classes());
        assert_eq!(1, model.coefficients.len());
        for (x, &y) in xs.iter().zip(&ys) {
            assert_eq!(y, model.predict(x).unwrap());
        }
    }

    #[test]
    fn test_multiclass_separable() {
        let (xs, ys) = three_clusters();
        let model = train(&xs, &ys, &params(Kernel::Rbf { gamma: 0.5 }, 10.0)).unwrap();

        assert_eq!(3, model.n_classes());
        assert_eq!(vec![0, 1, 2], model.class_ordinals);
        assert_eq!(3, model.rho.len());
        for (x, &y) in xs.iter().zip(&ys) {
            assert_eq!(y, model.predict(x).unwrap());
        }
    }

    #[test]
    fn test_sparse_ordinals_are_preserved() {
        let xs = vec![vec![0.0], vec![0.1], vec![5.0], vec![5.1]];
        let ys = vec![2, 2, 7, 7];
        let model = train(&xs, &ys, &params(Kernel::Linear, 10.0)).unwrap();

        assert_eq!(vec![2, 7], model.class_ordinals);
        assert_eq!(2, model.predict(&[0.05]).unwrap());
        assert_eq!(7, model.predict(&[5.05]).unwrap());
    }

    #[test]
    fn test_coefficient_layout() {
        let (xs, ys) = three_clusters();
        let model = train(&xs, &ys, &params(Kernel::Linear, 10.0)).unwrap();
        let ranges = model.class_ranges();

        let total: usize = model.sv_counts.iter().sum();
        assert_eq!(model.support_vector_count(), total);
        // Each pair's signed multipliers balance out, split across class i's
        // columns in row j - 1 and class j's columns in row i.
        for i in 0..3 {
            for j in i + 1..3 {
                let positive: f64 = ranges[i].clone().map(|m| model.coefficients[j - 1][m]).sum();
                let negative: f64 = ranges[j].clone().map(|m| model.coefficients[i][m]).sum();
                assert!((positive + negative).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_class_weights_must_be_positive() {
        let xs = vec![vec![0.0], vec![1.0]];
        let mut p = params(Kernel::Linear, 1.0);
        p.class_weights = vec![(0, 0.0)];
        let result = train(&xs, &[0, 1], &p);

        assert!(result.is_err());
        assert_eq!(
            "InvalidParameterError: class_weights: weight of class 0 must be positive",
            &result.err().unwrap().to_string()
        );
    }
}
