//! Sequential minimal optimization for the soft-margin binary sub-problems.

use crate::kernel::Kernel;

const TAU: f64 = 1e-12;

/// A binary sub-problem with class-weighted cost bounds.
///
/// `xs` holds the samples of the positive class followed by the samples of
/// the negative class; `ys` holds `+1.0`/`-1.0` in the same order.
pub(crate) struct BinaryProblem<'a> {
    pub(crate) xs: Vec<&'a [f64]>,
    pub(crate) ys: Vec<f64>,

    /// Cost bound for positive samples.
    pub(crate) cp: f64,

    /// Cost bound for negative samples.
    pub(crate) cn: f64,
}

pub(crate) struct BinarySolution {
    /// Unsigned multipliers in `[0, C_i]`, aligned with `BinaryProblem::xs`.
    pub(crate) alpha: Vec<f64>,
    pub(crate) rho: f64,
}

/// Solves the dual problem by repeatedly optimizing the maximal violating
/// pair, maintaining the gradient incrementally. Terminates when the
/// violation gap drops below `epsilon` or the iteration cap is hit.
pub(crate) fn solve(problem: &BinaryProblem, kernel: &Kernel, epsilon: f64) -> BinarySolution {
    let l = problem.xs.len();
    let cost = |t: usize| {
        if problem.ys[t] > 0.0 {
            problem.cp
        } else {
            problem.cn
        }
    };

    let mut alpha = vec![0.0; l];
    let mut grad = vec![-1.0; l];
    let diag: Vec<f64> = (0..l)
        .map(|t| kernel.compute(problem.xs[t], problem.xs[t]))
        .collect();

    let max_iter = (100 * l).max(10_000_000);
    let mut iter = 0;
    loop {
        // Maximal violating pair: i maximizes -y*G over samples that can
        // grow, j minimizes -y*G over samples that can shrink.
        let mut g_max = f64::NEG_INFINITY;
        let mut g_min = f64::INFINITY;
        let mut i_sel = None;
        let mut j_sel = None;
        for t in 0..l {
            let value = -problem.ys[t] * grad[t];
            let upward = if problem.ys[t] > 0.0 {
                alpha[t] < cost(t)
            } else {
                alpha[t] > 0.0
            };
            let downward = if problem.ys[t] > 0.0 {
                alpha[t] > 0.0
            } else {
                alpha[t] < cost(t)
            };
            if upward && value > g_max {
                g_max = value;
                i_sel = Some(t);
            }
            if downward && value < g_min {
                g_min = value;
                j_sel = Some(t);
            }
        }
        let (i, j) = match (i_sel, j_sel) {
            (Some(i), Some(j)) if g_max - g_min >= epsilon => (i, j),
            _ => break,
        };

        let row_i = q_row(problem, kernel, i);
        let row_j = q_row(problem, kernel, j);
        let (c_i, c_j) = (cost(i), cost(j));
        let (old_i, old_j) = (alpha[i], alpha[j]);

        if problem.ys[i] != problem.ys[j] {
            let mut quad = diag[i] + diag[j] + 2.0 * row_i[j];
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;
            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            if diff > c_i - c_j {
                if alpha[i] > c_i {
                    alpha[i] = c_i;
                    alpha[j] = c_i - diff;
                }
            } else if alpha[j] > c_j {
                alpha[j] = c_j;
                alpha[i] = c_j + diff;
            }
        } else {
            let mut quad = diag[i] + diag[j] - 2.0 * row_i[j];
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;
            if sum > c_i {
                if alpha[i] > c_i {
                    alpha[i] = c_i;
                    alpha[j] = sum - c_i;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }
            if sum > c_j {
                if alpha[j] > c_j {
                    alpha[j] = c_j;
                    alpha[i] = sum - c_j;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }

        let delta_i = alpha[i] - old_i;
        let delta_j = alpha[j] - old_j;
        for t in 0..l {
            grad[t] += row_i[t] * delta_i + row_j[t] * delta_j;
        }

        iter += 1;
        if iter >= max_iter {
            log::warn!("optimizer reached the iteration limit ({max_iter})");
            break;
        }
    }

    BinarySolution {
        rho: threshold(problem, &alpha, &grad, &cost),
        alpha,
    }
}

/// One row of `Q`, `Q[t][u] = y_t * y_u * K(x_t, x_u)`.
fn q_row(problem: &BinaryProblem, kernel: &Kernel, t: usize) -> Vec<f64> {
    (0..problem.xs.len())
        .map(|u| problem.ys[t] * problem.ys[u] * kernel.compute(problem.xs[t], problem.xs[u]))
        .collect()
}

/// The decision threshold: the mean of `y*G` over free support vectors, or
/// the midpoint of the feasible interval when every multiplier is at a bound.
fn threshold(
    problem: &BinaryProblem,
    alpha: &[f64],
    grad: &[f64],
    cost: &impl Fn(usize) -> f64,
) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut sum_free = 0.0;
    let mut n_free = 0;
    for t in 0..alpha.len() {
        let yg = problem.ys[t] * grad[t];
        if alpha[t] >= cost(t) {
            if problem.ys[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if problem.ys[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            sum_free += yg;
            n_free += 1;
        }
    }
    if n_free > 0 {
        sum_free / n_free as f64
    } else {
        (upper + lower) / 2.0
    }
}
