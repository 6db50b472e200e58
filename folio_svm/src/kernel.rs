use bincode::{Decode, Encode};

/// Kernel function used by the optimizer and the trained model.
///
/// The hyperparameters are stored inside the variant so that a persisted
/// model always carries the exact function it was trained with.
#[derive(Clone, Copy, Debug, PartialEq, Decode, Encode)]
pub enum Kernel {
    /// `a . b`
    Linear,

    /// `(gamma * a . b + coef0) ^ degree`
    Polynomial { degree: u32, gamma: f64, coef0: f64 },

    /// `exp(-gamma * |a - b|^2)`
    Rbf { gamma: f64 },

    /// `tanh(gamma * a . b + coef0)`
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    /// Evaluates the kernel function for a pair of vectors.
    ///
    /// Both vectors must have the same length; trailing dimensions of the
    /// longer vector are ignored otherwise.
    pub fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            Self::Linear => dot(a, b),
            Self::Polynomial {
                degree,
                gamma,
                coef0,
            } => (gamma * dot(a, b) + coef0).powi(degree as i32),
            Self::Rbf { gamma } => {
                let mut squared = 0.0;
                for (x, y) in a.iter().zip(b) {
                    let diff = x - y;
                    squared += diff * diff;
                }
                (-gamma * squared).exp()
            }
            Self::Sigmoid { gamma, coef0 } => (gamma * dot(a, b) + coef0).tanh(),
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let kernel = Kernel::Linear;

        assert_eq!(11.0, kernel.compute(&[1.0, 2.0], &[3.0, 4.0]));
    }

    #[test]
    fn test_polynomial() {
        let kernel = Kernel::Polynomial {
            degree: 2,
            gamma: 0.5,
            coef0: 1.0,
        };

        // (0.5 * 11 + 1)^2
        assert_eq!(42.25, kernel.compute(&[1.0, 2.0], &[3.0, 4.0]));
    }

    #[test]
    fn test_rbf() {
        let kernel = Kernel::Rbf { gamma: 0.1 };

        let value = kernel.compute(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((value - (-2.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_rbf_identical_vectors() {
        let kernel = Kernel::Rbf { gamma: 2.0 };

        assert_eq!(1.0, kernel.compute(&[0.5, -1.5], &[0.5, -1.5]));
    }

    #[test]
    fn test_sigmoid() {
        let kernel = Kernel::Sigmoid {
            gamma: 0.5,
            coef0: 1.0,
        };

        let value = kernel.compute(&[1.0, 2.0], &[3.0, 4.0]);
        assert!((value - 6.5f64.tanh()).abs() < 1e-12);
    }
}
