use crate::error::Result;
use crate::math::matrix::Matrix;

/// Plain SGD with L2 weight decay. Holds no state between steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub weight_decay: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, weight_decay: f64) -> Sgd {
        Sgd { learning_rate, weight_decay }
    }

    /// `param ← param - lr * (grad + weight_decay * param)`
    ///
    /// `grad` is already averaged over the batch.
    pub fn step(&self, param: &mut Matrix, grad: &Matrix) -> Result<()> {
        let decayed = grad.add(&param.multiply_by_scalar(self.weight_decay))?;
        *param = param.subtract(&decayed.multiply_by_scalar(self.learning_rate))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn step_without_decay_follows_gradient() {
        let mut w = Matrix::new(vec![vec![1.0, -1.0]]).unwrap();
        let g = Matrix::new(vec![vec![0.5, -0.5]]).unwrap();
        Sgd::new(0.1, 0.0).step(&mut w, &g).unwrap();
        assert_abs_diff_eq!(w[(0, 0)], 0.95, epsilon = 1e-12);
        assert_abs_diff_eq!(w[(0, 1)], -0.95, epsilon = 1e-12);
    }

    #[test]
    fn decay_shrinks_weights_with_zero_gradient() {
        let mut w = Matrix::new(vec![vec![2.0]]).unwrap();
        let g = Matrix::zeros(1, 1);
        Sgd::new(0.5, 0.1).step(&mut w, &g).unwrap();
        assert_abs_diff_eq!(w[(0, 0)], 2.0 - 0.5 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let mut w = Matrix::zeros(2, 2);
        assert!(Sgd::new(0.1, 0.0).step(&mut w, &Matrix::zeros(2, 1)).is_err());
    }
}
