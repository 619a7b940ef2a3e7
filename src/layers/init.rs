use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

use crate::math::matrix::Matrix;

/// How a freshly built dense layer fills its weight matrix.
///
/// `fan_in` is the layer's input size, `fan_out` its output size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInitialization {
    /// Uniform on `[min, max)`.
    Uniform { min: f64, max: f64 },
    /// N(0, sqrt(2 / (fan_in + fan_out))). Suits tanh-like activations.
    XavierNormal,
    /// U(-l, l) with l = sqrt(6 / (fan_in + fan_out)). Suits sigmoid.
    XavierUniform,
    /// N(0, sqrt(2 / fan_in)). Suits ReLU, which zeroes half its inputs.
    He,
}

impl Default for WeightInitialization {
    fn default() -> Self {
        WeightInitialization::Uniform { min: -0.5, max: 0.5 }
    }
}

impl WeightInitialization {
    /// Weight matrix of shape `(fan_out, fan_in)`.
    pub fn weights<R: Rng + ?Sized>(&self, fan_in: usize, fan_out: usize, rng: &mut R) -> Matrix {
        let fan_sum = (fan_in + fan_out).max(1) as f64;
        match *self {
            WeightInitialization::Uniform { min, max } => {
                if max > min {
                    sample(fan_out, fan_in, Uniform::new(min, max), rng)
                } else {
                    Matrix::filled(fan_out, fan_in, min)
                }
            }
            WeightInitialization::XavierNormal => normal(fan_out, fan_in, (2.0 / fan_sum).sqrt(), rng),
            WeightInitialization::XavierUniform => {
                let limit = (6.0 / fan_sum).sqrt();
                sample(fan_out, fan_in, Uniform::new_inclusive(-limit, limit), rng)
            }
            WeightInitialization::He => normal(fan_out, fan_in, (2.0 / fan_in.max(1) as f64).sqrt(), rng),
        }
    }
}

fn sample<D, R>(rows: usize, cols: usize, dist: D, rng: &mut R) -> Matrix
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    Matrix::from_fn(rows, cols, |_, _| dist.sample(&mut *rng))
}

fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
    match Normal::new(0.0, std_dev) {
        Ok(dist) => sample(rows, cols, dist, rng),
        Err(_) => Matrix::zeros(rows, cols),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shape_is_output_by_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for init in [
            WeightInitialization::default(),
            WeightInitialization::XavierNormal,
            WeightInitialization::XavierUniform,
            WeightInitialization::He,
        ] {
            assert_eq!(init.weights(4, 3, &mut rng).size(), (3, 4));
        }
    }

    #[test]
    fn uniform_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = WeightInitialization::Uniform { min: -0.5, max: 0.5 }.weights(20, 20, &mut rng);
        assert!(w.data().iter().flatten().all(|v| (-0.5..0.5).contains(v)));
    }

    #[test]
    fn xavier_uniform_respects_limit() {
        let mut rng = StdRng::seed_from_u64(2);
        let limit = (6.0f64 / 30.0).sqrt();
        let w = WeightInitialization::XavierUniform.weights(10, 20, &mut rng);
        assert!(w.data().iter().flatten().all(|v| v.abs() <= limit));
    }

    #[test]
    fn he_spread_tracks_fan_in() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WeightInitialization::He.weights(200, 50, &mut rng);
        let n = (w.row_count() * w.column_count()) as f64;
        let variance = w.data().iter().flatten().map(|v| v * v).sum::<f64>() / n;
        assert!((variance - 0.01).abs() < 0.002, "variance = {variance}");
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = WeightInitialization::He.weights(3, 2, &mut StdRng::seed_from_u64(11));
        let b = WeightInitialization::He.weights(3, 2, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
