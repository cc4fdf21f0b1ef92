use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::ModelConfig;
use crate::errors::SimulationError;

/// A single trainable linear transform `y = x · W` with L2-regularised gradient descent.
///
/// Weights have shape `(input_size, output_size)` and are owned by the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearLayer {
    pub name: String,
    pub input_size: usize,
    pub output_size: usize,
    pub learning_rate: f64,
    pub regularization_rate: f64,
    pub weights: Array2<f64>,
}

impl LinearLayer {
    /// Create a layer with weights drawn from `N(0, 1) / sqrt(input_size)`, filled row by row
    pub fn new<R: Rng + ?Sized>(name: &str, input_size: usize, output_size: usize, config: &ModelConfig, rng: &mut R) -> Self {
        let scale = (input_size as f64).sqrt();
        let weights = Array2::from_shape_fn((input_size, output_size), |_| {
            let sample: f64 = rng.sample(StandardNormal);
            sample / scale
        });
        Self::with_weights(name, weights, config)
    }

    /// Create a layer from explicit weights
    pub fn with_weights(name: &str, weights: Array2<f64>, config: &ModelConfig) -> Self {
        let (input_size, output_size) = weights.dim();
        Self {
            name: name.to_string(),
            input_size,
            output_size,
            learning_rate: config.learning_rate,
            regularization_rate: config.regularization_rate,
            weights,
        }
    }

    /// View a flat buffer as rows of `width` values
    fn as_rows<'a>(&self, values: &'a [f64], width: usize) -> Result<ArrayView2<'a, f64>, SimulationError> {
        let mismatch = || SimulationError::ShapeMismatch {
            layer: self.name.clone(),
            expected: width,
            actual: values.len(),
        };
        if values.is_empty() || width == 0 || values.len() % width != 0 {
            return Err(mismatch());
        }
        ArrayView2::from_shape((values.len() / width, width), values).map_err(|_| mismatch())
    }

    /// Forward pass for one example, does not touch the weights
    pub fn forward(&self, x: &[f64]) -> Result<Array1<f64>, SimulationError> {
        if x.len() != self.input_size {
            return Err(SimulationError::ShapeMismatch {
                layer: self.name.clone(),
                expected: self.input_size,
                actual: x.len(),
            });
        }
        Ok(ArrayView1::from(x).dot(&self.weights))
    }

    /// Backward pass and in-place update.
    ///
    /// `x` and `grad_output` are reshaped to `(-1, input_size)` and `(-1, output_size)`, then
    /// `grad_input = grad_output · Wᵗ` is computed with the current weights and
    /// `W ← W - lr * (xᵗ · grad_output + reg * W)` is applied. Returns `grad_input`.
    pub fn backward(&mut self, x: &[f64], grad_output: &[f64]) -> Result<Array2<f64>, SimulationError> {
        let x = self.as_rows(x, self.input_size)?;
        let grad_output = self.as_rows(grad_output, self.output_size)?;
        if x.nrows() != grad_output.nrows() {
            return Err(SimulationError::ShapeMismatch {
                layer: self.name.clone(),
                expected: x.nrows() * self.output_size,
                actual: grad_output.len(),
            });
        }

        let grad_input = grad_output.dot(&self.weights.t());
        let grad_weights = x.t().dot(&grad_output) + &self.weights * self.regularization_rate;
        self.weights = &self.weights - &(grad_weights * self.learning_rate);

        Ok(grad_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    fn layer_2x2() -> LinearLayer {
        LinearLayer::with_weights("test", array![[1.0, 2.0], [3.0, 4.0]], &ModelConfig::default())
    }

    #[test]
    fn test_forward() {
        let layer = layer_2x2();
        let y = layer.forward(&[1.0, 2.0]).unwrap();
        assert_eq!(y, array![7.0, 10.0]);
        // forward leaves weights untouched
        assert_eq!(layer.weights, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_backward_update_matches_formula() {
        let mut layer = layer_2x2();
        let grad_input = layer.backward(&[1.0, 2.0], &[0.5, -1.0]).unwrap();

        // xᵗ·g = [[0.5, -1], [1, -2]], reg*W = [[0.1, 0.2], [0.3, 0.4]]
        let expected = array![[1.0 - 0.01 * 0.6, 2.0 + 0.01 * 0.8], [3.0 - 0.01 * 1.3, 4.0 + 0.01 * 1.6]];
        let rounded = array![[0.994, 2.008], [2.987, 4.016]];
        for ((&w, &e), &r) in layer.weights.iter().zip(expected.iter()).zip(rounded.iter()) {
            assert_abs_diff_eq!(w, e, epsilon = 1e-12);
            assert_abs_diff_eq!(w, r, epsilon = 1e-12);
        }

        // computed with the weights before the update
        assert_eq!(grad_input, array![[-1.5, -2.5]]);
    }

    #[test]
    fn test_backward_exact_numeric_identity() {
        let w = array![[0.3, -0.7], [1.1, 0.05]];
        let x = array![[0.2, 0.9]];
        let g = array![[-0.4, 0.25]];
        let config = ModelConfig::default();

        let mut layer = LinearLayer::with_weights("exact", w.clone(), &config);
        layer.backward(x.as_slice().unwrap(), g.as_slice().unwrap()).unwrap();

        let expected = &w - &((x.t().dot(&g) + &w * config.regularization_rate) * config.learning_rate);
        assert_eq!(layer.weights, expected);
    }

    #[test]
    fn test_backward_accepts_batches() {
        let mut layer = layer_2x2();
        let grad_input = layer.backward(&[1.0, 0.0, 0.0, 1.0], &[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(grad_input.dim(), (2, 2));
        assert_eq!(grad_input, array![[3.0, 7.0], [3.0, 7.0]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut layer = layer_2x2();
        assert!(matches!(layer.forward(&[1.0, 2.0, 3.0]), Err(SimulationError::ShapeMismatch { .. })));
        assert!(matches!(layer.backward(&[1.0, 2.0, 3.0], &[1.0, 1.0]), Err(SimulationError::ShapeMismatch { .. })));
        assert!(matches!(layer.backward(&[1.0, 2.0], &[1.0, 1.0, 1.0, 1.0]), Err(SimulationError::ShapeMismatch { .. })));
        assert!(matches!(layer.backward(&[], &[]), Err(SimulationError::ShapeMismatch { .. })));
        // failed calls leave the weights alone
        assert_eq!(layer.weights, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_init_is_seeded_and_scaled() {
        let config = ModelConfig::default();
        let a = LinearLayer::new("a", 4, 3, &config, &mut StdRng::seed_from_u64(17));
        let b = LinearLayer::new("b", 4, 3, &config, &mut StdRng::seed_from_u64(17));
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.weights.dim(), (4, 3));

        // variance of N(0,1)/sqrt(n) is 1/n
        let big = LinearLayer::new("big", 100, 100, &config, &mut StdRng::seed_from_u64(5));
        let n = big.weights.len() as f64;
        let variance = big.weights.iter().map(|w| w * w).sum::<f64>() / n;
        assert!((variance - 0.01).abs() < 0.002, "variance {}", variance);
    }
}
