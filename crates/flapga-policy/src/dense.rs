use rand::Rng;

use crate::CodecError;

/// Fully connected layer with `IN` inputs and `OUT` outputs.
///
/// `weight[o][i]` connects input `i` to output `o`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<const IN: usize, const OUT: usize> {
    weight: [[f64; IN]; OUT],
    bias: [f64; OUT],
}

impl<const IN: usize, const OUT: usize> Default for Dense<IN, OUT> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const IN: usize, const OUT: usize> Dense<IN, OUT> {
    /// Number of weights in the layer.
    pub const WEIGHT_COUNT: usize = IN * OUT;
    /// Number of weights and biases in the layer.
    pub const PARAM_COUNT: usize = IN * OUT + OUT;

    #[must_use]
    pub const fn zeros() -> Self {
        Self {
            weight: [[0.0; IN]; OUT],
            bias: [0.0; OUT],
        }
    }

    /// Samples every parameter from `U(-1/√IN, 1/√IN)`.
    ///
    /// This is the usual default initializer of linear layers.
    #[expect(clippy::cast_precision_loss)]
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let bound = 1.0 / (IN as f64).sqrt();
        let mut layer = Self::zeros();
        for w in layer.weight.as_flattened_mut() {
            *w = rng.random_range(-bound..bound);
        }
        for b in &mut layer.bias {
            *b = rng.random_range(-bound..bound);
        }
        layer
    }

    /// Computes `weight · input + bias`.
    #[must_use]
    pub fn forward(&self, input: &[f64; IN]) -> [f64; OUT] {
        let mut output = self.bias;
        for (out, row) in output.iter_mut().zip(&self.weight) {
            *out += row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
        }
        output
    }

    /// Weights flattened row-major.
    #[must_use]
    pub fn weight(&self) -> &[f64] {
        self.weight.as_flattened()
    }

    #[must_use]
    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    /// Borrows the flattened weights and the bias mutably at once.
    pub(crate) fn split_mut(&mut self) -> [&mut [f64]; 2] {
        [self.weight.as_flattened_mut(), &mut self.bias]
    }

    /// Returns the weight matrix as `OUT` rows of `IN` values.
    #[must_use]
    pub fn weight_rows(&self) -> Vec<Vec<f64>> {
        self.weight.iter().map(|row| row.to_vec()).collect()
    }

    /// Builds a layer from a row-major weight matrix and a bias vector.
    ///
    /// `weight_name` and `bias_name` identify the tensors in errors.
    pub fn from_parts(
        weight_name: &'static str,
        weight: &[Vec<f64>],
        bias_name: &'static str,
        bias: &[f64],
    ) -> Result<Self, CodecError> {
        // report the first ragged row, or the first row if all agree
        let columns = weight
            .iter()
            .map(Vec::len)
            .find(|len| *len != IN)
            .or_else(|| weight.first().map(Vec::len))
            .unwrap_or(0);
        if weight.len() != OUT || columns != IN {
            return Err(CodecError::ShapeMismatch {
                tensor: weight_name,
                expected: (OUT, IN),
                actual: (weight.len(), columns),
            });
        }
        if bias.len() != OUT {
            return Err(CodecError::ShapeMismatch {
                tensor: bias_name,
                expected: (OUT, 1),
                actual: (bias.len(), 1),
            });
        }

        let mut layer = Self::zeros();
        for (dst, src) in layer.weight.iter_mut().zip(weight) {
            dst.copy_from_slice(src);
        }
        layer.bias.copy_from_slice(bias);
        Ok(layer)
    }
}
