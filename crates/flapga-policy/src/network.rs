use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{CodecError, Dense, HIDDEN1_SIZE, HIDDEN2_SIZE, INPUT_SIZE, NetworkWeights, OUTPUT_SIZE};

/// Output of every layer for one forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Activations {
    pub input: [f64; INPUT_SIZE],
    pub hidden1: [f64; HIDDEN1_SIZE],
    pub hidden2: [f64; HIDDEN2_SIZE],
    /// Jump probability.
    pub output: f64,
}

/// The 5 → 6 → 3 → 1 policy.
///
/// Deterministic: identical parameters and input always produce the identical
/// output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyNetwork {
    pub(crate) fc1: Dense<INPUT_SIZE, HIDDEN1_SIZE>,
    pub(crate) fc2: Dense<HIDDEN1_SIZE, HIDDEN2_SIZE>,
    pub(crate) fc3: Dense<HIDDEN2_SIZE, OUTPUT_SIZE>,
}

impl PolicyNetwork {
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            fc1: Dense::random(rng),
            fc2: Dense::random(rng),
            fc3: Dense::random(rng),
        }
    }

    #[must_use]
    pub fn fc1(&self) -> &Dense<INPUT_SIZE, HIDDEN1_SIZE> {
        &self.fc1
    }

    #[must_use]
    pub fn fc2(&self) -> &Dense<HIDDEN1_SIZE, HIDDEN2_SIZE> {
        &self.fc2
    }

    #[must_use]
    pub fn fc3(&self) -> &Dense<HIDDEN2_SIZE, OUTPUT_SIZE> {
        &self.fc3
    }

    /// Runs a forward pass and keeps every intermediate value.
    #[must_use]
    pub fn forward(&self, input: &[f64; INPUT_SIZE]) -> Activations {
        let hidden1 = self.fc1.forward(input).map(relu);
        let hidden2 = self.fc2.forward(&hidden1).map(relu);
        let [logit] = self.fc3.forward(&hidden2);
        Activations {
            input: *input,
            hidden1,
            hidden2,
            output: sigmoid(logit),
        }
    }

    /// Returns the jump probability for an observation.
    #[must_use]
    pub fn decide(&self, input: &[f64; INPUT_SIZE]) -> f64 {
        self.forward(input).output
    }

    /// Parameter tensors in gene order: `w1, b1, w2, b2, w3, b3`.
    #[must_use]
    pub fn tensors(&self) -> [&[f64]; 6] {
        [
            self.fc1.weight(),
            self.fc1.bias(),
            self.fc2.weight(),
            self.fc2.bias(),
            self.fc3.weight(),
            self.fc3.bias(),
        ]
    }

    pub(crate) fn tensors_mut(&mut self) -> [&mut [f64]; 6] {
        let [w1, b1] = self.fc1.split_mut();
        let [w2, b2] = self.fc2.split_mut();
        let [w3, b3] = self.fc3.split_mut();
        [w1, b1, w2, b2, w3, b3]
    }

    /// Named tensors, in `output × input` layout.
    #[must_use]
    pub fn weights(&self) -> NetworkWeights {
        NetworkWeights {
            w1: self.fc1.weight_rows(),
            b1: self.fc1.bias().to_vec(),
            w2: self.fc2.weight_rows(),
            b2: self.fc2.bias().to_vec(),
            w3: self.fc3.weight_rows(),
            b3: self.fc3.bias().to_vec(),
        }
    }

    /// Rebuilds a network from named tensors.
    ///
    /// Fails with [`CodecError::ShapeMismatch`] naming the first tensor whose
    /// shape does not match the architecture.
    pub fn from_weights(weights: &NetworkWeights) -> Result<Self, CodecError> {
        Ok(Self {
            fc1: Dense::from_parts("w1", &weights.w1, "b1", &weights.b1)?,
            fc2: Dense::from_parts("w2", &weights.w2, "b2", &weights.b2)?,
            fc3: Dense::from_parts("w3", &weights.w3, "b3", &weights.b3)?,
        })
    }
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
