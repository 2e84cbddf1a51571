//! Fixed-topology feed-forward policy and its chromosome encoding.
//!
//! The policy maps a 5-value observation to a jump probability through two ReLU
//! layers and a sigmoid output (5 → 6 → 3 → 1). Its 61 parameters are what the
//! genetic algorithm evolves.
//!
//! # Architecture
//!
//! ```text
//! Observation [bird_y, lower_x, lower_y, upper_x, upper_y]
//!     ↓ fc1: 5 → 6, ReLU
//!     ↓ fc2: 6 → 3, ReLU
//!     ↓ fc3: 3 → 1, sigmoid
//! Jump probability ∈ [0, 1]
//! ```
//!
//! # Gene Order
//!
//! A [`Chromosome`] lists every parameter in a fixed traversal:
//!
//! | Genes | Tensor | Shape |
//! |---|---|---|
//! | 0..30 | `w1` | 6 × 5 |
//! | 30..36 | `b1` | 6 |
//! | 36..54 | `w2` | 3 × 6 |
//! | 54..57 | `b2` | 3 |
//! | 57..60 | `w3` | 1 × 3 |
//! | 60..61 | `b3` | 1 |
//!
//! Weight matrices are stored `output × input` and flattened row-major.
//!
//! - [`PolicyNetwork`] - The network itself; stateless besides its parameters
//! - [`Chromosome`], [`encode`], [`decode`] - Flat gene representation
//! - [`NetworkWeights`] - Named tensors, used for persistence and visualization
//! - [`Activations`] - Every neuron's output from the latest forward pass

pub use self::{chromosome::*, dense::*, network::*, weights::*};

mod chromosome;
mod dense;
mod network;
mod weights;

/// Number of observation values fed to the network.
pub const INPUT_SIZE: usize = 5;
/// Width of the first hidden layer.
pub const HIDDEN1_SIZE: usize = 6;
/// Width of the second hidden layer.
pub const HIDDEN2_SIZE: usize = 3;
/// Number of outputs (the jump probability).
pub const OUTPUT_SIZE: usize = 1;

/// Errors raised when genes or named tensors do not fit the fixed architecture.
///
/// These indicate a programming or data error; nothing is ever truncated or padded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CodecError {
    #[display("chromosome has {actual} genes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("tensor {tensor} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        tensor: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}
