//! The module that contains the activation functions used by the Dense layers of digitnet,
//! which are:
//!
//! - ReLU (Rectified Linear Unit), used by every hidden layer
//! - SoftMax, used by the output layer together with the Categorical Cross Entropy loss

pub mod relu;
pub mod softmax;

pub use relu::{relu, relu_differential};
pub use softmax::softmax;

use savefile_derive::Savefile;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Savefile)]
/// The activation a Dense layer applies on top of its affine transform.
pub enum Activation {
    /// `max(0, x)` applied elementwise, used by hidden layers.
    ReLU,
    /// Normalizes the pre-activations into a probability distribution. The output layer leaves
    /// its pre-activations untouched on `forward` and has this applied explicitly afterwards.
    SoftMax,
}

impl Activation {
    /// Computes what `forward` exposes as the output of a layer with this activation.
    ///
    /// For SoftMax this is the identity, since the network applies the softmax itself once the
    /// forward pass reaches the output layer.
    pub fn forward_output(&self, pre_activations: &[f64]) -> Vec<f64> {
        match self {
            Activation::ReLU => relu(pre_activations),
            Activation::SoftMax => pre_activations.to_vec(),
        }
    }
}
