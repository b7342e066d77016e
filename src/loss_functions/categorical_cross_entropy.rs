//! The module that implements the Categorical Cross Entropy loss function.

use crate::types::NetworkError;

/// Added to the predicted probability before taking its logarithm so that a probability of
/// exactly zero yields a large but finite loss.
pub const EPSILON: f64 = 1e-10;

/// Computes `-ln(predicted[label] + EPSILON)`, the Categorical Cross Entropy of a probability
/// distribution against a one-hot target at **label**.
///
/// The epsilon pushes a certain prediction a hair below zero, so the loss is clamped at zero.
///
/// Fails with an InvalidLabel if the label is not an index of **predicted**.
pub fn categorical_cross_entropy(predicted: &[f64], label: usize) -> Result<f64, NetworkError> {
    let probability = predicted
        .get(label)
        .copied()
        .ok_or(NetworkError::InvalidLabel {
            label,
            classes: predicted.len(),
        })?;

    Ok((-(probability + EPSILON).ln()).max(0.0))
}
