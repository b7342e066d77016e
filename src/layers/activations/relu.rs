/// Applies the Rectified Linear Unit, `max(0, x)`, to every value.
pub fn relu(inputs: &[f64]) -> Vec<f64> {
    inputs.iter().map(|input| input.max(0.0)).collect()
}

/// The derivative of the ReLU at some pre-activation.
///
/// It is 1.0 only where the pre-activation is strictly positive, and 0.0 everywhere else
/// including exactly at zero.
pub fn relu_differential(pre_activation: f64) -> f64 {
    if pre_activation > 0.0 {
        1.0
    } else {
        0.0
    }
}
