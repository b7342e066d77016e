use crate::utils::VectorOperations;

/// A numerically stable softmax: the largest input is subtracted before exponentiating so that
/// nothing overflows, then everything is normalized by the sum.
///
/// An empty slice gives back an empty vector.
pub fn softmax(inputs: &[f64]) -> Vec<f64> {
    let max_input = match inputs.max_value() {
        Some(max_input) => max_input,
        None => return Vec::new(),
    };

    let exponentials = inputs.subtract_number(max_input).exp();
    let total = exponentials.iter().sum::<f64>();

    exponentials.iter().map(|x| x / total).collect()
}
