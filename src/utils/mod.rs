//! Just a module with a few utilities that make writing code easier through out digitnet

pub mod approx_eq;
pub mod matrix;
pub mod vector_operations;

pub use matrix::Matrix;
pub use vector_operations::VectorOperations;

/// Builds a one-hot vector of length **classes** with a 1.0 at **label**.
///
/// Returns None if the label is not inside of `[0, classes)`.
pub fn one_hot(label: usize, classes: usize) -> Option<Vec<f64>> {
    if label >= classes {
        return None;
    }

    let mut target = vec![0.0; classes];
    target[label] = 1.0;
    Some(target)
}
