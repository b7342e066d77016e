//! The module that contains the loss function digitnet trains with, the Categorical Cross
//! Entropy.

pub mod categorical_cross_entropy;


pub use categorical_cross_entropy::{categorical_cross_entropy, EPSILON};
