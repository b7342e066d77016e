//! The layers a digitnet Network is built from.
//!
//! A Network is a chain of Dense layers. Every layer but the last one is a hidden layer with a
//! ReLU activation, the last one is the output layer whose pre-activations are turned into
//! probabilities with a softmax.
//!
//! A layer is stateful in between calls: `forward` opens a pass that caches the input and the
//! pre-activations, `backward_output` or `backward_hidden` computes the delta for that pass, and
//! `update` consumes the delta to apply gradient descent. Calling these out of order yields
//! `NetworkError::NoForwardPass` or `NetworkError::NoDelta` instead of using stale caches.

pub mod activations;
pub mod dense;
pub mod initializers;

#[cfg(test)]
mod dense_test;

pub use activations::Activation;
pub use dense::{Dense, ForwardPass};
pub use initializers::Initializer;
