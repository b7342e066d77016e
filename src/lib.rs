//! A small feed-forward neural network library for classifying handwritten digits, written from
//! scratch on top of plain vectors.
//!
//! A Network is a chain of Dense layers with ReLU hidden layers and a softmax output, trained
//! with the categorical cross entropy loss and plain per-sample gradient descent. Its weights can
//! be saved to and loaded from a plain text file, or the whole Network can be saved as a binary
//! snapshot.
//!
//! ```no_run
//! use digitnet::{datasets::mnist, Network, TrainingOptions};
//!
//! let training = mnist::load("data/mnist", mnist::Split::Training).unwrap();
//!
//! let mut network = Network::new();
//! network.add_layer(196, 128).unwrap();
//! network.add_layer(128, 10).unwrap();
//!
//! network
//!     .train(&training.images, &training.labels, &TrainingOptions::default())
//!     .unwrap();
//! network.save("weights.txt").unwrap();
//! ```

pub mod datasets;
pub mod layers;
pub mod loss_functions;
pub mod network;
pub mod types;
pub mod utils;

pub use datasets::Image;
pub use layers::Dense;
pub use network::Network;
pub use types::{EpochSummary, Evaluation, NetworkError, TrainingOptions, TrainingVerbosity};

#[cfg(test)]
mod tests;
