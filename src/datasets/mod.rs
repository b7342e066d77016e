//! The module for the datasets digitnet trains on.
//!
//! - `image` holds the grayscale Image type and the normalization every image goes through
//!   before it reaches the first layer of a Network
//! - `mnist` reads the MNIST dataset from its IDX files (behind the `mnist` feature)

pub mod image;

/// The module containing the MNIST dataset
#[cfg(feature = "mnist")]
pub mod mnist;

pub use image::Image;
