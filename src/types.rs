//! A module containing the shared data types of digitnet: the error type, the training options
//! and the reports that training and evaluation give back.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use digitnet_macros::FromForAllUnnamedVariants;
use savefile::SavefileError;

#[derive(Debug, FromForAllUnnamedVariants)]
/// Every error that can happen while building, running, training or persisting a Network.
pub enum NetworkError {
    /// A vector did not have the length the layer or the network expected.
    DimensionMismatch {
        /// The length that was expected
        expected: usize,
        /// The length that was given
        actual: usize,
    },
    /// A layer was appended whose inputs do not match the outputs of the previous layer.
    InvalidTopology {
        /// The outputs amount of the current last layer
        expected_inputs: usize,
        /// The inputs amount of the layer that was being appended
        actual_inputs: usize,
    },
    /// A layer was asked for with zero inputs or zero outputs.
    EmptyLayer {
        /// The requested amount of inputs
        inputs_amount: usize,
        /// The requested amount of outputs
        outputs_amount: usize,
    },
    /// The network has no layers to run.
    EmptyNetwork,
    /// The images and labels given for training or evaluation are not of the same length.
    LengthMismatch {
        /// How many images there were
        images: usize,
        /// How many labels there were
        labels: usize,
    },
    /// A label is outside of `[0, classes)`.
    InvalidLabel {
        /// The label in question
        label: usize,
        /// The amount of classes the network outputs
        classes: usize,
    },
    /// A backward step was requested from a layer that was never propagated forward.
    NoForwardPass,
    /// A layer was asked to update its parameters before its delta was computed for the current
    /// forward pass.
    NoDelta,
    /// A layer was looked up by an index the network doesn't have.
    LayerIndexOutOfRange {
        /// The index that was asked for
        index: usize,
        /// How many layers the network has
        layers: usize,
    },
    /// The training options can't be used as they are.
    InvalidOptions {
        /// What is wrong with them
        reason: String,
    },
    /// The weights file does not exist.
    FileNotFound {
        /// The path that was looked up
        path: PathBuf,
    },
    /// The weights file or dataset file is malformed or doesn't fit the network.
    FormatError {
        /// What is wrong with it
        reason: String,
    },
    /// Some other I/O error.
    Io(std::io::Error),
    /// An error coming from saving or loading a binary snapshot.
    Snapshot(SavefileError),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected a vector of length {}, got {}",
                expected, actual
            ),
            NetworkError::InvalidTopology {
                expected_inputs,
                actual_inputs,
            } => write!(
                f,
                "invalid topology: the previous layer outputs {} values but the new layer takes {}",
                expected_inputs, actual_inputs
            ),
            NetworkError::EmptyLayer {
                inputs_amount,
                outputs_amount,
            } => write!(
                f,
                "a layer needs at least one input and one output, got {} inputs and {} outputs",
                inputs_amount, outputs_amount
            ),
            NetworkError::EmptyNetwork => write!(f, "the network has no layers"),
            NetworkError::LengthMismatch { images, labels } => write!(
                f,
                "length mismatch: {} images but {} labels",
                images, labels
            ),
            NetworkError::InvalidLabel { label, classes } => write!(
                f,
                "invalid label {}: expected a class in [0, {})",
                label, classes
            ),
            NetworkError::NoForwardPass => {
                write!(f, "the layer has not been propagated forward yet")
            }
            NetworkError::NoDelta => write!(
                f,
                "the layer has no delta for its current forward pass"
            ),
            NetworkError::LayerIndexOutOfRange { index, layers } => write!(
                f,
                "layer index {} is out of range for a network of {} layers",
                index, layers
            ),
            NetworkError::InvalidOptions { reason } => {
                write!(f, "invalid training options: {}", reason)
            }
            NetworkError::FileNotFound { path } => {
                write!(f, "could not find the file {}", path.display())
            }
            NetworkError::FormatError { reason } => write!(f, "format error: {}", reason),
            NetworkError::Io(err) => write!(f, "i/o error: {}", err),
            NetworkError::Snapshot(err) => write!(f, "snapshot error: {:?}", err),
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which parts of the training process should be printed to the console.
pub struct TrainingVerbosity {
    /// Print the current epoch when it starts.
    pub show_current_epoch: bool,
    /// Show a progress bar over the batches of the epoch.
    pub show_epoch_progress: bool,
    /// Print a line with the batch loss and accuracy every `log_frequency` batches.
    pub show_batch_progress: bool,
    /// Print how long the epoch took.
    pub show_epoch_elapsed: bool,
    /// Print the average loss of the epoch.
    pub print_loss: bool,
    /// Print the training accuracy of the epoch.
    pub print_accuracy: bool,
    /// Print a warning whenever a sample is skipped because of an invalid label.
    pub warn_invalid_labels: bool,
}

impl TrainingVerbosity {
    /// A verbosity that prints nothing at all.
    pub fn silent() -> Self {
        TrainingVerbosity {
            show_current_epoch: false,
            show_epoch_progress: false,
            show_batch_progress: false,
            show_epoch_elapsed: false,
            print_loss: false,
            print_accuracy: false,
            warn_invalid_labels: false,
        }
    }

    pub(crate) fn prints_summary(&self) -> bool {
        self.show_epoch_elapsed || self.print_loss || self.print_accuracy
    }
}

impl Default for TrainingVerbosity {
    fn default() -> Self {
        TrainingVerbosity {
            show_current_epoch: true,
            show_epoch_progress: true,
            show_batch_progress: true,
            show_epoch_elapsed: true,
            print_loss: true,
            print_accuracy: true,
            warn_invalid_labels: true,
        }
    }
}

#[derive(Debug, Clone)]
/// A struct that defines the options for training a Network.
pub struct TrainingOptions {
    /// The amount of full passes over the shuffled training set.
    pub epochs: usize,
    /// The amount at which the gradients are multiplied before being subtracted from the
    /// parameters.
    pub learning_rate: f64,
    /// How many samples go into each batch. Batches only group samples for shuffling and
    /// reporting, the parameters are still updated after every single sample.
    pub batch_size: usize,
    /// Every how many batches a progress line is printed. Zero disables the progress lines.
    pub log_frequency: usize,
    /// The learning rate of epoch `e` (starting at 1) is `learning_rate / (1 + decay * e)`.
    ///
    /// Zero keeps the learning rate constant.
    pub learning_rate_decay: f64,
    /// The seed used for shuffling, or None to seed from the operating system.
    pub seed: Option<u64>,
    /// What gets printed while training.
    pub verbosity: TrainingVerbosity,
}

impl TrainingOptions {
    /// The learning rate used throughout the **epoch**, counting epochs from 1.
    pub fn learning_rate_for_epoch(&self, epoch: usize) -> f64 {
        self.learning_rate / (1.0 + self.learning_rate_decay * epoch as f64)
    }

    pub(crate) fn validate(&self) -> Result<(), NetworkError> {
        if self.batch_size == 0 {
            return Err(NetworkError::InvalidOptions {
                reason: "the batch size must be at least 1".to_string(),
            });
        }

        if !self.learning_rate.is_finite() || !self.learning_rate_decay.is_finite() {
            return Err(NetworkError::InvalidOptions {
                reason: "the learning rate and its decay must be finite".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            epochs: 10,
            learning_rate: 0.01,
            batch_size: 32,
            log_frequency: 100,
            learning_rate_decay: 1e-4,
            seed: None,
            verbosity: TrainingVerbosity::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// What happened during one epoch of training.
pub struct EpochSummary {
    /// The epoch, counting from 1.
    pub epoch: usize,
    /// The learning rate used during the epoch.
    pub learning_rate: f64,
    /// The average cross-entropy loss of the trained samples.
    pub average_loss: f64,
    /// The percentage of trained samples that were predicted correctly before their update.
    pub accuracy: f64,
    /// How many samples were trained on.
    pub trained_samples: usize,
    /// How many samples were skipped because of invalid labels.
    pub skipped_samples: usize,
    /// How long the epoch took.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// The result of evaluating a Network over a labeled dataset.
pub struct Evaluation {
    /// The average cross-entropy loss over the evaluated samples.
    pub average_loss: f64,
    /// The percentage of evaluated samples whose argmax matched the label.
    pub accuracy: f64,
    /// How many samples were evaluated.
    pub evaluated_samples: usize,
    /// How many samples were skipped because of invalid labels.
    pub skipped_samples: usize,
}
