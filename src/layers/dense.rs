//! The module that defines the Dense layer, the only kind of layer a digitnet Network is made of.

use rand::Rng;
use savefile_derive::Savefile;

use super::activations::{relu_differential, softmax, Activation};
use super::initializers::Initializer;
use crate::types::NetworkError;
use crate::utils::{Matrix, VectorOperations};

#[derive(Debug, Clone, Default, PartialEq)]
/// Everything a Dense layer remembers from its most recent `forward` call.
///
/// A pass is opened by `forward` and stays valid until the next `forward` replaces it, the
/// backward steps and the update of the layer only ever read from the open pass.
pub struct ForwardPass {
    /// The input vector that was given to `forward`.
    pub last_input: Vec<f64>,
    /// `biases + input * weights`, before any activation.
    pub pre_activation: Vec<f64>,
    /// What the layer exposed as its output: the rectified pre-activations for a hidden layer,
    /// or the pre-activations themselves for the output layer until `apply_softmax` is called.
    pub output: Vec<f64>,
}

#[derive(Debug, Clone, Savefile)]
/// A fully connected layer: an affine transform from **inputs_amount** to **outputs_amount**
/// values followed by an activation.
///
/// The weights are a `inputs_amount x outputs_amount` matrix, so the weight at `(i, j)` connects
/// the input `i` to the output `j`.
pub struct Dense {
    inputs_amount: usize,
    outputs_amount: usize,

    weights: Matrix,
    biases: Vec<f64>,

    activation: Activation,

    #[savefile_ignore]
    #[savefile_introspect_ignore]
    pass: Option<ForwardPass>,
    #[savefile_ignore]
    #[savefile_introspect_ignore]
    delta: Option<Vec<f64>>,
}

impl Dense {
    /// Creates a new hidden (ReLU) Dense layer with He initialized weights and zeroed biases,
    /// drawing from the thread local generator.
    pub fn new(inputs_amount: usize, outputs_amount: usize) -> Dense {
        Self::new_with_rng(
            inputs_amount,
            outputs_amount,
            &Initializer::HeNormal,
            &Initializer::Constant(0.0),
            &mut rand::thread_rng(),
        )
    }

    /// Creates a new hidden (ReLU) Dense layer with parameters drawn by the given initializers
    /// from **rng**.
    pub fn new_with_rng<R: Rng + ?Sized>(
        inputs_amount: usize,
        outputs_amount: usize,
        weights_initializer: &Initializer,
        biases_initializer: &Initializer,
        rng: &mut R,
    ) -> Dense {
        let weights = weights_initializer.initialize_2d((inputs_amount, outputs_amount), rng);
        let biases = biases_initializer.initialize_1d(outputs_amount, inputs_amount, rng);

        Dense {
            inputs_amount,
            outputs_amount,
            weights,
            biases,
            activation: Activation::ReLU,
            pass: None,
            delta: None,
        }
    }

    /// Creates a Dense layer from already known parameters.
    ///
    /// Fails with a DimensionMismatch if there are not as many biases as the weights have
    /// columns.
    pub fn from_parameters(
        weights: Matrix,
        biases: Vec<f64>,
        activation: Activation,
    ) -> Result<Dense, NetworkError> {
        if biases.len() != weights.cols() {
            return Err(NetworkError::DimensionMismatch {
                expected: weights.cols(),
                actual: biases.len(),
            });
        }

        Ok(Dense {
            inputs_amount: weights.rows(),
            outputs_amount: weights.cols(),
            weights,
            biases,
            activation,
            pass: None,
            delta: None,
        })
    }

    /// Changes the activation of the layer, consuming it.
    pub fn with_activation(mut self, activation: Activation) -> Dense {
        self.activation = activation;
        self
    }

    pub(crate) fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Replaces the weights and biases without touching the shape of the layer.
    ///
    /// Callers must have checked the shapes beforehand.
    pub(crate) fn set_parameters(&mut self, weights: Matrix, biases: Vec<f64>) {
        debug_assert_eq!(weights.rows(), self.inputs_amount);
        debug_assert_eq!(weights.cols(), self.outputs_amount);
        debug_assert_eq!(biases.len(), self.outputs_amount);

        self.weights = weights;
        self.biases = biases;
    }

    /// The amount of inputs this layer expects.
    pub fn inputs_amount(&self) -> usize {
        self.inputs_amount
    }

    /// The amount of outputs this layer produces.
    pub fn outputs_amount(&self) -> usize {
        self.outputs_amount
    }

    /// The `inputs_amount x outputs_amount` weight matrix.
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// The biases, one per output.
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// The activation of the layer.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// The currently open forward pass, if `forward` was ever called.
    pub fn forward_pass(&self) -> Option<&ForwardPass> {
        self.pass.as_ref()
    }

    /// The output of the currently open forward pass.
    pub fn output(&self) -> Option<&[f64]> {
        self.pass.as_ref().map(|pass| pass.output.as_slice())
    }

    /// The delta computed by the latest backward step of the current pass, None once the layer
    /// was updated with it or a new pass was opened.
    pub fn delta(&self) -> Option<&[f64]> {
        self.delta.as_deref()
    }

    fn check_input(&self, input: &[f64]) -> Result<(), NetworkError> {
        if input.len() != self.inputs_amount {
            return Err(NetworkError::DimensionMismatch {
                expected: self.inputs_amount,
                actual: input.len(),
            });
        }

        Ok(())
    }

    fn pre_activation(&self, input: &[f64]) -> Vec<f64> {
        self.biases.add(&self.weights.vector_product(input))
    }

    /// Propagates **input** through the layer, opening a new forward pass that replaces the
    /// previous one and discards its delta.
    ///
    /// Hidden layers return the rectified pre-activations, the output layer returns the
    /// pre-activations unchanged so that `apply_softmax` can be called afterwards.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64], NetworkError> {
        self.check_input(input)?;

        let pre_activation = self.pre_activation(input);
        let output = self.activation.forward_output(&pre_activation);

        self.delta = None;
        let pass = self.pass.insert(ForwardPass {
            last_input: input.to_vec(),
            pre_activation,
            output,
        });

        Ok(&pass.output)
    }

    /// Computes the same output as `forward` without opening a pass, so any number of samples
    /// can go through a shared reference to the layer at the same time.
    pub fn infer(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.check_input(input)?;

        Ok(self.activation.forward_output(&self.pre_activation(input)))
    }

    /// Replaces the output of the open pass with the softmax of its pre-activations.
    pub fn apply_softmax(&mut self) -> Result<&[f64], NetworkError> {
        let pass = self.pass.as_mut().ok_or(NetworkError::NoForwardPass)?;
        pass.output = softmax(&pass.pre_activation);

        Ok(&pass.output)
    }

    /// Computes the delta of a softmax output layer trained with the categorical cross entropy,
    /// which simplifies to `output - target`.
    pub fn backward_output(&mut self, target: &[f64]) -> Result<&[f64], NetworkError> {
        if target.len() != self.outputs_amount {
            return Err(NetworkError::DimensionMismatch {
                expected: self.outputs_amount,
                actual: target.len(),
            });
        }

        let pass = self.pass.as_ref().ok_or(NetworkError::NoForwardPass)?;
        let delta = pass.output.subtract(target);

        Ok(self.delta.insert(delta))
    }

    /// Computes the delta of a hidden layer from the delta and the weights of the layer right
    /// after it:
    ///
    /// `delta[j] = (sum_k next_delta[k] * next_weights[j, k]) * relu'(pre_activation[j])`
    pub fn backward_hidden(
        &mut self,
        next_delta: &[f64],
        next_weights: &Matrix,
    ) -> Result<&[f64], NetworkError> {
        if next_weights.rows() != self.outputs_amount {
            return Err(NetworkError::DimensionMismatch {
                expected: self.outputs_amount,
                actual: next_weights.rows(),
            });
        }

        if next_delta.len() != next_weights.cols() {
            return Err(NetworkError::DimensionMismatch {
                expected: next_weights.cols(),
                actual: next_delta.len(),
            });
        }

        let pass = self.pass.as_ref().ok_or(NetworkError::NoForwardPass)?;
        let delta = next_weights
            .product_with(next_delta)
            .iter()
            .zip(&pass.pre_activation)
            .map(|(error, pre_activation)| error * relu_differential(*pre_activation))
            .collect();

        Ok(self.delta.insert(delta))
    }

    /// Applies one step of gradient descent with the delta of the current pass and consumes it,
    /// so a layer can only be updated once per pass.
    pub fn update(&mut self, learning_rate: f64) -> Result<(), NetworkError> {
        let pass = self.pass.as_ref().ok_or(NetworkError::NoForwardPass)?;
        let delta = self.delta.take().ok_or(NetworkError::NoDelta)?;

        for (i, input) in pass.last_input.iter().enumerate() {
            for (weight, error) in self.weights.row_mut(i).iter_mut().zip(&delta) {
                *weight -= learning_rate * error * input;
            }
        }

        for (bias, error) in self.biases.iter_mut().zip(&delta) {
            *bias -= learning_rate * error;
        }

        Ok(())
    }
}
