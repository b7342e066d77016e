use rand::{rngs::StdRng, SeedableRng};

use crate::layers::{Activation, Dense, Initializer};
use crate::types::NetworkError;
use crate::utils::approx_eq::{assert_approx_equal_distance, assert_sums_to};
use crate::utils::Matrix;

fn known_hidden_layer() -> Dense {
    // 3 inputs -> 2 outputs
    let weights = Matrix::from_row_major(3, 2, vec![0.5, -1.0, 0.25, 2.0, -0.5, 1.0]).unwrap();
    Dense::from_parameters(weights, vec![0.1, -0.2], Activation::ReLU).unwrap()
}

#[test]
fn forward_should_compute_the_affine_transform_and_rectify_it() {
    let mut layer = known_hidden_layer();
    let input = [1.0, 2.0, 3.0];

    let output = layer.forward(&input).unwrap().to_vec();

    // 0.1 + 0.5 + 0.5 - 1.5 = -0.4 and -0.2 - 1.0 + 4.0 + 3.0 = 5.8
    let pass = layer.forward_pass().unwrap();
    assert_approx_equal_distance(&pass.pre_activation, &[-0.4, 5.8], 1e-12);
    assert_approx_equal_distance(&output, &[0.0, 5.8], 1e-12);
    assert_eq!(pass.last_input, input.to_vec());
}

#[test]
fn forward_should_fail_on_wrong_input_length() {
    let mut layer = known_hidden_layer();

    let result = layer.forward(&[1.0, 2.0]);

    assert!(matches!(
        result,
        Err(NetworkError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert!(layer.forward_pass().is_none());
}

#[test]
fn infer_should_match_forward_without_opening_a_pass() {
    let mut layer = known_hidden_layer();
    let input = [0.3, -0.7, 0.9];

    let inferred = layer.infer(&input).unwrap();
    assert!(layer.forward_pass().is_none());

    let forwarded = layer.forward(&input).unwrap().to_vec();
    assert_eq!(inferred, forwarded);
}

#[test]
fn output_layer_should_expose_pre_activations_until_softmax_is_applied() {
    let mut layer = known_hidden_layer().with_activation(Activation::SoftMax);

    let raw = layer.forward(&[1.0, 2.0, 3.0]).unwrap().to_vec();
    assert_approx_equal_distance(&raw, &[-0.4, 5.8], 1e-12);

    let probabilities = layer.apply_softmax().unwrap().to_vec();
    assert_sums_to(&probabilities, 1.0, 1e-12);
    assert!(probabilities[1] > probabilities[0]);
}

#[test]
fn backward_steps_should_require_an_open_pass() {
    let mut layer = known_hidden_layer();
    let next_weights = Matrix::zeros(2, 4);

    assert!(matches!(
        layer.backward_output(&[1.0, 0.0]),
        Err(NetworkError::NoForwardPass)
    ));
    assert!(matches!(
        layer.backward_hidden(&[0.0; 4], &next_weights),
        Err(NetworkError::NoForwardPass)
    ));
    assert!(matches!(layer.apply_softmax(), Err(NetworkError::NoForwardPass)));
    assert!(matches!(layer.update(0.1), Err(NetworkError::NoForwardPass)));
}

#[test]
fn backward_output_should_be_output_minus_target() {
    let mut layer = known_hidden_layer().with_activation(Activation::SoftMax);
    layer.forward(&[1.0, 2.0, 3.0]).unwrap();
    let output = layer.apply_softmax().unwrap().to_vec();

    let delta = layer.backward_output(&[1.0, 0.0]).unwrap().to_vec();

    assert_approx_equal_distance(&delta, &[output[0] - 1.0, output[1]], 1e-15);
}

#[test]
fn backward_hidden_should_mask_with_the_relu_derivative() {
    let mut layer = known_hidden_layer();
    layer.forward(&[1.0, 2.0, 3.0]).unwrap(); // pre-activations [-0.4, 5.8]

    let next_weights = Matrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, -1.0, 0.5, 2.0]).unwrap();
    let next_delta = [0.1, -0.2, 0.3];

    let delta = layer.backward_hidden(&next_delta, &next_weights).unwrap().to_vec();

    // the first unit is inactive, the second gets -0.1 - 0.1 + 0.6
    assert_approx_equal_distance(&delta, &[0.0, 0.4], 1e-12);
}

#[test]
fn backward_hidden_should_treat_a_zero_pre_activation_as_inactive() {
    let weights = Matrix::from_row_major(1, 1, vec![1.0]).unwrap();
    let mut layer = Dense::from_parameters(weights, vec![0.0], Activation::ReLU).unwrap();
    layer.forward(&[0.0]).unwrap();

    let next_weights = Matrix::from_row_major(1, 1, vec![5.0]).unwrap();
    let delta = layer.backward_hidden(&[1.0], &next_weights).unwrap().to_vec();

    assert_eq!(delta, vec![0.0]);
}

#[test]
fn backward_hidden_should_check_the_next_layer_shape() {
    let mut layer = known_hidden_layer();
    layer.forward(&[1.0, 2.0, 3.0]).unwrap();

    let wrong_rows = Matrix::zeros(3, 2);
    assert!(matches!(
        layer.backward_hidden(&[0.0, 0.0], &wrong_rows),
        Err(NetworkError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));

    let next_weights = Matrix::zeros(2, 2);
    assert!(matches!(
        layer.backward_hidden(&[0.0, 0.0, 0.0], &next_weights),
        Err(NetworkError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn update_should_apply_gradient_descent_once_per_pass() {
    let mut layer = known_hidden_layer().with_activation(Activation::SoftMax);
    let input = [1.0, 2.0, 3.0];
    layer.forward(&input).unwrap();
    layer.apply_softmax().unwrap();
    let delta = layer.backward_output(&[0.0, 1.0]).unwrap().to_vec();

    let weights_before = layer.weights().clone();
    let biases_before = layer.biases().to_vec();
    let learning_rate = 0.5;

    layer.update(learning_rate).unwrap();

    for i in 0..3 {
        for j in 0..2 {
            let expected = weights_before[(i, j)] - learning_rate * delta[j] * input[i];
            assert!((layer.weights()[(i, j)] - expected).abs() < 1e-12);
        }
    }
    for j in 0..2 {
        assert!((layer.biases()[j] - (biases_before[j] - learning_rate * delta[j])).abs() < 1e-12);
    }

    assert!(layer.delta().is_none());
    assert!(matches!(layer.update(learning_rate), Err(NetworkError::NoDelta)));
}

#[test]
fn forward_should_discard_the_previous_delta() {
    let mut layer = known_hidden_layer().with_activation(Activation::SoftMax);
    layer.forward(&[1.0, 2.0, 3.0]).unwrap();
    layer.backward_output(&[1.0, 0.0]).unwrap();
    assert!(layer.delta().is_some());

    layer.forward(&[0.0, 0.0, 0.0]).unwrap();

    assert!(layer.delta().is_none());
}

#[test]
fn seeded_layers_should_be_identical() {
    let a = Dense::new_with_rng(
        5,
        4,
        &Initializer::HeNormal,
        &Initializer::Constant(0.0),
        &mut StdRng::seed_from_u64(9),
    );
    let b = Dense::new_with_rng(
        5,
        4,
        &Initializer::HeNormal,
        &Initializer::Constant(0.0),
        &mut StdRng::seed_from_u64(9),
    );

    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.biases(), &[0.0; 4]);
    assert_eq!(a.activation(), Activation::ReLU);
}

#[test]
fn from_parameters_should_reject_mismatched_biases() {
    let result = Dense::from_parameters(Matrix::zeros(3, 2), vec![0.0; 3], Activation::ReLU);

    assert!(matches!(
        result,
        Err(NetworkError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
}
