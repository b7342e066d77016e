use rand::{rngs::StdRng, Rng, SeedableRng};

use super::seeded_network;
use crate::layers::{Activation, Dense};
use crate::types::NetworkError;
use crate::utils::approx_eq::{assert_approx_equal_distance, assert_sums_to};
use crate::utils::Matrix;
use crate::{Image, Network};

#[test]
fn should_reject_layers_that_do_not_chain() {
    let mut network = Network::new();
    network.add_layer(4, 3).unwrap();

    let result = network.add_layer(5, 2);

    assert!(matches!(
        result,
        Err(NetworkError::InvalidTopology {
            expected_inputs: 3,
            actual_inputs: 5
        })
    ));
    assert_eq!(network.layers().len(), 1);
}

#[test]
fn should_reject_zero_sized_layers() {
    let mut network = Network::new();

    assert!(matches!(
        network.add_layer(0, 3),
        Err(NetworkError::EmptyLayer { .. })
    ));
    assert!(network.layers().is_empty());
}

#[test]
fn should_only_keep_the_last_layer_as_the_softmax_output() {
    let network = seeded_network(&[6, 5, 4, 3], 1);

    let activations: Vec<Activation> = network
        .layers()
        .iter()
        .map(|layer| layer.activation())
        .collect();

    assert_eq!(
        activations,
        vec![Activation::ReLU, Activation::ReLU, Activation::SoftMax]
    );
    assert_eq!(network.input_size(), Some(6));
    assert_eq!(network.output_size(), Some(3));
}

#[test]
fn predict_should_give_a_probability_distribution() {
    let mut network = seeded_network(&[16, 8, 10], 2);
    let mut rng = StdRng::seed_from_u64(20);

    for _ in 0..10 {
        let input: Vec<f64> = (0..16).map(|_| rng.gen_range(0.0..1.0)).collect();

        let probabilities = network.predict(&input).unwrap();

        assert_eq!(probabilities.len(), 10);
        assert_sums_to(&probabilities, 1.0, 1e-9);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn predict_should_not_change_the_parameters() {
    let mut network = seeded_network(&[4, 3, 2], 3);
    let before = network.clone();

    network.predict(&[0.1, 0.2, 0.3, 0.4]).unwrap();

    for (a, b) in network.layers().iter().zip(before.layers()) {
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
    }
}

#[test]
fn infer_should_match_predict() {
    let mut network = seeded_network(&[4, 3, 2], 4);
    let input = [0.9, 0.1, 0.5, 0.3];

    let inferred = network.infer(&input).unwrap();
    let predicted = network.predict(&input).unwrap();

    assert_approx_equal_distance(&inferred, &predicted, 1e-15);
}

#[test]
fn predict_should_fail_on_wrong_input_length() {
    let mut network = seeded_network(&[4, 3, 2], 5);

    assert!(matches!(
        network.predict(&[1.0, 2.0, 3.0]),
        Err(NetworkError::DimensionMismatch {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn an_empty_network_should_not_run() {
    let mut network = Network::new();
    let image = Image::new(2, 2, vec![0; 4]).unwrap();

    assert!(matches!(
        network.predict(&[1.0]),
        Err(NetworkError::EmptyNetwork)
    ));
    assert!(matches!(
        network.evaluate(&[image], &[0]),
        Err(NetworkError::EmptyNetwork)
    ));
}

#[test]
fn the_output_delta_should_be_the_output_minus_the_target() {
    let mut network = seeded_network(&[4, 3, 2], 6);

    let output = network.predict(&[1.0, 0.0, 0.0, 0.0]).unwrap();
    assert_sums_to(&output, 1.0, 1e-12);

    network.back_propagate(&[1.0, 0.0]).unwrap();

    let delta = network.layers()[1].delta().unwrap();
    assert_approx_equal_distance(delta, &[output[0] - 1.0, output[1]], 1e-15);
    assert_eq!(network.layers()[0].delta().map(|delta| delta.len()), Some(3));
}

#[test]
fn apply_gradients_should_require_a_backward_pass() {
    let mut network = seeded_network(&[4, 3, 2], 7);
    network.predict(&[1.0, 0.0, 0.0, 0.0]).unwrap();

    assert!(matches!(
        network.apply_gradients(0.1),
        Err(NetworkError::NoDelta)
    ));
}

#[test]
fn loss_should_be_the_negative_log_of_the_true_class() {
    let loss = Network::loss(&[0.25, 0.75], 1).unwrap();

    assert!((loss - -(0.75_f64 + 1e-10).ln()).abs() < 1e-15);
    assert!(matches!(
        Network::loss(&[0.25, 0.75], 2),
        Err(NetworkError::InvalidLabel {
            label: 2,
            classes: 2
        })
    ));
}

#[test]
fn layer_weights_should_be_bounds_checked() {
    let network = seeded_network(&[4, 3, 2], 8);

    assert_eq!(network.layer_weights(1).unwrap().rows(), 3);
    assert!(matches!(
        network.layer_weights(2),
        Err(NetworkError::LayerIndexOutOfRange {
            index: 2,
            layers: 2
        })
    ));
}

fn bright_corner_network() -> Network {
    // the top left pixel votes for class 0 and the bottom right one for class 1
    let weights = Matrix::from_row_major(
        4,
        2,
        vec![1.0, -1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 1.0],
    )
    .unwrap();

    let mut network = Network::new();
    network
        .push_layer(Dense::from_parameters(weights, vec![0.0, 0.0], Activation::ReLU).unwrap())
        .unwrap();
    network
}

#[test]
fn evaluate_should_count_the_correct_argmaxes() {
    let network = bright_corner_network();
    let images = vec![
        Image::new(2, 2, vec![255, 0, 0, 0]).unwrap(),
        Image::new(2, 2, vec![0, 0, 0, 255]).unwrap(),
    ];

    assert_eq!(network.evaluate(&images, &[0, 1]).unwrap(), 100.0);
    assert_eq!(network.evaluate(&images, &[1, 0]).unwrap(), 0.0);
    assert_eq!(network.evaluate(&images, &[0, 0]).unwrap(), 50.0);
}

#[test]
fn evaluate_should_resolve_ties_to_the_lowest_class() {
    let network = bright_corner_network();
    let blank = vec![Image::new(2, 2, vec![0; 4]).unwrap()];

    assert_eq!(network.evaluate(&blank, &[0]).unwrap(), 100.0);
}

#[test]
fn evaluate_should_skip_invalid_labels() {
    let network = bright_corner_network();
    let images = vec![
        Image::new(2, 2, vec![255, 0, 0, 0]).unwrap(),
        Image::new(2, 2, vec![0, 0, 0, 255]).unwrap(),
    ];

    let evaluation = network.evaluate_with_loss(&images, &[0, 9]).unwrap();

    assert_eq!(evaluation.accuracy, 100.0);
    assert!(evaluation.average_loss > 0.0);
    assert_eq!(evaluation.evaluated_samples, 1);
    assert_eq!(evaluation.skipped_samples, 1);
}

#[test]
fn evaluate_should_reject_mismatched_lengths() {
    let network = bright_corner_network();
    let images = vec![Image::new(2, 2, vec![0; 4]).unwrap()];

    assert!(matches!(
        network.evaluate(&images, &[0, 1]),
        Err(NetworkError::LengthMismatch {
            images: 1,
            labels: 2
        })
    ));
}

#[test]
fn evaluating_nothing_should_give_zero() {
    let network = bright_corner_network();

    assert_eq!(network.evaluate(&[], &[]).unwrap(), 0.0);
}
