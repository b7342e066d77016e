use crate::layers::activations::{relu, relu_differential, Activation};

#[test]
fn should_be_0_when_x_is_negative() {
    let x = [-30.0, -40.0, -1.0, -0.3, -0.99];

    assert_eq!(relu(&x), vec![0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn should_be_x_when_x_is_positive() {
    let x = [-30.0, 40.0, 21.0, -0.3, -0.99];

    assert_eq!(relu(&x), vec![0.0, 40.0, 21.0, 0.0, 0.0]);
}

#[test]
fn differential_should_return_correct_value() {
    let x = [-30.0, 40.0, 21.0, -0.3, 0.0];
    let expected_derivatives = [0.0, 1.0, 1.0, 0.0, 0.0];

    for (value, expected) in x.iter().zip(expected_derivatives) {
        assert_eq!(relu_differential(*value), expected);
    }
}

#[test]
fn hidden_activation_should_rectify_and_output_activation_should_pass_through() {
    let x = [-2.0, 3.0];

    assert_eq!(Activation::ReLU.forward_output(&x), vec![0.0, 3.0]);
    assert_eq!(Activation::SoftMax.forward_output(&x), vec![-2.0, 3.0]);
}
