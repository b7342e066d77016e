use digitnet::{
    datasets::mnist::{self, Split},
    types::{TrainingOptions, TrainingVerbosity},
    Network,
};

const WEIGHTS_PATH: &str = "mnist-weights.txt";

fn main() -> () {
    // expects the four MNIST files (raw or gzipped) inside of this directory
    let data_directory = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/mnist".to_string());

    let training = mnist::load(&data_directory, Split::Training)
        .expect("unable to load the MNIST training set");
    let test = mnist::load(&data_directory, Split::Test).expect("unable to load the MNIST test set");

    // 14x14 images after the resolution is halved
    let mut network = Network::new();
    network.add_layer(196, 128).expect("unable to add a layer");
    network.add_layer(128, 64).expect("unable to add a layer");
    network.add_layer(64, 10).expect("unable to add a layer");

    network
        .train(
            &training.images,
            &training.labels,
            &TrainingOptions {
                epochs: 10,
                learning_rate: 0.01,
                batch_size: 32,
                log_frequency: 100,
                learning_rate_decay: 1e-4,
                seed: None,
                verbosity: TrainingVerbosity {
                    show_batch_progress: false,
                    ..TrainingVerbosity::default()
                },
            },
        )
        .expect("unable to train the MNIST network");

    let evaluation = network
        .evaluate_with_loss(&test.images, &test.labels)
        .expect("unable to evaluate the MNIST network");
    println!(
        "test loss: {:.4}, test accuracy: {:.2}%",
        evaluation.average_loss, evaluation.accuracy
    );

    network
        .save(WEIGHTS_PATH)
        .expect("unable to save the MNIST weights");
}
