//! The Network, an ordered chain of Dense layers that is trained on labeled images by
//! backpropagation and plain per-sample gradient descent.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use savefile_derive::Savefile;

use crate::datasets::Image;
use crate::layers::{activations::softmax, Activation, Dense, Initializer};
use crate::loss_functions::categorical_cross_entropy;
use crate::types::{EpochSummary, Evaluation, NetworkError, TrainingOptions, TrainingVerbosity};
use crate::utils::{one_hot, Matrix, VectorOperations};

/// The version binary snapshots are written with and expected to have when loaded.
pub const SNAPSHOT_VERSION: u32 = 0;

#[derive(Debug, Clone, Default, Savefile)]
/// A feed-forward neural network for classification.
///
/// The first layer added receives the inputs, the last one is the output layer whose
/// pre-activations go through a softmax, and every layer in between is a ReLU hidden layer.
/// Once the layers are added the topology is frozen: training and loading only ever change the
/// values of the weights and biases.
pub struct Network {
    layers: Vec<Dense>,
}

#[derive(Debug, Default, Clone, Copy)]
/// Running loss and accuracy counts over some trained or evaluated samples.
struct Totals {
    loss_sum: f64,
    correct: usize,
    counted: usize,
    skipped: usize,
}

impl Totals {
    fn record(&mut self, loss: f64, correct: bool) {
        self.loss_sum += loss;
        self.counted += 1;
        if correct {
            self.correct += 1;
        }
    }

    fn merge(&mut self, other: &Totals) {
        self.loss_sum += other.loss_sum;
        self.correct += other.correct;
        self.counted += other.counted;
        self.skipped += other.skipped;
    }

    fn average_loss(&self) -> f64 {
        if self.counted == 0 {
            0.0
        } else {
            self.loss_sum / self.counted as f64
        }
    }

    fn accuracy(&self) -> f64 {
        if self.counted == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.counted as f64
        }
    }
}

fn epoch_progress_bar(batches_amount: usize, verbosity: &TrainingVerbosity) -> ProgressBar {
    if !verbosity.show_epoch_progress {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(batches_amount as u64);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} batches ({eta})")
    {
        progress.set_style(style);
    }

    progress
}

/// Prints a line above the progress bar, or straight to stdout if there is no bar drawn.
fn report(progress: &ProgressBar, line: String) {
    if progress.is_hidden() {
        println!("{}", line);
    } else {
        progress.println(line);
    }
}

fn read_values<'a, I>(
    values: &mut I,
    count: usize,
    layer_index: usize,
    what: &str,
) -> Result<Vec<f64>, NetworkError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut parsed = Vec::with_capacity(count);
    for _ in 0..count {
        let (line_index, text) = values.next().ok_or_else(|| NetworkError::FormatError {
            reason: format!("not enough {} values for layer {}", what, layer_index),
        })?;

        let value = text.parse::<f64>().map_err(|_| NetworkError::FormatError {
            reason: format!("line {}: '{}' is not a number", line_index + 1, text),
        })?;

        parsed.push(value);
    }

    Ok(parsed)
}

fn utf8_path(path: &Path) -> Result<&str, NetworkError> {
    path.to_str().ok_or_else(|| NetworkError::FormatError {
        reason: format!("the path {} is not valid UTF-8", path.display()),
    })
}

impl Network {
    /// Creates a Network without any layers.
    pub fn new() -> Network {
        Network { layers: Vec::new() }
    }

    /// Creates a Network from a list of sizes, where `sizes[0]` is the amount of inputs and
    /// every following size is the amount of outputs of one more layer.
    pub fn from_topology<R: Rng + ?Sized>(
        sizes: &[usize],
        rng: &mut R,
    ) -> Result<Network, NetworkError> {
        let mut network = Network::new();
        for window in sizes.windows(2) {
            network.add_layer_with_rng(window[0], window[1], rng)?;
        }

        Ok(network)
    }

    /// Appends a new layer with He initialized weights and zeroed biases drawn from the thread
    /// local generator. See **add_layer_with_rng**.
    pub fn add_layer(
        &mut self,
        inputs_amount: usize,
        outputs_amount: usize,
    ) -> Result<(), NetworkError> {
        self.add_layer_with_rng(inputs_amount, outputs_amount, &mut rand::thread_rng())
    }

    /// Appends a new layer with He initialized weights and zeroed biases drawn from **rng**.
    ///
    /// The new layer becomes the output layer and the previous output layer becomes a hidden
    /// one. Fails with an InvalidTopology if **inputs_amount** is not the amount of outputs of the
    /// current last layer.
    pub fn add_layer_with_rng<R: Rng + ?Sized>(
        &mut self,
        inputs_amount: usize,
        outputs_amount: usize,
        rng: &mut R,
    ) -> Result<(), NetworkError> {
        self.check_chaining(inputs_amount, outputs_amount)?;

        self.push_layer(Dense::new_with_rng(
            inputs_amount,
            outputs_amount,
            &Initializer::HeNormal,
            &Initializer::Constant(0.0),
            rng,
        ))
    }

    /// Appends an already built layer, which becomes the new output layer.
    pub fn push_layer(&mut self, mut layer: Dense) -> Result<(), NetworkError> {
        self.check_chaining(layer.inputs_amount(), layer.outputs_amount())?;

        if let Some(last) = self.layers.last_mut() {
            last.set_activation(Activation::ReLU);
        }

        layer.set_activation(Activation::SoftMax);
        self.layers.push(layer);

        Ok(())
    }

    fn check_chaining(
        &self,
        inputs_amount: usize,
        outputs_amount: usize,
    ) -> Result<(), NetworkError> {
        if inputs_amount == 0 || outputs_amount == 0 {
            return Err(NetworkError::EmptyLayer {
                inputs_amount,
                outputs_amount,
            });
        }

        if let Some(last) = self.layers.last() {
            if last.outputs_amount() != inputs_amount {
                return Err(NetworkError::InvalidTopology {
                    expected_inputs: last.outputs_amount(),
                    actual_inputs: inputs_amount,
                });
            }
        }

        Ok(())
    }

    /// All of the layers, from the input-adjacent one to the output layer.
    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// The weights of the layer at **layer_index**.
    pub fn layer_weights(&self, layer_index: usize) -> Result<&Matrix, NetworkError> {
        self.layers
            .get(layer_index)
            .map(Dense::weights)
            .ok_or(NetworkError::LayerIndexOutOfRange {
                index: layer_index,
                layers: self.layers.len(),
            })
    }

    /// The amount of inputs the first layer expects, None if there are no layers.
    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(Dense::inputs_amount)
    }

    /// The amount of classes the output layer predicts, None if there are no layers.
    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(Dense::outputs_amount)
    }

    /// Runs the forward pass through every layer and applies the softmax to the last one,
    /// returning a probability distribution over the classes.
    ///
    /// The parameters are left untouched, but every layer opens a new forward pass.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let (output_layer, hidden_layers) = self
            .layers
            .split_last_mut()
            .ok_or(NetworkError::EmptyNetwork)?;

        let mut current = input.to_vec();
        for layer in hidden_layers.iter_mut() {
            current = layer.forward(&current)?.to_vec();
        }

        output_layer.forward(&current)?;
        Ok(output_layer.apply_softmax()?.to_vec())
    }

    /// Computes the same probabilities as **predict** through a shared reference, without opening
    /// a forward pass on any layer.
    pub fn infer(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if self.layers.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }

        let mut current = input.to_vec();
        for layer in self.layers.iter() {
            current = layer.infer(&current)?;
        }

        Ok(softmax(&current))
    }

    /// The Categorical Cross Entropy of a predicted distribution for the **true_label**.
    pub fn loss(predicted: &[f64], true_label: usize) -> Result<f64, NetworkError> {
        categorical_cross_entropy(predicted, true_label)
    }

    /// Computes the delta of every layer for the currently open forward pass, from the output
    /// layer back to the first one.
    pub fn back_propagate(&mut self, target: &[f64]) -> Result<(), NetworkError> {
        let last_index = self
            .layers
            .len()
            .checked_sub(1)
            .ok_or(NetworkError::EmptyNetwork)?;

        self.layers[last_index].backward_output(target)?;

        for index in (0..last_index).rev() {
            let (head, tail) = self.layers.split_at_mut(index + 1);
            let next_layer = &tail[0];
            let next_delta = next_layer.delta().ok_or(NetworkError::NoDelta)?;

            head[index].backward_hidden(next_delta, next_layer.weights())?;
        }

        Ok(())
    }

    /// Updates every layer with the delta it got from **back_propagate**.
    pub fn apply_gradients(&mut self, learning_rate: f64) -> Result<(), NetworkError> {
        for layer in self.layers.iter_mut() {
            layer.update(learning_rate)?;
        }

        Ok(())
    }

    /// Trains on one sample: predicts it, propagates the error back and updates every layer.
    ///
    /// Gives back the loss of the prediction made before the update and whether that prediction
    /// was correct. An invalid label is rejected before anything is computed.
    pub fn train_sample(
        &mut self,
        input: &[f64],
        label: usize,
        learning_rate: f64,
    ) -> Result<(f64, bool), NetworkError> {
        let classes = self.output_size().ok_or(NetworkError::EmptyNetwork)?;
        let target = one_hot(label, classes).ok_or(NetworkError::InvalidLabel { label, classes })?;

        let predicted = self.predict(input)?;
        let loss = Self::loss(&predicted, label)?;
        let correct = predicted.argmax() == Some(label);

        self.back_propagate(&target)?;
        self.apply_gradients(learning_rate)?;

        Ok((loss, correct))
    }

    fn check_samples(&self, inputs: &[Vec<f64>], labels: &[u8]) -> Result<usize, NetworkError> {
        if inputs.len() != labels.len() {
            return Err(NetworkError::LengthMismatch {
                images: inputs.len(),
                labels: labels.len(),
            });
        }

        let input_size = self.input_size().ok_or(NetworkError::EmptyNetwork)?;
        if let Some(input) = inputs.iter().find(|input| input.len() != input_size) {
            return Err(NetworkError::DimensionMismatch {
                expected: input_size,
                actual: input.len(),
            });
        }

        self.output_size().ok_or(NetworkError::EmptyNetwork)
    }

    fn normalize_images(images: &[Image], labels: &[u8]) -> Result<Vec<Vec<f64>>, NetworkError> {
        if images.len() != labels.len() {
            return Err(NetworkError::LengthMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }

        Ok(images.iter().map(Image::normalize).collect())
    }

    /// Trains the Network on images and their labels, normalizing every image first.
    /// See **fit** for how the training goes.
    pub fn train(
        &mut self,
        images: &[Image],
        labels: &[u8],
        options: &TrainingOptions,
    ) -> Result<Vec<EpochSummary>, NetworkError> {
        let inputs = Self::normalize_images(images, labels)?;
        self.fit(&inputs, labels, options)
    }

    /// Trains the Network on already normalized inputs and their labels.
    ///
    /// Every epoch shuffles the samples and walks through them in consecutive batches of
    /// `batch_size`, the last one possibly smaller. The parameters are updated after every single
    /// sample, batches only decide how often progress is reported. Samples with a label outside
    /// of the classes are skipped with a warning.
    ///
    /// Every input is checked against the size of the first layer before any training happens.
    pub fn fit(
        &mut self,
        inputs: &[Vec<f64>],
        labels: &[u8],
        options: &TrainingOptions,
    ) -> Result<Vec<EpochSummary>, NetworkError> {
        options.validate()?;
        let classes = self.check_samples(inputs, labels)?;
        let verbosity = &options.verbosity;

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let batches_amount = (inputs.len() + options.batch_size - 1) / options.batch_size;
        let mut indices: Vec<usize> = (0..inputs.len()).collect();
        let mut summaries = Vec::with_capacity(options.epochs);

        for epoch in 1..=options.epochs {
            let learning_rate = options.learning_rate_for_epoch(epoch);
            if verbosity.show_current_epoch {
                println!("epoch #{}/{}", epoch, options.epochs);
            }

            indices.shuffle(&mut rng);

            let progress = epoch_progress_bar(batches_amount, verbosity);
            let start_instant = Instant::now();
            let mut epoch_totals = Totals::default();

            for (batch_index, batch) in indices.chunks(options.batch_size).enumerate() {
                let mut batch_totals = Totals::default();

                for &sample_index in batch {
                    let label = labels[sample_index] as usize;
                    if label >= classes {
                        batch_totals.skipped += 1;
                        if verbosity.warn_invalid_labels {
                            report(
                                &progress,
                                format!(
                                    "warning: skipping sample #{} with label {}, expected a class in [0, {})",
                                    sample_index, label, classes
                                ),
                            );
                        }
                        continue;
                    }

                    let (loss, correct) =
                        self.train_sample(&inputs[sample_index], label, learning_rate)?;
                    batch_totals.record(loss, correct);
                }

                if verbosity.show_batch_progress
                    && options.log_frequency > 0
                    && (batch_index + 1) % options.log_frequency == 0
                {
                    report(
                        &progress,
                        format!(
                            "batch {}/{} - loss: {:.4}, accuracy: {:.2}%",
                            batch_index + 1,
                            batches_amount,
                            batch_totals.average_loss(),
                            batch_totals.accuracy()
                        ),
                    );
                }

                epoch_totals.merge(&batch_totals);
                progress.inc(1);
            }

            progress.finish_and_clear();

            let summary = EpochSummary {
                epoch,
                learning_rate,
                average_loss: epoch_totals.average_loss(),
                accuracy: epoch_totals.accuracy(),
                trained_samples: epoch_totals.counted,
                skipped_samples: epoch_totals.skipped,
                elapsed: start_instant.elapsed(),
            };

            if verbosity.prints_summary() {
                println!("epoch #{} summary:", epoch);
            }
            if verbosity.print_loss {
                println!("  average loss: {:.4}", summary.average_loss);
            }
            if verbosity.print_accuracy {
                println!("  training accuracy: {:.2}%", summary.accuracy);
            }
            if verbosity.show_epoch_elapsed {
                println!("  time: {:.1}s", summary.elapsed.as_secs_f32());
            }

            summaries.push(summary);
        }

        Ok(summaries)
    }

    /// Evaluates already normalized inputs, computing the average loss and the accuracy.
    ///
    /// Samples are evaluated in parallel through **infer**, so no layer state is touched. Samples
    /// with an invalid label are skipped with a warning printed to stdout, like the training
    /// warnings, and don't count towards either number.
    pub fn evaluate_inputs_with_loss(
        &self,
        inputs: &[Vec<f64>],
        labels: &[u8],
    ) -> Result<Evaluation, NetworkError> {
        let classes = self.check_samples(inputs, labels)?;

        let outcomes = inputs
            .par_iter()
            .zip(labels.par_iter())
            .map(|(input, &label)| -> Result<Option<(f64, bool)>, NetworkError> {
                let label = label as usize;
                if label >= classes {
                    return Ok(None);
                }

                let predicted = self.infer(input)?;
                let loss = Self::loss(&predicted, label)?;
                Ok(Some((loss, predicted.argmax() == Some(label))))
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;

        let mut totals = Totals::default();
        for outcome in outcomes {
            match outcome {
                Some((loss, correct)) => totals.record(loss, correct),
                None => totals.skipped += 1,
            }
        }

        if totals.skipped > 0 {
            println!(
                "warning: skipped {} samples with labels outside of [0, {})",
                totals.skipped, classes
            );
        }

        Ok(Evaluation {
            average_loss: totals.average_loss(),
            accuracy: totals.accuracy(),
            evaluated_samples: totals.counted,
            skipped_samples: totals.skipped,
        })
    }

    /// The percentage of already normalized inputs whose most probable class is their label.
    pub fn evaluate_inputs(&self, inputs: &[Vec<f64>], labels: &[u8]) -> Result<f64, NetworkError> {
        Ok(self.evaluate_inputs_with_loss(inputs, labels)?.accuracy)
    }

    /// Evaluates images and their labels, computing the average loss and the accuracy.
    pub fn evaluate_with_loss(
        &self,
        images: &[Image],
        labels: &[u8],
    ) -> Result<Evaluation, NetworkError> {
        let inputs = Self::normalize_images(images, labels)?;
        self.evaluate_inputs_with_loss(&inputs, labels)
    }

    /// The percentage of images whose most probable class is their label, ties going to the
    /// lowest class.
    pub fn evaluate(&self, images: &[Image], labels: &[u8]) -> Result<f64, NetworkError> {
        Ok(self.evaluate_with_loss(images, labels)?.accuracy)
    }

    /// Writes every weight and bias as text, one value per line, layer after layer with the
    /// weights row-major before the biases.
    ///
    /// The values are written in their shortest form that parses back to the exact same number.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NetworkError> {
        let mut writer = BufWriter::new(File::create(path)?);

        for layer in self.layers.iter() {
            for weight in layer.weights().as_slice() {
                writeln!(writer, "{}", weight)?;
            }
            for bias in layer.biases() {
                writeln!(writer, "{}", bias)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads weights and biases written by **save** from a Network of the same topology.
    ///
    /// Fails with a FileNotFound if the file does not exist, and with a FormatError if it holds
    /// too few values, too many values or something that is not a number. Nothing is changed
    /// unless the whole file fits.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NetworkError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => NetworkError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => NetworkError::Io(err),
        })?;

        let mut values = contents
            .lines()
            .enumerate()
            .map(|(line_index, line)| (line_index, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let mut parameters = Vec::with_capacity(self.layers.len());
        for (layer_index, layer) in self.layers.iter().enumerate() {
            let (rows, cols) = (layer.inputs_amount(), layer.outputs_amount());

            let weights = read_values(&mut values, rows * cols, layer_index, "weight")?;
            let biases = read_values(&mut values, cols, layer_index, "bias")?;
            let weights = Matrix::from_row_major(rows, cols, weights).ok_or_else(|| {
                NetworkError::FormatError {
                    reason: format!("the weights of layer {} do not fit its shape", layer_index),
                }
            })?;

            parameters.push((weights, biases));
        }

        if let Some((line_index, _)) = values.next() {
            return Err(NetworkError::FormatError {
                reason: format!(
                    "the file holds more values than the network has parameters, starting at line {}",
                    line_index + 1
                ),
            });
        }

        for (layer, (weights, biases)) in self.layers.iter_mut().zip(parameters) {
            layer.set_parameters(weights, biases);
        }

        Ok(())
    }

    /// Lists the `(row, col)` positions where the weights of the layer at **layer_index** differ
    /// from the ones in a weights file, leaving this Network untouched.
    pub fn weight_mismatches<P: AsRef<Path>>(
        &self,
        layer_index: usize,
        path: P,
    ) -> Result<Vec<(usize, usize)>, NetworkError> {
        let current = self.layer_weights(layer_index)?;

        let mut loaded = self.clone();
        loaded.load(path)?;
        let stored = loaded.layer_weights(layer_index)?;

        let mut mismatches = Vec::new();
        for row in 0..current.rows() {
            for (col, (a, b)) in current.row(row).iter().zip(stored.row(row)).enumerate() {
                if a != b {
                    mismatches.push((row, col));
                }
            }
        }

        Ok(mismatches)
    }

    /// Saves the whole Network, topology included, as a binary snapshot.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), NetworkError> {
        savefile::save_file(utf8_path(path.as_ref())?, SNAPSHOT_VERSION, self)?;
        Ok(())
    }

    /// Loads a Network saved with **save_snapshot**. No layer has an open forward pass afterwards.
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Network, NetworkError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetworkError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(savefile::load_file(utf8_path(path)?, SNAPSHOT_VERSION)?)
    }
}
