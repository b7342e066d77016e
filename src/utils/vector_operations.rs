/// Elementwise helpers over slices of `f64` used by the activations and the training loop.
pub trait VectorOperations {
    fn add(&self, against: &[f64]) -> Vec<f64>;

    fn subtract(&self, against: &[f64]) -> Vec<f64>;

    fn subtract_number(&self, number: f64) -> Vec<f64>;

    fn exp(&self) -> Vec<f64>;

    /// The largest value, or None for an empty slice. NaN values are ignored.
    fn max_value(&self) -> Option<f64>;

    /// The index of the largest value, resolving ties to the lowest index.
    fn argmax(&self) -> Option<usize>;
}

impl VectorOperations for [f64] {
    fn add(&self, against: &[f64]) -> Vec<f64> {
        self.iter().zip(against).map(|(a, b)| a + b).collect()
    }

    fn subtract(&self, against: &[f64]) -> Vec<f64> {
        self.iter().zip(against).map(|(a, b)| a - b).collect()
    }

    fn subtract_number(&self, number: f64) -> Vec<f64> {
        self.iter().map(|x| x - number).collect()
    }

    fn exp(&self) -> Vec<f64> {
        self.iter().map(|x| x.exp()).collect()
    }

    fn max_value(&self) -> Option<f64> {
        self.iter()
            .copied()
            .filter(|x| !x.is_nan())
            .fold(None, |max, x| match max {
                Some(max) if max >= x => Some(max),
                _ => Some(x),
            })
    }

    fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &x) in self.iter().enumerate() {
            if x.is_nan() {
                continue;
            }

            match best {
                // only a strictly greater value moves it, ties keep the first occurrence
                Some((_, max)) if x <= max => {}
                _ => best = Some((i, x)),
            }
        }

        best.map(|(i, _)| i)
    }
}
