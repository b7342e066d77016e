#![allow(dead_code)]

/// Asserts if the vectors **a** and **b** are approximately equal
/// being at most **max_dist** of a difference.
///
/// # Panics
///
/// Panics if the length of both vectors are not equal.
pub(crate) fn assert_approx_equal_distance(a: &[f64], b: &[f64], max_dist: f64) {
    assert_eq!(a.len(), b.len());

    a.iter().zip(b).for_each(|(x, y)| {
        assert!(
            (x - y).abs() <= max_dist,
            "{} and {} differ by more than {}",
            x,
            y,
            max_dist
        );
    });
}

/// Asserts that the values of a vector sum up to **expected** within **max_dist**.
pub(crate) fn assert_sums_to(values: &[f64], expected: f64, max_dist: f64) {
    let sum = values.iter().sum::<f64>();
    assert!(
        (sum - expected).abs() <= max_dist,
        "expected the values to sum up to {} but they sum up to {}",
        expected,
        sum
    );
}
