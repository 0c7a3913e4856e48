//! Naive single-pass prefix sums.
//!
//! These are the reference the three-phase scan is checked against, and the
//! baseline it is benchmarked against.

pub fn prefix_sum_scalar(input: &[i32]) -> Vec<i32> {
    let mut output = Vec::with_capacity(input.len());
    let mut sum = 0i32;
    for &value in input {
        sum = sum.wrapping_add(value);
        output.push(sum);
    }
    output
}

pub fn prefix_sum_scalar_in_place(values: &mut [i32]) {
    let mut sum = 0i32;
    for value in values {
        sum = sum.wrapping_add(*value);
        *value = sum;
    }
}

/// Returns `true` if `prefix` is the wrapping inclusive prefix sum of `input`.
pub fn verify_prefix_sum(input: &[i32], prefix: &[i32]) -> bool {
    if input.len() != prefix.len() {
        return false;
    }
    let mut expected = 0i32;
    input.iter().zip(prefix).all(|(&value, &actual)| {
        expected = expected.wrapping_add(value);
        expected == actual
    })
}
