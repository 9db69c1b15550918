#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::into_iter;
use crate::utils::{basis_index, register_value};
use crate::{Complex, Precision};
use num_traits::Zero;

/// Get total magnitude of state.
pub fn prob_magnitude<P: Precision>(input: &[Complex<P>]) -> P {
    input.iter().map(Complex::<P>::norm_sqr).sum()
}

/// Calculate the probability of a given measurement. `measured` gives the value which has been
/// measured from the qubits at `indices`, the first of `indices` being its most significant bit.
/// `input` gives the state from which to measure, representing a total of `n` qubits.
///
/// Keep in mind that qubits are big-endian to match kron product standards.
/// `|abc>` means `q0=a`, `q1=b`, `q2=c`
///
/// # Examples
/// ```
/// use qwalk::state_ops::matrix_ops::from_reals;
/// use qwalk::state_ops::measurement_ops::measure_prob;
///
/// // Make the state |10>, index 0 is always |1> and index 1 is always |0>
/// let input = from_reals(&[0.0, 0.0, 1.0, 0.0]);
///
/// let p = measure_prob(2, 0, &[0], &input);
/// assert_eq!(p, 0.0);
///
/// let p = measure_prob(2, 1, &[0], &input);
/// assert_eq!(p, 1.0);
///
/// let p = measure_prob(2, 0b10, &[0, 1], &input);
/// assert_eq!(p, 1.0);
///
/// let p = measure_prob(2, 0b01, &[1, 0], &input);
/// assert_eq!(p, 1.0);
/// ```
pub fn measure_prob<P: Precision>(
    n: usize,
    measured: usize,
    indices: &[usize],
    input: &[Complex<P>],
) -> P {
    let template = basis_index(n, [(indices, measured)]);
    let remaining_indices: Vec<usize> = (0..n).filter(|i| !indices.contains(i)).collect();

    let f = |remaining_index_bits: usize| -> Option<P> {
        let index = basis_index(
            n,
            [(remaining_indices.as_slice(), remaining_index_bits)],
        ) | template;
        let amp = input[index];
        if amp.is_zero() {
            None
        } else {
            Some(amp.norm_sqr())
        }
    };

    let r = 0usize..1 << remaining_indices.len();
    into_iter!(r).filter_map(f).sum()
}

/// Get probability for each possible measurement of `indices` on `input`, indexed by the
/// measured value.
pub fn measure_probs<P: Precision>(n: usize, indices: &[usize], input: &[Complex<P>]) -> Vec<P> {
    let r = 0usize..1 << indices.len();
    into_iter!(r)
        .map(|measured| measure_prob(n, measured, indices, input))
        .collect()
}

/// Sample a measurement from a state `input`.
/// Sample from qubits at `indices` and return their value, see `measure_prob` for the bit order.
///
/// # Examples
/// ```
/// use qwalk::state_ops::matrix_ops::from_reals;
/// use qwalk::state_ops::measurement_ops::soft_measure;
///
/// // Make the state |10>, index 0 is always |1> and index 1 is always |0>
/// let input = from_reals(&[0.0, 0.0, 1.0, 0.0]);
///
/// assert_eq!(soft_measure(2, &[0], &input), 1);
/// assert_eq!(soft_measure(2, &[1], &input), 0);
/// assert_eq!(soft_measure(2, &[0, 1], &input), 0b10);
/// assert_eq!(soft_measure(2, &[1, 0], &input), 0b01);
/// ```
pub fn soft_measure<P: Precision>(n: usize, indices: &[usize], input: &[Complex<P>]) -> usize {
    let mut r = P::from(rand::random::<f64>()).unwrap_or_else(P::zero) * prob_magnitude(input);
    let mut measured_indx = 0;
    for (i, c) in input.iter().enumerate() {
        let p = c.norm_sqr();
        if p.is_zero() {
            continue;
        }
        measured_indx = i;
        r -= p;
        if r <= P::zero() {
            break;
        }
    }
    register_value(n, indices, measured_indx)
}

/// Selects a measured value for `indices` from `input` and collapses the state into `output`.
/// Returns the measured value and its probability.
pub fn measure<P: Precision>(
    n: usize,
    indices: &[usize],
    input: &[Complex<P>],
    output: &mut [Complex<P>],
) -> (usize, P) {
    let m = soft_measure(n, indices, input);
    let p = measure_prob(n, m, indices, input);
    measure_state(n, indices, (m, p), input, output);
    (m, p)
}

/// Normalize the output state such that it matches only states which produce the `measured`
/// result and has the same magnitude.
/// This is done by zeroing out the states which cannot give `measured`, and dividing the remaining
/// by the `sqrt(1/p)` for p=`measured_prob`. See `measure_prob` for details.
pub fn measure_state<P: Precision>(
    n: usize,
    indices: &[usize],
    measured: (usize, P),
    input: &[Complex<P>],
    output: &mut [Complex<P>],
) {
    let (measured, measured_prob) = measured;
    if !measured_prob.is_zero() {
        let p_mult = P::one() / measured_prob.sqrt();
        input
            .iter()
            .zip(output.iter_mut())
            .enumerate()
            .for_each(|(row, (input, output))| {
                if register_value(n, indices, row) == measured {
                    *output = (*input) * p_mult;
                } else {
                    *output = Complex::zero();
                }
            });
    }
}
