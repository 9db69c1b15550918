//! Loading a classical probability distribution into the amplitudes of a register.

use crate::builder_traits::*;
use crate::conditioning::Conditionable;
use crate::errors::{CircuitError, CircuitResult};
use crate::types::Precision;
use tracing::trace;

/// Default allowed distance between the sum of a probability vector and 1.
pub const DEFAULT_PROBABILITY_BOUND: f64 = 0.01;

/// Rounding slack so that a sum lying exactly on the bound is accepted.
const BOUND_SLACK: f64 = 4.0 * f64::EPSILON;

/// Check that `probabilities` can be loaded into a register of `qubits` qubits, and return them
/// normalized to sum to exactly 1. The bound is inclusive.
///
/// ```
/// use qwalk::state_prep::validate_probabilities;
/// let p = validate_probabilities(1, &[0.25, 0.76], 0.01).unwrap();
/// assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
/// assert!(validate_probabilities(1, &[0.25, 0.5], 0.01).is_err());
/// assert!(validate_probabilities(2, &[0.5, 0.5], 0.01).is_err());
/// ```
pub fn validate_probabilities(
    qubits: usize,
    probabilities: &[f64],
    bound: f64,
) -> CircuitResult<Vec<f64>> {
    let expected = if qubits < usize::BITS as usize {
        1usize << qubits
    } else {
        0
    };
    if probabilities.len() != expected {
        return Err(CircuitError::ProbabilityCount {
            qubits,
            expected,
            actual: probabilities.len(),
        });
    }
    let sum: f64 = probabilities.iter().sum();
    let well_formed = probabilities.iter().all(|p| p.is_finite() && *p >= 0.0);
    if !well_formed || !sum.is_finite() || (sum - 1.0).abs() > bound + BOUND_SLACK {
        return Err(CircuitError::InvalidProbabilities { sum, bound });
    }
    Ok(probabilities.iter().map(|p| p / sum).collect())
}

/// Load `probabilities` into `r`, which must be in |0...0>, so that it ends in
/// `sum_j sqrt(probabilities[j]) |j>`. The first qubit of `r` is the most significant bit of `j`.
///
/// The state is built as a binary tree of y rotations: each qubit is rotated conditioned on the
/// value of the qubits before it, splitting the marginal probability of that prefix between
/// its two halves.
///
/// # Example
/// ```
/// use qwalk::prelude::*;
/// # fn main() -> Result<(), CircuitError> {
/// let mut b = LocalBuilder::<f64>::default();
/// let r = b.qudit(2).unwrap();
/// let r = prepare_state(&mut b, r, &[0.5, 0.0, 0.0, 0.5], 0.01)?;
/// let (state, _) = b.calculate_state_with_init([(&r, 0)])?;
/// assert!((state[0b00].re - 0.5f64.sqrt()).abs() < 1e-10);
/// assert!((state[0b11].re - 0.5f64.sqrt()).abs() < 1e-10);
/// # Ok(())
/// # }
/// ```
pub fn prepare_state<P, CB>(
    b: &mut CB,
    r: CB::Register,
    probabilities: &[f64],
    bound: f64,
) -> CircuitResult<CB::Register>
where
    P: Precision,
    CB: RotationsBuilder<P> + Conditionable,
{
    let n = r.n();
    let probs = validate_probabilities(n, probabilities, bound)?;

    let mut rest = b.split_all_register(r).into_iter();
    let mut prefix: Option<CB::Register> = None;
    for q in 0..n {
        let mut target = rest
            .next()
            .ok_or_else(|| CircuitError::new("Register split into too few qubits"))?;
        let span = 1usize << (n - q);
        for (p, block) in probs.chunks(span).enumerate() {
            let (lo, hi) = block.split_at(span / 2);
            let p0: f64 = lo.iter().sum();
            let p1: f64 = hi.iter().sum();
            if p1 <= 0.0 {
                continue;
            }
            let theta = 2.0 * p1.sqrt().atan2(p0.sqrt());
            trace!(qubit = q, prefix = p, theta, "state preparation rotation");
            let theta = P::from(theta)
                .ok_or_else(|| CircuitError::new("Rotation angle not representable"))?;
            target = match prefix.take() {
                None => b.ry(target, theta)?,
                Some(pr) => {
                    let mut c = b.condition_on_value(pr, p)?;
                    let target = c.ry(target, theta)?;
                    prefix = Some(c.dissolve()?);
                    target
                }
            };
        }
        prefix = Some(match prefix {
            None => target,
            Some(pr) => b.merge_two_registers(pr, target),
        });
    }
    prefix.ok_or_else(|| CircuitError::new("Cannot prepare a state on an empty register"))
}
