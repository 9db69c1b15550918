use crate::builder_traits::*;
use crate::conditioning::{Conditionable, ConditionableSubcircuit};
use crate::errors::{CircuitError, CircuitResult};
use crate::types::Precision;
use std::ops::Range;
use tracing::trace;

/// A trait which recursively requires that subcircuit builders also implement the traits the
/// original circuit builders implemented. This allows passing to functions which may arbitrarily
/// call other functions without type-tracking the depth of the stack.
pub trait RecursiveCircuitBuilder<P: Precision>:
    Invertable<SimilarBuilder = Self::RecursiveSimilarBuilder>
    + Conditionable
    + CliffordBuilder<P>
    + RotationsBuilder<P>
    + TemporaryRegisterBuilder
    + Subcircuitable
    + ConditionableSubcircuit
{
    /// The similar builder which also implements the recursive circuit builder, it may be the same
    /// type or different.
    type RecursiveSimilarBuilder: RecursiveCircuitBuilder<P>
        + Subcircuitable<Subcircuit = Self::Subcircuit>;
}

/// An Invertable circuit builder must be able to produce a similar circuit builder with the
/// `new_similar` call. This subcircuit builder can be used to make circuits that Self can invert
/// and then apply.
pub trait Invertable: Subcircuitable {
    /// A similar circuit builder which can be used to construct circuits for the parent.
    type SimilarBuilder: Subcircuitable<Subcircuit = Self::Subcircuit>;

    /// Make a similar circuit builder.
    fn new_similar(&self) -> Self::SimilarBuilder;
    /// Take the output of the similar circuit builder and invert it.
    fn invert_subcircuit(sc: Self::Subcircuit) -> CircuitResult<Self::Subcircuit>;
    /// Apply the inverted subcircuit to a register.
    fn apply_inverted_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        r: Self::Register,
    ) -> CircuitResult<Self::Register> {
        let sc = Self::invert_subcircuit(sc)?;
        self.apply_subcircuit(sc, r)
    }
}

/// Record the circuit made by `f` on fresh registers shaped like `rs` in a similar builder.
/// `f` must hand back the registers it was given, in the same order.
fn record_subcircuit<CB, F>(cb: &CB, rs: &[CB::Register], f: F) -> CircuitResult<CB::Subcircuit>
where
    CB: Invertable,
    F: FnOnce(
        &mut CB::SimilarBuilder,
        Vec<<CB::SimilarBuilder as CircuitBuilder>::Register>,
    ) -> CircuitResult<Vec<<CB::SimilarBuilder as CircuitBuilder>::Register>>,
{
    let mut sub_cb = cb.new_similar();
    let sub_rs = rs
        .iter()
        .map(|r| {
            sub_cb
                .qudit(r.n())
                .ok_or_else(|| CircuitError::new("Cannot record a circuit on an empty register"))
        })
        .collect::<CircuitResult<Vec<_>>>()?;
    let given = flat_indices(&sub_rs);
    let returned = f(&mut sub_cb, sub_rs)?;
    if flat_indices(&returned) != given {
        return Err(CircuitError::new(
            "Compute must return the registers it was given, in order",
        ));
    }
    sub_cb.make_subcircuit()
}

fn flat_indices<R: QubitRegister>(rs: &[R]) -> Vec<usize> {
    rs.iter().flat_map(|r| r.indices().iter().copied()).collect()
}

fn register_ranges<R: QubitRegister>(rs: &[R]) -> Vec<Range<usize>> {
    let (_, ranges) = rs
        .iter()
        .map(|r| r.n())
        .fold((0, vec![]), |(n, mut acc), rn| {
            acc.push(n..n + rn);
            (n + rn, acc)
        });
    ranges
}

fn merge_all<CB: CircuitBuilder + ?Sized>(
    cb: &mut CB,
    rs: Vec<CB::Register>,
) -> CircuitResult<CB::Register> {
    cb.merge_registers(rs)
        .ok_or_else(|| CircuitError::new("At least one register is required"))
}

fn split_ranges<CB: CircuitBuilder + ?Sized>(
    cb: &mut CB,
    r: CB::Register,
    ranges: Vec<Range<usize>>,
) -> CircuitResult<Vec<CB::Register>> {
    cb.split_relative_index_groups(r, ranges)
        .get_all_selected()
        .map_err(|_| CircuitError::new("Registers did not cover the merged register"))
}

/// Apply `compute` to `rs`, then `action`, then the inverse of `compute`: `C† A C`.
///
/// `compute` is recorded once in a similar builder, so the same operations are undone exactly.
/// `action` must hand back the registers it was given, in the same order.
/// If either closure fails the error is returned and the circuit built so far is incomplete.
///
/// # Example
/// ```
/// use qwalk::prelude::*;
/// # fn main() -> Result<(), CircuitError> {
/// let mut b = LocalBuilder::<f64>::default();
/// let r = b.qubit();
/// // H X H acts as Z, sending |1> to -|1>.
/// let rs = within_apply(
///     &mut b,
///     vec![r],
///     |sb, rs| rs.into_iter().map(|r| sb.h(r)).collect(),
///     |b, rs| rs.into_iter().map(|r| b.x(r)).collect(),
/// )?;
/// let (state, _) = b.calculate_state_with_init([(&rs[0], 1)])?;
/// assert!((state[1].re + 1.0).abs() < 1e-10);
/// # Ok(())
/// # }
/// ```
pub fn within_apply<CB, C, A>(
    cb: &mut CB,
    rs: Vec<CB::Register>,
    compute: C,
    action: A,
) -> CircuitResult<Vec<CB::Register>>
where
    CB: Invertable,
    C: FnOnce(
        &mut CB::SimilarBuilder,
        Vec<<CB::SimilarBuilder as CircuitBuilder>::Register>,
    ) -> CircuitResult<Vec<<CB::SimilarBuilder as CircuitBuilder>::Register>>,
    A: FnOnce(&mut CB, Vec<CB::Register>) -> CircuitResult<Vec<CB::Register>>,
{
    let subcircuit = record_subcircuit(cb, &rs, compute)?;
    let ranges = register_ranges(&rs);

    let r = merge_all(cb, rs)?;
    let indices = r.indices().to_vec();
    let r = cb.apply_subcircuit(subcircuit.clone(), r)?;
    let rs = split_ranges(cb, r, ranges.clone())?;

    let rs = action(cb, rs)?;

    let r = merge_all(cb, rs)?;
    if r.indices() != indices.as_slice() {
        return Err(CircuitError::new(
            "Action must return the registers it was given, in order",
        ));
    }
    trace!(qubits = indices.len(), "uncomputing within_apply block");
    let r = cb.apply_inverted_subcircuit(subcircuit, r)?;
    split_ranges(cb, r, ranges)
}
