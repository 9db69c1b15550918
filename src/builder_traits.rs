use crate::errors::{CircuitError, CircuitResult};
use crate::types::Precision;
use std::fmt::Debug;
use std::num::NonZeroUsize;

/// Standard functions needed by registers containing multiple qubits.
pub trait QubitRegister {
    /// Size of the register in qubits.
    fn n(&self) -> usize;
    /// Absolute indices represented by the register.
    fn indices(&self) -> &[usize];
}

/// Result of splitting a register in two.
#[derive(Debug)]
pub enum SplitResult<R: QubitRegister + Debug> {
    /// All registers were selected
    SELECTED(R),
    /// None of the registers were selected
    UNSELECTED(R),
    /// Some registers were selected, some were not selected.
    SPLIT(R, R),
}

/// Result of splitting a register into multiple registers.
#[derive(Debug)]
pub enum SplitManyResult<R: QubitRegister + Debug> {
    /// All registers were selected.
    AllSelected(Vec<R>),
    /// Some were selected, remaining were not.
    Remaining(Vec<R>, R),
}

impl<R: QubitRegister + Debug> SplitManyResult<R> {
    /// Returns select and unselected registers.
    pub fn get_all_selected(self) -> Result<Vec<R>, Vec<R>> {
        match self {
            SplitManyResult::AllSelected(v) => Ok(v),
            SplitManyResult::Remaining(v, _) => Err(v),
        }
    }
}

/// A base-level circuit builder trait, requiring definitions of registers, base circuit objects,
/// and end-result quantum state.
pub trait CircuitBuilder {
    /// The register type used for the circuit.
    type Register: QubitRegister + Debug;
    /// The struct used to represent circuit objects.
    type CircuitObject;
    /// Return type for state calculations.
    type StateCalculation;

    /// Number of qubits in circuit.
    fn n(&self) -> usize;

    /// Construct a single qubit.
    fn qubit(&mut self) -> Self::Register {
        self.register(NonZeroUsize::MIN)
    }

    /// Construct a register with multiple qubits. Fails if n=0.
    fn qudit(&mut self, n: usize) -> Option<Self::Register> {
        NonZeroUsize::new(n).map(|n| self.register(n))
    }

    /// Construct a register with multiple qubits.
    fn register(&mut self, n: NonZeroUsize) -> Self::Register;

    /// Merge two registers into a single register with first the r1 indices, then the r2 indices.
    fn merge_two_registers(&mut self, r1: Self::Register, r2: Self::Register) -> Self::Register;

    /// Merge multiple registers together into a single register, returns None if none given.
    fn merge_registers<It>(&mut self, rs: It) -> Option<Self::Register>
    where
        It: IntoIterator<Item = Self::Register>,
    {
        rs.into_iter().fold(None, |acc, r1| match acc {
            Some(r2) => Some(self.merge_two_registers(r2, r1)),
            None => Some(r1),
        })
    }

    /// Split a register into two, selecting the relative indices from the `indices` iterator.
    fn split_register_relative<It>(
        &mut self,
        r: Self::Register,
        indices: It,
    ) -> SplitResult<Self::Register>
    where
        It: IntoIterator<Item = usize>;

    /// Split the register into `r.n()` individual registers of 1 qubit each.
    fn split_all_register(&mut self, r: Self::Register) -> Vec<Self::Register> {
        split_helper(self, r, vec![])
    }

    /// Split off the first `k` qubits of the register, returning them and the remaining qubits.
    fn split_prefix(
        &mut self,
        r: Self::Register,
        k: usize,
    ) -> (Option<Self::Register>, Option<Self::Register>) {
        match self.split_register_relative(r, 0..k) {
            SplitResult::SELECTED(r) => (Some(r), None),
            SplitResult::UNSELECTED(r) => (None, Some(r)),
            SplitResult::SPLIT(ra, rb) => (Some(ra), Some(rb)),
        }
    }

    /// Split into multiple qubits, each with relative indices given by the sub-iterators.
    ///
    /// # Example
    /// ```
    /// # use qwalk::prelude::*;
    ///
    /// # fn main() {
    /// let mut b = LocalBuilder::<f64>::default();
    /// let ra = b.qudit(5).expect("5 is non-negative");
    /// let rb = b.qudit(5).expect("5 is non-negative");
    /// assert_eq!(ra.indices(), &[0,1,2,3,4]);
    /// let split_res = b.split_relative_index_groups(rb, [[0,1], [2,3]]);
    /// if let SplitManyResult::Remaining(groups, remaining) = split_res {
    ///     assert_eq!(groups[0].indices(), &[5, 6]);
    ///     assert_eq!(groups[1].indices(), &[7, 8]);
    ///     assert_eq!(remaining.indices(), &[9])
    /// } else {
    ///     assert!(false);
    /// };
    ///
    /// # }
    /// ```
    fn split_relative_index_groups<
        It: IntoIterator<Item = Itt>,
        Itt: IntoIterator<Item = usize>,
    >(
        &mut self,
        r: Self::Register,
        indices: It,
    ) -> SplitManyResult<Self::Register> {
        let mut rs = self
            .split_all_register(r)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        let selected_rs = indices
            .into_iter()
            .flat_map(|is| {
                let subrs = is.into_iter().flat_map(|i| rs[i].take());
                self.merge_registers(subrs)
            })
            .collect();
        let remaining_rs = self.merge_registers(rs.into_iter().flatten());
        match remaining_rs {
            None => SplitManyResult::AllSelected(selected_rs),
            Some(r) => SplitManyResult::Remaining(selected_rs, r),
        }
    }

    /// Apply a circuit object to the circuit directly.
    fn apply_circuit_object(
        &mut self,
        r: Self::Register,
        c: Self::CircuitObject,
    ) -> CircuitResult<Self::Register>;

    /// Calculate the quantum state at the end of the circuit, using |0> as input.
    fn calculate_state(&mut self) -> Self::StateCalculation {
        self.calculate_state_with_init(None)
    }

    /// Calculate the state at the end of the circuit using an initial state given by each register
    /// and the classical state in that register.
    fn calculate_state_with_init<'a, It>(&mut self, it: It) -> Self::StateCalculation
    where
        Self::Register: 'a,
        It: IntoIterator<Item = (&'a Self::Register, usize)>;
}

fn split_helper<CB>(cb: &mut CB, r: CB::Register, mut acc: Vec<CB::Register>) -> Vec<CB::Register>
where
    CB: CircuitBuilder + ?Sized,
{
    match cb.split_register_relative(r, Some(0)) {
        SplitResult::SELECTED(r) => {
            acc.push(r);
            acc
        }
        SplitResult::SPLIT(r0, r) => {
            acc.push(r0);
            split_helper(cb, r, acc)
        }
        SplitResult::UNSELECTED(r) => {
            acc.push(r);
            acc
        }
    }
}

/// A Builder which can construct the Clifford elements used to move amplitude between registers.
pub trait CliffordBuilder<P: Precision>: CircuitBuilder {
    /// Make a circuit object representing the X gate on a single qubit.
    fn make_x(&self) -> Self::CircuitObject;

    /// Make a circuit object representing the H gate on a single qubit.
    fn make_h(&self) -> Self::CircuitObject;

    /// Make a circuit object exchanging the states of two qubits.
    fn make_swap(&self) -> Self::CircuitObject;

    /// Create and apply an X (or NOT) gate circuit object, broadcast over each qubit of `r`.
    fn x(&mut self, r: Self::Register) -> CircuitResult<Self::Register> {
        let co = self.make_x();
        self.apply_circuit_object(r, co)
    }

    /// Create and apply an H gate circuit object, broadcast over each qubit of `r`.
    fn h(&mut self, r: Self::Register) -> CircuitResult<Self::Register> {
        let co = self.make_h();
        self.apply_circuit_object(r, co)
    }

    /// Swap qubit `i` of `ra` with qubit `i` of `rb` for every `i`. The registers must have
    /// equal sizes.
    fn swap(
        &mut self,
        ra: Self::Register,
        rb: Self::Register,
    ) -> CircuitResult<(Self::Register, Self::Register)> {
        if ra.n() != rb.n() {
            return Err(CircuitError::RegisterSizeMismatch(ra.n(), rb.n()));
        }
        let ras = self.split_all_register(ra);
        let rbs = self.split_all_register(rb);
        let (ras, rbs) = ras.into_iter().zip(rbs).try_fold(
            (vec![], vec![]),
            |(mut ras, mut rbs), (ra, rb)| -> CircuitResult<_> {
                let r = self.merge_two_registers(ra, rb);
                let co = self.make_swap();
                let r = self.apply_circuit_object(r, co)?;
                match self.split_register_relative(r, [0]) {
                    SplitResult::SPLIT(ra, rb) => {
                        ras.push(ra);
                        rbs.push(rb);
                        Ok((ras, rbs))
                    }
                    _ => Err(CircuitError::new("Swap pair did not split into two qubits")),
                }
            },
        )?;
        let ra = self.merge_registers(ras);
        let rb = self.merge_registers(rbs);
        ra.zip(rb)
            .ok_or_else(|| CircuitError::new("Swap requires at least one qubit per register"))
    }
}

/// A Builder which can construct rotations around the y axis.
pub trait RotationsBuilder<P: Precision>: CircuitBuilder {
    /// Make a circuit object rotating a single qubit by `theta` around y.
    /// `ry(theta)|0> = cos(theta/2)|0> + sin(theta/2)|1>`
    fn make_ry(&self, theta: P) -> Self::CircuitObject;

    /// Rotate around y, broadcast over each qubit of `r`.
    fn ry(&mut self, r: Self::Register, theta: P) -> CircuitResult<Self::Register> {
        let co = self.make_ry(theta);
        self.apply_circuit_object(r, co)
    }
}

/// A Builder which can construct temporary qudits.
pub trait TemporaryRegisterBuilder: CircuitBuilder {
    /// Make a temporary qubit, initialized to zero.
    fn make_zeroed_temp_qubit(&mut self) -> Self::Register;
    /// Make a register of multiple qubits, initialized to zero.
    fn make_zeroed_temp_register(&mut self, n: NonZeroUsize) -> Self::Register {
        let first = self.make_zeroed_temp_qubit();
        (1..n.get()).fold(first, |acc, _| {
            let q = self.make_zeroed_temp_qubit();
            self.merge_two_registers(acc, q)
        })
    }
    /// Return a register which has been reset to zero.
    fn return_zeroed_temp_register(&mut self, r: Self::Register);
}

/// A builder that can take destructive measurements.
pub trait MeasurementBuilder: CircuitBuilder {
    /// Handle which points to measurements.
    type MeasurementHandle;
    /// Take a measurement of `r`, return `r` and a handle to fetch the result later.
    fn measure(&mut self, r: Self::Register) -> (Self::Register, Self::MeasurementHandle);
}

/// A builder that can take nondestructive measurements.
pub trait StochasticMeasurementBuilder: CircuitBuilder {
    /// Handle which points to measurements.
    type StochasticMeasurementHandle;
    /// Take a measurement of `r`, return `r` and a handle to fetch the result later.
    fn measure_stochastic(
        &mut self,
        r: Self::Register,
    ) -> (Self::Register, Self::StochasticMeasurementHandle);
}

/// A builder which can export its circuit for use later, and can apply a circuit to itself.
pub trait Subcircuitable: CircuitBuilder {
    /// The export type for the circuit.
    type Subcircuit: Clone;

    /// Export the circuit as a subcircuit if able.
    fn make_subcircuit(&self) -> CircuitResult<Self::Subcircuit>;
    /// Append the subcircuit to the register `r`.
    fn apply_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        r: Self::Register,
    ) -> CircuitResult<Self::Register>;
}
