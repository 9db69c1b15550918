use crate::builder_traits::*;
use crate::errors::{CircuitError, CircuitResult};
use crate::inverter::{Invertable, RecursiveCircuitBuilder};
use crate::types::{ControlValues, Precision};
use crate::utils::value_bits;
use smallvec::smallvec;
use std::num::NonZeroUsize;

/// A CircuitBuilder is conditionable if it can condition all unitaries on the value held by a
/// given register.
pub trait Conditionable: CircuitBuilder {
    /// Attempt to condition a circuit object `co` applied to `r` with the register `cr`, which
    /// must hold `values` (one per qubit of `cr`) for `co` to act.
    fn try_apply_with_condition(
        &mut self,
        cr: Self::Register,
        values: ControlValues,
        r: Self::Register,
        co: Self::CircuitObject,
    ) -> CircuitResult<(Self::Register, Self::Register)>;

    /// Construct a new circuitbuilder which conditions all unitaries on every qubit of `cr`
    /// being |1>.
    fn condition_with(&mut self, cr: Self::Register) -> Conditioned<Self> {
        let values = smallvec![true; cr.n()];
        Conditioned::new(self, cr, values)
    }

    /// Construct a new circuitbuilder which conditions all unitaries on `cr` holding `value`,
    /// read with the first qubit of `cr` as the most significant bit.
    ///
    /// # Example
    /// ```
    /// use qwalk::prelude::*;
    /// # fn main() -> Result<(), CircuitError> {
    /// let mut b = LocalBuilder::<f64>::default();
    /// let cr = b.qudit(2).unwrap();
    /// let r = b.qubit();
    /// let mut c = b.condition_on_value(cr, 0b10)?;
    /// let r = c.x(r)?;
    /// let cr = c.dissolve()?;
    ///
    /// let (state, _) = b.calculate_state_with_init([(&cr, 0b10), (&r, 0)])?;
    /// assert_eq!(state[0b101].re, 1.0);
    /// # Ok(())
    /// # }
    /// ```
    fn condition_on_value(
        &mut self,
        cr: Self::Register,
        value: usize,
    ) -> CircuitResult<Conditioned<Self>> {
        let qubits = cr.n();
        if qubits < usize::BITS as usize && value >> qubits != 0 {
            return Err(CircuitError::ValueOutOfRange { value, qubits });
        }
        let values = value_bits(qubits, value).into_iter().collect();
        self.condition_with_values(cr, values)
    }

    /// Construct a new circuitbuilder which conditions all unitaries on each qubit of `cr`
    /// holding the matching entry of `values`.
    fn condition_with_values(
        &mut self,
        cr: Self::Register,
        values: ControlValues,
    ) -> CircuitResult<Conditioned<Self>> {
        if cr.n() != values.len() {
            return Err(CircuitError::new(format!(
                "Conditioning register has {} qubits but {} values",
                cr.n(),
                values.len()
            )));
        }
        Ok(Conditioned::new(self, cr, values))
    }
}

/// A CircuitBuilder which conditions all unitaries with a given register.
#[derive(Debug)]
pub struct Conditioned<'a, CB: Conditionable + ?Sized> {
    parent: &'a mut CB,
    cr: Option<CB::Register>,
    values: ControlValues,
}

impl<'a, CB: Conditionable + ?Sized> Conditioned<'a, CB> {
    fn new(cb: &'a mut CB, cr: CB::Register, values: ControlValues) -> Self {
        Self {
            parent: cb,
            cr: Some(cr),
            values,
        }
    }

    /// The values the conditioning register must hold.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Dissolve the Conditioned circuit builder and retrieve the conditioning register.
    pub fn dissolve(mut self) -> CircuitResult<CB::Register> {
        self.take_cr()
    }

    fn take_cr(&mut self) -> CircuitResult<CB::Register> {
        self.cr
            .take()
            .ok_or_else(|| CircuitError::new("Conditioning register was lost by a failed apply"))
    }

    fn split_off_condition(
        &mut self,
        cr: CB::Register,
        ncr: usize,
    ) -> CircuitResult<(CB::Register, CB::Register)> {
        match self.parent.split_register_relative(cr, 0..ncr) {
            SplitResult::SPLIT(cr, ccr) => Ok((cr, ccr)),
            _ => Err(CircuitError::new(
                "Merged conditioning register did not split back in two",
            )),
        }
    }
}

impl<'a, CB: Conditionable + ?Sized> CircuitBuilder for Conditioned<'a, CB> {
    type Register = CB::Register;
    type CircuitObject = CB::CircuitObject;
    type StateCalculation = CB::StateCalculation;

    fn n(&self) -> usize {
        self.parent.n()
    }

    fn register(&mut self, n: NonZeroUsize) -> Self::Register {
        self.parent.register(n)
    }

    fn merge_two_registers(&mut self, r1: Self::Register, r2: Self::Register) -> Self::Register {
        self.parent.merge_two_registers(r1, r2)
    }

    fn split_register_relative<It>(
        &mut self,
        r: Self::Register,
        indices: It,
    ) -> SplitResult<Self::Register>
    where
        It: IntoIterator<Item = usize>,
    {
        self.parent.split_register_relative(r, indices)
    }

    fn apply_circuit_object(
        &mut self,
        r: Self::Register,
        c: Self::CircuitObject,
    ) -> CircuitResult<Self::Register> {
        let cr = self.take_cr()?;
        let (cr, r) = self
            .parent
            .try_apply_with_condition(cr, self.values.clone(), r, c)?;
        self.cr = Some(cr);
        Ok(r)
    }

    fn calculate_state_with_init<'b, It>(&mut self, it: It) -> Self::StateCalculation
    where
        Self::Register: 'b,
        It: IntoIterator<Item = (&'b Self::Register, usize)>,
    {
        self.parent.calculate_state_with_init(it)
    }
}

impl<'a, P: Precision, CB: Conditionable + CliffordBuilder<P> + ?Sized> CliffordBuilder<P>
    for Conditioned<'a, CB>
{
    fn make_x(&self) -> Self::CircuitObject {
        self.parent.make_x()
    }
    fn make_h(&self) -> Self::CircuitObject {
        self.parent.make_h()
    }
    fn make_swap(&self) -> Self::CircuitObject {
        self.parent.make_swap()
    }
}

impl<'a, P: Precision, CB: Conditionable + RotationsBuilder<P> + ?Sized> RotationsBuilder<P>
    for Conditioned<'a, CB>
{
    fn make_ry(&self, theta: P) -> Self::CircuitObject {
        self.parent.make_ry(theta)
    }
}

impl<'a, CB: Conditionable + TemporaryRegisterBuilder + ?Sized> TemporaryRegisterBuilder
    for Conditioned<'a, CB>
{
    fn make_zeroed_temp_qubit(&mut self) -> Self::Register {
        self.parent.make_zeroed_temp_qubit()
    }

    fn return_zeroed_temp_register(&mut self, r: Self::Register) {
        self.parent.return_zeroed_temp_register(r)
    }
}

impl<'a, CB: Conditionable> Conditionable for Conditioned<'a, CB> {
    fn try_apply_with_condition(
        &mut self,
        cr: CB::Register,
        mut values: ControlValues,
        r: CB::Register,
        co: CB::CircuitObject,
    ) -> CircuitResult<(CB::Register, CB::Register)> {
        let ncr = cr.n();
        let ccr = self.take_cr()?;
        let cr = self.parent.merge_two_registers(cr, ccr);
        values.extend(self.values.iter().copied());
        let (cr, r) = self.parent.try_apply_with_condition(cr, values, r, co)?;
        let (cr, ccr) = self.split_off_condition(cr, ncr)?;
        self.cr = Some(ccr);
        Ok((cr, r))
    }
}

/// A ConditionableSubcircuit may apply an entire subcircuit under the condition of `cr`.
pub trait ConditionableSubcircuit: Subcircuitable {
    /// Apply `sc` to register `r` using condition `cr` holding `values`.
    fn apply_conditioned_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        cr: Self::Register,
        values: ControlValues,
        r: Self::Register,
    ) -> CircuitResult<(Self::Register, Self::Register)>;
}

impl<'a, CB: ConditionableSubcircuit + Conditionable> Subcircuitable for Conditioned<'a, CB> {
    type Subcircuit = CB::Subcircuit;

    fn make_subcircuit(&self) -> CircuitResult<Self::Subcircuit> {
        self.parent.make_subcircuit()
    }

    fn apply_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        r: Self::Register,
    ) -> CircuitResult<Self::Register> {
        let cr = self.take_cr()?;
        let (cr, r) = self
            .parent
            .apply_conditioned_subcircuit(sc, cr, self.values.clone(), r)?;
        self.cr = Some(cr);
        Ok(r)
    }
}

impl<'a, CB: Invertable + ConditionableSubcircuit + Conditionable> Invertable
    for Conditioned<'a, CB>
{
    type SimilarBuilder = CB::SimilarBuilder;

    fn new_similar(&self) -> Self::SimilarBuilder {
        self.parent.new_similar()
    }

    fn invert_subcircuit(sc: Self::Subcircuit) -> CircuitResult<Self::Subcircuit> {
        CB::invert_subcircuit(sc)
    }
}

impl<'a, CB: Invertable + ConditionableSubcircuit + Conditionable> ConditionableSubcircuit
    for Conditioned<'a, CB>
{
    fn apply_conditioned_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        cr: Self::Register,
        mut values: ControlValues,
        r: Self::Register,
    ) -> CircuitResult<(Self::Register, Self::Register)> {
        let ncr = cr.n();
        let ccr = self.take_cr()?;
        let cr = self.parent.merge_two_registers(cr, ccr);
        values.extend(self.values.iter().copied());
        let (cr, r) = self
            .parent
            .apply_conditioned_subcircuit(sc, cr, values, r)?;
        let (cr, ccr) = self.split_off_condition(cr, ncr)?;
        self.cr = Some(ccr);
        Ok((cr, r))
    }
}

impl<'a, P: Precision, CB: RecursiveCircuitBuilder<P>> RecursiveCircuitBuilder<P>
    for Conditioned<'a, CB>
where
    <CB as Invertable>::SimilarBuilder: RecursiveCircuitBuilder<P>,
{
    type RecursiveSimilarBuilder = Self::SimilarBuilder;
}

#[cfg(test)]
mod conditioning_tests {
    use crate::prelude::*;

    #[test]
    fn test_condition_on_value_out_of_range() {
        let mut b = LocalBuilder::<f64>::default();
        let cr = b.qudit(2).unwrap();
        let res = b.condition_on_value(cr, 4);
        assert!(matches!(
            res,
            Err(CircuitError::ValueOutOfRange {
                value: 4,
                qubits: 2
            })
        ));
    }

    #[test]
    fn test_nested_conditions_merge() -> Result<(), CircuitError> {
        let mut b = LocalBuilder::<f64>::default();
        let ca = b.qubit();
        let cb = b.qubit();
        let r = b.qubit();

        let mut outer = b.condition_on_value(ca, 0)?;
        let mut inner = outer.condition_with(cb);
        let r = inner.x(r)?;
        let cb = inner.dissolve()?;
        let ca = outer.dissolve()?;

        let sc = b.make_subcircuit()?;
        assert_eq!(sc.len(), 1);
        assert_eq!(sc[0].0, vec![1, 0, 2]);
        assert_eq!(sc[0].1.controls(), &[true, false]);

        let (state, _) = b.calculate_state_with_init([(&ca, 0), (&cb, 1), (&r, 0)])?;
        assert_eq!(state[0b011].re, 1.0);
        let (state, _) = b.calculate_state_with_init([(&ca, 1), (&cb, 1), (&r, 0)])?;
        assert_eq!(state[0b110].re, 1.0);
        Ok(())
    }
}
