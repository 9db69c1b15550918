use std::num::NonZeroUsize;

use num_traits::{One, Zero};

use crate::builder_traits::*;
use crate::conditioning::{Conditionable, ConditionableSubcircuit};
use crate::errors::{CircuitError, CircuitResult};
use crate::inverter::{Invertable, RecursiveCircuitBuilder};
use crate::state_ops::matrix_ops::{
    apply_op, make_control_op, make_matrix_op, make_swap_op, MatrixOp,
};
use crate::state_ops::measurement_ops::{measure, measure_probs};
use crate::types::{ControlValues, Precision};
use crate::utils::basis_index;
use crate::Complex;

/// Widest circuit `calculate_state` will simulate. The state and its scratch copy take
/// `2^(n + 5)` bytes at f64 precision.
pub const MAX_SIMULATED_QUBITS: usize = 26;

/// A local circuit builder for constructing circuits out of standard gates.
/// Conditioned gates are stored natively with the values their controls must hold, and the
/// circuit is simulated on a dense state vector.
#[derive(Default, Debug)]
pub struct LocalBuilder<P: Precision> {
    pipeline: Vec<(Vec<usize>, BuilderCircuitObject<P>)>,
    n: usize,
    zeroed_qubits: Vec<Qudit>,
    measurements: usize,
}

/// Size and shape of a built circuit.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitSummary {
    /// Number of qubits, temporaries included.
    pub qubits: usize,
    /// Number of operations in the pipeline.
    pub operations: usize,
    /// Number of operations which carry at least one control.
    pub controlled_operations: usize,
    /// Largest number of controls on a single operation.
    pub max_controls: usize,
}

impl<P: Precision> LocalBuilder<P> {
    /// Returns the depth of the current circuit (pipeline).
    pub fn pipeline_depth(&self) -> usize {
        self.pipeline.len()
    }

    /// The operations applied so far, each with the qubits it acts on (controls first).
    pub fn pipeline(&self) -> &[(Vec<usize>, BuilderCircuitObject<P>)] {
        &self.pipeline
    }

    /// Summarize the size of the current circuit.
    pub fn summary(&self) -> CircuitSummary {
        self.pipeline.iter().fold(
            CircuitSummary {
                qubits: self.n,
                ..Default::default()
            },
            |mut acc, (_, co)| {
                acc.operations += 1;
                if !co.controls.is_empty() {
                    acc.controlled_operations += 1;
                }
                acc.max_controls = acc.max_controls.max(co.controls.len());
                acc
            },
        )
    }
}

/// The register implementation for the LocalBuilder.
#[derive(Debug)]
pub struct Qudit {
    indices: Vec<usize>,
}

impl QubitRegister for Qudit {
    fn n(&self) -> usize {
        self.indices.len()
    }

    fn indices(&self) -> &[usize] {
        self.indices.as_ref()
    }
}

impl Qudit {
    fn new_from_iter<It>(indices: It) -> Option<Self>
    where
        It: Iterator<Item = usize>,
    {
        let indices = indices.collect::<Vec<_>>();
        if indices.is_empty() {
            None
        } else {
            Some(Self { indices })
        }
    }
}

/// A pipeline object for the LocalBuilder.
#[derive(Debug, Clone)]
pub struct BuilderCircuitObject<P: Precision> {
    n: usize,
    controls: ControlValues,
    object: BuilderCircuitObjectType<P>,
}

impl<P: Precision> BuilderCircuitObject<P> {
    /// Number of target qubits.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Values required of the control qubits, which precede the targets in the pipeline indices.
    pub fn controls(&self) -> &[bool] {
        &self.controls
    }

    /// The operation applied to the targets.
    pub fn object(&self) -> &BuilderCircuitObjectType<P> {
        &self.object
    }

    fn unitary(n: usize, object: UnitaryMatrixObject<P>) -> Self {
        Self {
            n,
            controls: ControlValues::new(),
            object: BuilderCircuitObjectType::Unitary(object),
        }
    }
}

/// The type of pipeline object for LocalBuilder.
#[derive(Debug, Clone)]
pub enum BuilderCircuitObjectType<P: Precision> {
    /// A unitary operation on the circuit.
    Unitary(UnitaryMatrixObject<P>),
    /// A measurement operation on the circuit.
    Measurement(MeasurementObject),
}

/// The type of unitary matrix for LocalBuilder.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitaryMatrixObject<P: Precision> {
    /// A pauli X gate.
    X,
    /// A hadamard gate.
    H,
    /// A swap gate between two qubits.
    SWAP,
    /// A rotation around the y axis.
    Ry(P),
}

/// The type of measurement for LocalBuilder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementObject {
    /// A destructive measurement.
    Measurement,
    /// A nondestructive measurement.
    StochasticMeasurement,
}

/// The results of measurements in a circuit.
#[derive(Debug)]
pub struct Measurements<P: Precision> {
    measurements: Vec<MeasurementResults<P>>,
}

#[derive(Debug)]
enum MeasurementResults<P: Precision> {
    Single(usize, P),
    Stochastic(Vec<P>),
}

impl<P: Precision> Measurements<P> {
    /// Get a measurement result given a handle.
    pub fn get_measurement(&self, handle: MeasurementHandle) -> Option<(usize, P)> {
        match self.measurements.get(handle.id)? {
            MeasurementResults::Single(val, prob) => Some((*val, *prob)),
            MeasurementResults::Stochastic(_) => None,
        }
    }
    /// Get a stochastic measurement result given a handle, indexed by the measured value.
    pub fn get_stochastic_measurement(&self, handle: StochasticMeasurementHandle) -> Option<&[P]> {
        match self.measurements.get(handle.id)? {
            MeasurementResults::Single(_, _) => None,
            MeasurementResults::Stochastic(probs) => Some(probs.as_slice()),
        }
    }
}

fn unitary_op<P: Precision>(
    indices: &[usize],
    co: &BuilderCircuitObject<P>,
    object: &UnitaryMatrixObject<P>,
) -> CircuitResult<MatrixOp<Complex<P>>> {
    let nc = co.controls.len();
    let targets = indices[nc..].to_vec();
    let l = Complex::one();
    let o = Complex::zero();
    let op = match object {
        UnitaryMatrixObject::X => make_matrix_op(targets, vec![o, l, l, o]),
        UnitaryMatrixObject::H => {
            let nl = Complex::one() * (P::one() / (P::one() + P::one()).sqrt());
            make_matrix_op(targets, vec![nl, nl, nl, -nl])
        }
        UnitaryMatrixObject::SWAP => {
            let x = targets.len() / 2;
            let b_indices = targets[x..].to_vec();
            let mut a_indices = targets;
            a_indices.truncate(x);
            make_swap_op(a_indices, b_indices)
        }
        UnitaryMatrixObject::Ry(theta) => {
            let h_theta = *theta / (P::one() + P::one());
            let (s, c) = h_theta.sin_cos();
            let c = Complex::new(c, P::zero());
            let s = Complex::new(s, P::zero());
            make_matrix_op(targets, vec![c, -s, s, c])
        }
    }?;
    if nc == 0 {
        Ok(op)
    } else {
        make_control_op(indices[..nc].to_vec(), co.controls.clone(), op)
    }
}

impl<P: Precision> CircuitBuilder for LocalBuilder<P> {
    type Register = Qudit;
    type CircuitObject = BuilderCircuitObject<P>;
    type StateCalculation = CircuitResult<(Vec<Complex<P>>, Measurements<P>)>;

    fn n(&self) -> usize {
        self.n
    }

    fn register(&mut self, n: NonZeroUsize) -> Self::Register {
        let n: usize = n.into();
        let r = Qudit {
            indices: (self.n..self.n + n).collect(),
        };
        self.n += n;
        r
    }

    fn merge_two_registers(&mut self, r1: Self::Register, r2: Self::Register) -> Self::Register {
        let mut indices = r1.indices;
        indices.extend(r2.indices);
        Qudit { indices }
    }

    fn split_register_relative<It>(
        &mut self,
        r: Self::Register,
        indices: It,
    ) -> SplitResult<Self::Register>
    where
        It: IntoIterator<Item = usize>,
    {
        let selected_indices = indices
            .into_iter()
            .filter_map(|i| r.indices.get(i).copied());
        let r1 = Qudit::new_from_iter(selected_indices);

        let remaining_indices = r.indices.into_iter().filter(|oi| match &r1 {
            Some(r1) => !r1.indices.contains(oi),
            None => true,
        });
        let r2 = Qudit::new_from_iter(remaining_indices);

        match (r1, r2) {
            (Some(r1), None) => SplitResult::SELECTED(r1),
            (None, Some(r2)) => SplitResult::UNSELECTED(r2),
            (Some(r1), Some(r2)) => SplitResult::SPLIT(r1, r2),
            (None, None) => unreachable!(),
        }
    }

    fn apply_circuit_object(
        &mut self,
        r: Self::Register,
        c: Self::CircuitObject,
    ) -> CircuitResult<Self::Register> {
        let width = c.controls.len() + c.n;
        if c.controls.is_empty() && c.n == 1 && r.n() > 1 {
            // Do broadcasting
            self.pipeline.extend(
                r.indices
                    .iter()
                    .map(|index| (vec![*index], c.clone())),
            );
            Ok(r)
        } else if r.n() == width {
            self.pipeline.push((r.indices.clone(), c));
            Ok(r)
        } else {
            Err(CircuitError::new(format!(
                "Circuit object acts on {} qubits and cannot be applied to a register of {}",
                width,
                r.n()
            )))
        }
    }

    fn calculate_state_with_init<'a, It>(&mut self, it: It) -> Self::StateCalculation
    where
        Self::Register: 'a,
        It: IntoIterator<Item = (&'a Self::Register, usize)>,
    {
        let n = self.n();
        if n > MAX_SIMULATED_QUBITS {
            return Err(CircuitError::TooManyQubits {
                qubits: n,
                max: MAX_SIMULATED_QUBITS,
            });
        }
        let mut initial_index = 0;
        for (r, x) in it {
            if r.n() < usize::BITS as usize && x >> r.n() != 0 {
                return Err(CircuitError::ValueOutOfRange {
                    value: x,
                    qubits: r.n(),
                });
            }
            initial_index |= basis_index(n, [(r.indices(), x)]);
        }

        let mut state = vec![Complex::zero(); 1 << n];
        let arena = state.clone();
        state[initial_index] = Complex::one();

        let (state, _, measurements) = self.pipeline.iter().try_fold(
            (state, arena, vec![]),
            |(state, mut arena, mut measurements), (indices, co)| -> CircuitResult<_> {
                match &co.object {
                    BuilderCircuitObjectType::Unitary(object) => {
                        let uop = unitary_op(indices, co, object)?;
                        apply_op(n, &uop, &state, &mut arena);
                    }
                    BuilderCircuitObjectType::Measurement(object) => match object {
                        MeasurementObject::Measurement => {
                            let (measured, p) = measure(n, indices, &state, &mut arena);
                            measurements.push(MeasurementResults::Single(measured, p));
                        }
                        MeasurementObject::StochasticMeasurement => {
                            let ps = measure_probs(n, indices, &state);
                            measurements.push(MeasurementResults::Stochastic(ps));
                            arena.copy_from_slice(&state);
                        }
                    },
                }
                Ok((arena, state, measurements))
            },
        )?;
        Ok((state, Measurements { measurements }))
    }
}

impl<P: Precision> CliffordBuilder<P> for LocalBuilder<P> {
    fn make_x(&self) -> Self::CircuitObject {
        BuilderCircuitObject::unitary(1, UnitaryMatrixObject::X)
    }
    fn make_h(&self) -> Self::CircuitObject {
        BuilderCircuitObject::unitary(1, UnitaryMatrixObject::H)
    }
    fn make_swap(&self) -> Self::CircuitObject {
        BuilderCircuitObject::unitary(2, UnitaryMatrixObject::SWAP)
    }
}

impl<P: Precision> RotationsBuilder<P> for LocalBuilder<P> {
    fn make_ry(&self, theta: P) -> Self::CircuitObject {
        BuilderCircuitObject::unitary(1, UnitaryMatrixObject::Ry(theta))
    }
}

impl<P: Precision> TemporaryRegisterBuilder for LocalBuilder<P> {
    fn make_zeroed_temp_qubit(&mut self) -> Self::Register {
        if let Some(r) = self.zeroed_qubits.pop() {
            r
        } else {
            self.qubit()
        }
    }

    fn return_zeroed_temp_register(&mut self, r: Self::Register) {
        let rs = self.split_all_register(r);
        self.zeroed_qubits.extend(rs);
    }
}

/// A handle which points to a measurement result.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementHandle {
    id: usize,
}

impl<P: Precision> MeasurementBuilder for LocalBuilder<P> {
    type MeasurementHandle = MeasurementHandle;

    fn measure(&mut self, r: Self::Register) -> (Self::Register, Self::MeasurementHandle) {
        let obj = BuilderCircuitObject {
            n: r.n(),
            controls: ControlValues::new(),
            object: BuilderCircuitObjectType::Measurement(MeasurementObject::Measurement),
        };
        self.pipeline.push((r.indices.clone(), obj));
        let m = self.measurements;
        self.measurements += 1;
        (r, Self::MeasurementHandle { id: m })
    }
}

/// A handle which points to a stochastic measurement result.
#[derive(Debug, Clone, Copy)]
pub struct StochasticMeasurementHandle {
    id: usize,
}

impl<P: Precision> StochasticMeasurementBuilder for LocalBuilder<P> {
    type StochasticMeasurementHandle = StochasticMeasurementHandle;

    fn measure_stochastic(
        &mut self,
        r: Self::Register,
    ) -> (Self::Register, Self::StochasticMeasurementHandle) {
        let obj = BuilderCircuitObject {
            n: r.n(),
            controls: ControlValues::new(),
            object: BuilderCircuitObjectType::Measurement(MeasurementObject::StochasticMeasurement),
        };
        self.pipeline.push((r.indices.clone(), obj));
        let m = self.measurements;
        self.measurements += 1;
        (r, Self::StochasticMeasurementHandle { id: m })
    }
}

impl<P: Precision> Conditionable for LocalBuilder<P> {
    fn try_apply_with_condition(
        &mut self,
        cr: Self::Register,
        values: ControlValues,
        r: Self::Register,
        co: Self::CircuitObject,
    ) -> CircuitResult<(Self::Register, Self::Register)> {
        if let BuilderCircuitObjectType::Measurement(_) = co.object {
            return Err(CircuitError::new("Cannot condition measurements."));
        }
        if cr.n() != values.len() {
            return Err(CircuitError::new(format!(
                "Conditioning register has {} qubits but {} values",
                cr.n(),
                values.len()
            )));
        }
        if co.controls.is_empty() && co.n == 1 && r.n() > 1 {
            // Broadcast under the same condition.
            r.indices.iter().for_each(|index| {
                let mut indices = cr.indices.clone();
                indices.push(*index);
                let co = BuilderCircuitObject {
                    controls: values.clone(),
                    ..co.clone()
                };
                self.pipeline.push((indices, co));
            });
            return Ok((cr, r));
        }
        if r.n() != co.controls.len() + co.n {
            return Err(CircuitError::new(format!(
                "Circuit object acts on {} qubits and cannot be applied to a register of {}",
                co.controls.len() + co.n,
                r.n()
            )));
        }
        let mut indices = cr.indices.clone();
        indices.extend(r.indices.iter().copied());
        let mut controls = values;
        controls.extend(co.controls.iter().copied());
        self.pipeline.push((
            indices,
            BuilderCircuitObject {
                n: co.n,
                controls,
                object: co.object,
            },
        ));
        Ok((cr, r))
    }
}

fn split_vector_at<T>(mut v: Vec<T>, x: usize) -> (Vec<T>, Vec<T>) {
    let b = v.split_off(x.min(v.len()));
    (v, b)
}

impl<P: Precision> Subcircuitable for LocalBuilder<P> {
    type Subcircuit = Vec<(Vec<usize>, Self::CircuitObject)>;

    fn make_subcircuit(&self) -> CircuitResult<Self::Subcircuit> {
        Ok(self.pipeline.clone())
    }

    fn apply_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        r: Self::Register,
    ) -> CircuitResult<Self::Register> {
        apply_pipeline_objects(self, sc, r)
    }
}

impl<P: Precision> Invertable for LocalBuilder<P> {
    type SimilarBuilder = Self;

    fn new_similar(&self) -> Self {
        Self::default()
    }

    fn invert_subcircuit(sc: Self::Subcircuit) -> CircuitResult<Self::Subcircuit> {
        sc.into_iter()
            .rev()
            .map(|(indices, co)| -> CircuitResult<_> { Ok((indices, invert_circuit_object(co)?)) })
            .collect()
    }
}

impl<P: Precision> ConditionableSubcircuit for LocalBuilder<P> {
    fn apply_conditioned_subcircuit(
        &mut self,
        sc: Self::Subcircuit,
        cr: Self::Register,
        values: ControlValues,
        r: Self::Register,
    ) -> CircuitResult<(Self::Register, Self::Register)> {
        let mut cb = self.condition_with_values(cr, values)?;
        let r = apply_pipeline_objects(&mut cb, sc, r)?;
        let cr = cb.dissolve()?;
        Ok((cr, r))
    }
}

fn apply_pipeline_objects<CB, CO>(
    cb: &mut CB,
    sc: CB::Subcircuit,
    r: CB::Register,
) -> CircuitResult<CB::Register>
where
    CB: CircuitBuilder<CircuitObject = CO>
        + Subcircuitable<Subcircuit = Vec<(Vec<usize>, CO)>>
        + TemporaryRegisterBuilder,
{
    let rn = r.n();
    let mut rs = cb.split_all_register(r);
    let needed = sc
        .iter()
        .flat_map(|(indices, _)| indices.iter().max())
        .max()
        .map_or(0, |max_index| max_index + 1);
    // Need temp qubits for excess.
    if let Some(temp_n) = NonZeroUsize::new(needed.saturating_sub(rn)) {
        let temp = cb.make_zeroed_temp_register(temp_n);
        rs.extend(cb.split_all_register(temp));
    }
    let mut rs = rs.into_iter().map(Some).collect::<Vec<_>>();
    sc.into_iter().try_for_each(|(indices, co)| -> CircuitResult<()> {
        let sub_rs = indices
            .iter()
            .map(|index| rs[*index].take())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CircuitError::new("Subcircuit reuses a qubit within one operation"))?;
        let sub_r = cb
            .merge_registers(sub_rs)
            .ok_or_else(|| CircuitError::new("Subcircuit operation acts on no qubits"))?;
        let sub_r = cb.apply_circuit_object(sub_r, co)?;
        let sub_rs = cb.split_all_register(sub_r);
        indices
            .into_iter()
            .zip(sub_rs)
            .for_each(|(index, r)| rs[index] = Some(r));
        Ok(())
    })?;
    let rs = rs
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| CircuitError::new("Not all qubits returned"))?;
    let (rs, trs) = split_vector_at(rs, rn);
    if let Some(tr) = cb.merge_registers(trs) {
        cb.return_zeroed_temp_register(tr);
    }
    cb.merge_registers(rs)
        .ok_or_else(|| CircuitError::new("Subcircuit applied to an empty register"))
}

fn invert_circuit_object<P: Precision>(
    co: BuilderCircuitObject<P>,
) -> CircuitResult<BuilderCircuitObject<P>> {
    match co.object {
        BuilderCircuitObjectType::Unitary(u) => {
            let object = match u {
                UnitaryMatrixObject::X | UnitaryMatrixObject::H | UnitaryMatrixObject::SWAP => u,
                UnitaryMatrixObject::Ry(theta) => UnitaryMatrixObject::Ry(-theta),
            };
            Ok(BuilderCircuitObject {
                n: co.n,
                controls: co.controls,
                object: BuilderCircuitObjectType::Unitary(object),
            })
        }
        BuilderCircuitObjectType::Measurement(_) => {
            Err(CircuitError::new("Cannot invert measurement."))
        }
    }
}

impl<P: Precision> RecursiveCircuitBuilder<P> for LocalBuilder<P> {
    type RecursiveSimilarBuilder = Self::SimilarBuilder;
}
