use num_traits::{Float, NumAssign};
use smallvec::SmallVec;
use std::fmt::{Debug, Display};
use std::iter::{Product, Sum};

/// The float precision of the circuit.
pub trait Precision:
    Default + NumAssign + Float + Sum + Send + Sync + Display + Product + Debug
{
}

impl Precision for f64 {}

impl Precision for f32 {}

/// Values required of control qubits, in the same order as the control indices.
/// `true` selects |1>, `false` selects |0>.
pub type ControlValues = SmallVec<[bool; 8]>;
