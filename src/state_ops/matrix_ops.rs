//! Contains functions, structs, and enums for storing and manipulating the quantum state.
use crate::errors::{CircuitError, CircuitResult};
use crate::iter_mut;
use crate::types::ControlValues;
use crate::utils::*;
use crate::{Complex, Precision};
use num_traits::{One, Zero};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Ops which can be applied to quantum states.
#[derive(Clone, Debug)]
pub enum MatrixOp<P> {
    /// Indices, Matrix data (row major, first index is the most significant bit).
    Matrix(Vec<usize>, Vec<P>),
    /// Number of A indices, then A indices followed by as many B indices.
    Swap(usize, Vec<usize>),
    /// Control indices, the values they must hold, and the op applied when they do.
    Control(Vec<usize>, ControlValues, Box<MatrixOp<P>>),
}

impl<P> MatrixOp<P> {
    /// Get the indices acted on by this op, controls first.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            MatrixOp::Matrix(indices, _) => indices.clone(),
            MatrixOp::Swap(_, indices) => indices.clone(),
            MatrixOp::Control(c_indices, _, op) => {
                let mut indices = c_indices.clone();
                indices.extend(op.indices());
                indices
            }
        }
    }
}

/// Make a Matrix MatrixOp
pub fn make_matrix_op<P>(indices: Vec<usize>, dat: Vec<P>) -> CircuitResult<MatrixOp<P>> {
    let n = indices.len();
    let expected_mat_size = 1 << (2 * n);
    if indices.is_empty() {
        Err(CircuitError::new("Must supply at least one op index"))
    } else if dat.len() != expected_mat_size {
        let message = format!(
            "Matrix data has {:?} entries versus expected 2^2*{:?}",
            dat.len(),
            n
        );
        Err(CircuitError::new(message))
    } else {
        Ok(MatrixOp::Matrix(indices, dat))
    }
}

/// Make a Swap MatrixOp
pub fn make_swap_op<P>(a_indices: Vec<usize>, b_indices: Vec<usize>) -> CircuitResult<MatrixOp<P>> {
    if a_indices.is_empty() || b_indices.is_empty() {
        Err(CircuitError::new("Need at least 1 swap index for a and b"))
    } else if a_indices.len() != b_indices.len() {
        Err(CircuitError::RegisterSizeMismatch(
            a_indices.len(),
            b_indices.len(),
        ))
    } else {
        let n = a_indices.len();
        let mut indices = a_indices;
        indices.extend(b_indices);
        Ok(MatrixOp::Swap(n, indices))
    }
}

/// Make a Control MatrixOp, nested controls are flattened into one.
pub fn make_control_op<P>(
    mut c_indices: Vec<usize>,
    mut values: ControlValues,
    op: MatrixOp<P>,
) -> CircuitResult<MatrixOp<P>> {
    if c_indices.is_empty() {
        Err(CircuitError::new("Must supply at least one control index"))
    } else if c_indices.len() != values.len() {
        let message = format!(
            "Found {:?} control indices but {:?} control values",
            c_indices.len(),
            values.len()
        );
        Err(CircuitError::new(message))
    } else {
        match op {
            MatrixOp::Control(oc_indices, oc_values, op) => {
                c_indices.extend(oc_indices);
                values.extend(oc_values);
                Ok(MatrixOp::Control(c_indices, values, op))
            }
            op => Ok(MatrixOp::Control(c_indices, values, Box::new(op))),
        }
    }
}

/// Apply `op` to the `input`, storing the results in `output`.
pub fn apply_op<P: Precision>(
    n: usize,
    op: &MatrixOp<Complex<P>>,
    input: &[Complex<P>],
    output: &mut [Complex<P>],
) {
    iter_mut!(output)
        .enumerate()
        .for_each(|(row, out)| *out = op_row(n, op, input, row));
}

/// Value of `row` of the output of `op` applied to `input`.
fn op_row<P: Precision>(
    n: usize,
    op: &MatrixOp<Complex<P>>,
    input: &[Complex<P>],
    row: usize,
) -> Complex<P> {
    match op {
        MatrixOp::Matrix(indices, data) => {
            let nindices = indices.len();
            let matrow = full_to_sub(n, indices, row);
            (0..1usize << nindices)
                .map(|col| {
                    let val = data[get_flat_index(nindices, matrow, col)];
                    if val.is_zero() {
                        Complex::zero()
                    } else {
                        val * input[sub_to_full(n, indices, col, row)]
                    }
                })
                .sum()
        }
        MatrixOp::Swap(na, indices) => {
            let (a_indices, b_indices) = indices.split_at(*na);
            let a_val = full_to_sub(n, a_indices, row);
            let b_val = full_to_sub(n, b_indices, row);
            let col = sub_to_full(n, a_indices, b_val, row);
            let col = sub_to_full(n, b_indices, a_val, col);
            input[col]
        }
        MatrixOp::Control(c_indices, values, op) => {
            let selected = c_indices
                .iter()
                .zip(values.iter())
                .all(|(indx, value)| get_bit(row, n - 1 - indx) == *value);
            if selected {
                op_row(n, op, input, row)
            } else {
                input[row]
            }
        }
    }
}

/// Make a vector of complex numbers whose reals are given by `data`
pub fn from_reals<P: Precision>(data: &[P]) -> Vec<Complex<P>> {
    data.iter()
        .map(|x| Complex::<P> {
            re: *x,
            im: P::zero(),
        })
        .collect()
}

/// Make the full op matrix from `op`, one output column per input basis state.
/// Not very efficient, use only for debugging.
pub fn make_op_matrix<P: Precision>(n: usize, op: &MatrixOp<Complex<P>>) -> Vec<Vec<Complex<P>>> {
    (0..1 << n)
        .map(|i| {
            let mut input = vec![Complex::zero(); 1 << n];
            let mut output = input.clone();
            input[i] = Complex::one();
            apply_op(n, op, &input, &mut output);
            output
        })
        .collect()
}

#[cfg(test)]
mod state_ops_tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_apply_identity() {
        let op = MatrixOp::Matrix(vec![0], from_reals(&[1.0, 0.0, 0.0, 1.0]));
        let input = from_reals(&[1.0, 0.0]);
        let mut output = from_reals(&[0.0, 0.0]);
        apply_op(1, &op, &input, &mut output);

        assert_eq!(input, output);
    }

    #[test]
    fn test_apply_not_first() {
        let op = MatrixOp::Matrix(vec![0], from_reals(&[0.0, 1.0, 1.0, 0.0]));

        let input = from_reals(&[1.0, 0.0, 0.0, 0.0]);
        let mut output = from_reals(&[0.0, 0.0, 0.0, 0.0]);
        apply_op(2, &op, &input, &mut output);
        assert_eq!(output, from_reals(&[0.0, 0.0, 1.0, 0.0]));

        let op = MatrixOp::Matrix(vec![1], from_reals(&[0.0, 1.0, 1.0, 0.0]));
        apply_op(2, &op, &input, &mut output);
        assert_eq!(output, from_reals(&[0.0, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_apply_swap() {
        // |10 01> -> |01 10>
        let op = make_swap_op(vec![0, 1], vec![2, 3]).unwrap();
        let mut input = vec![Complex::<f64>::zero(); 16];
        input[0b1001] = Complex::one();
        let mut output = input.clone();
        apply_op(4, &op, &input, &mut output);
        assert_eq!(output[0b0110], Complex::one());
        assert_eq!(output[0b1001], Complex::zero());
    }

    #[test]
    fn test_control_on_zero() {
        // Flip qubit 1 only when qubit 0 is |0>.
        let x = MatrixOp::Matrix(vec![1], from_reals(&[0.0, 1.0, 1.0, 0.0]));
        let op = make_control_op(vec![0], smallvec![false], x).unwrap();
        let mat = make_op_matrix::<f64>(2, &op);
        assert_eq!(mat[0b00][0b01], Complex::one());
        assert_eq!(mat[0b10][0b10], Complex::one());
        assert_eq!(mat[0b11][0b11], Complex::one());
    }

    #[test]
    fn test_nested_control_flattens() {
        let x = MatrixOp::Matrix(vec![2], from_reals(&[0.0, 1.0, 1.0, 0.0]));
        let inner = make_control_op(vec![1], smallvec![true], x).unwrap();
        let op = make_control_op(vec![0], smallvec![false], inner).unwrap();
        match &op {
            MatrixOp::Control(c, v, _) => {
                assert_eq!(c, &vec![0, 1]);
                assert_eq!(v.as_slice(), &[false, true]);
            }
            _ => panic!("expected control op"),
        }
        assert_eq!(op.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_make_matrix_op_size() {
        assert!(make_matrix_op(vec![0], from_reals(&[1.0, 0.0, 0.0])).is_err());
        assert!(make_matrix_op::<Complex<f64>>(vec![], vec![]).is_err());
    }

    #[test]
    fn test_swap_size_mismatch() {
        let res = make_swap_op::<Complex<f64>>(vec![0], vec![1, 2]);
        assert!(matches!(res, Err(CircuitError::RegisterSizeMismatch(1, 2))));
    }
}
