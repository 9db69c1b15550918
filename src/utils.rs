/// Set the `bit_index` bit in `num` to `value`.
///
/// # Example
/// ```
/// use qwalk::utils::set_bit;
/// assert_eq!(set_bit(0, 1, true), 2);
/// assert_eq!(set_bit(1, 1, true), 3);
/// assert_eq!(set_bit(1, 0, false), 0);
/// ```
#[inline]
pub fn set_bit(num: usize, bit_index: usize, value: bool) -> usize {
    let v = 1 << bit_index;
    if value {
        num | v
    } else {
        num & !v
    }
}

/// Get the `bit_index` bit value from `num`.
///
/// # Example
/// ```
/// use qwalk::utils::get_bit;
/// assert!(get_bit(2, 1));
/// assert!(!get_bit(2, 0));
/// ```
#[inline]
pub fn get_bit(num: usize, bit_index: usize) -> bool {
    ((num >> bit_index) & 1) != 0
}

/// Get the index into an op matrix stored row major.
#[inline]
pub fn get_flat_index(nindices: usize, i: usize, j: usize) -> usize {
    let mat_side = 1 << nindices;
    (i * mat_side) + j
}

/// Get the index for a submatrix indexed by `indices` given the `full_index` for the larger
/// 2^n by 2^n matrix. The first of `indices` is the most significant bit of the result.
pub fn full_to_sub(n: usize, mat_indices: &[usize], full_index: usize) -> usize {
    let nindices = mat_indices.len();
    mat_indices
        .iter()
        .enumerate()
        .fold(0, |acc, (j, indx)| -> usize {
            let bit = get_bit(full_index, n - 1 - *indx);
            set_bit(acc, nindices - 1 - j, bit)
        })
}

/// Given the `sub_index` for the submatrix, and a base to overwrite values, get the full index
/// for the 2^n by 2^n matrix.
pub fn sub_to_full(n: usize, mat_indices: &[usize], sub_index: usize, base: usize) -> usize {
    let nindices = mat_indices.len();
    mat_indices.iter().enumerate().fold(base, |acc, (j, indx)| {
        let bit = get_bit(sub_index, nindices - 1 - j);
        set_bit(acc, n - 1 - *indx, bit)
    })
}

/// Bit values of `value` when loaded into a register of `n` qubits, first qubit first.
///
/// # Example
/// ```
/// use qwalk::utils::value_bits;
/// assert_eq!(value_bits(3, 0b110), vec![true, true, false]);
/// ```
pub fn value_bits(n: usize, value: usize) -> Vec<bool> {
    (0..n).map(|i| get_bit(value, n - 1 - i)).collect()
}

/// Index of the basis state of an `n` qubit circuit in which each register given by its qubit
/// indices holds the paired value. Unlisted qubits are |0>.
///
/// # Example
/// ```
/// use qwalk::utils::basis_index;
///
/// // Qubits 0 and 1 hold |10>, qubit 2 holds |1>.
/// assert_eq!(basis_index(3, [(&[0usize, 1][..], 0b10), (&[2usize][..], 1)]), 0b101);
/// ```
pub fn basis_index<'a, It>(n: usize, assignments: It) -> usize
where
    It: IntoIterator<Item = (&'a [usize], usize)>,
{
    assignments
        .into_iter()
        .fold(0, |acc, (indices, value)| sub_to_full(n, indices, value, acc))
}

/// Read the value of the register at `indices` out of the basis state `full_index`.
///
/// # Example
/// ```
/// use qwalk::utils::register_value;
/// assert_eq!(register_value(3, &[0, 1], 0b101), 0b10);
/// assert_eq!(register_value(3, &[2, 0], 0b101), 0b11);
/// ```
pub fn register_value(n: usize, indices: &[usize], full_index: usize) -> usize {
    full_to_sub(n, indices, full_index)
}

#[cfg(test)]
mod utils_tests {
    use super::*;

    #[test]
    fn test_sub_full_roundtrip_on_disjoint_registers() {
        let n = 5;
        let ra = [3, 0];
        let rb = [4, 1, 2];
        let full = basis_index(n, [(&ra[..], 0b01), (&rb[..], 0b110)]);
        assert_eq!(register_value(n, &ra, full), 0b01);
        assert_eq!(register_value(n, &rb, full), 0b110);
    }

    #[test]
    fn test_flat_index() {
        assert_eq!(get_flat_index(1, 1, 0), 2);
        assert_eq!(get_flat_index(2, 3, 3), 15);
    }
}
