use super::graph::edge_pairs;
use super::unpack;
use crate::builder_traits::*;
use crate::conditioning::Conditionable;
use crate::errors::{CircuitError, CircuitResult};
use crate::inverter::{within_apply, RecursiveCircuitBuilder};
use crate::types::Precision;
use tracing::{debug, instrument};

/// Flip `res` when `vertices` and `adjacent` hold neighboring vertices of the line graph.
///
/// The predicate is the XOR of `v - a = 1` and `v - a = -1`. Both tests are enumerated over
/// every matching pair of values, each pair becoming an X on `res` conditioned on the two
/// registers holding exactly that pair.
pub fn edge_oracle<P, CB>(
    b: &mut CB,
    res: CB::Register,
    vertices: CB::Register,
    adjacent: CB::Register,
) -> CircuitResult<(CB::Register, CB::Register, CB::Register)>
where
    P: Precision,
    CB: CliffordBuilder<P> + Conditionable,
{
    let k = vertices.n();
    if adjacent.n() != k {
        return Err(CircuitError::RegisterSizeMismatch(k, adjacent.n()));
    }
    let size = 1usize << k;
    let va = b.merge_two_registers(vertices, adjacent);
    let (res, va, pairs) = edge_pairs(size).try_fold(
        (res, va, 0usize),
        |(res, va, pairs), (v, a)| -> CircuitResult<_> {
            let mut c = b.condition_on_value(va, (v << k) | a)?;
            let res = c.x(res)?;
            Ok((res, c.dissolve()?, pairs + 1))
        },
    )?;
    debug!(pairs, "edge oracle enumerated");
    match b.split_prefix(va, k) {
        (Some(vertices), Some(adjacent)) => Ok((res, vertices, adjacent)),
        _ => Err(CircuitError::new("Edge oracle registers did not split back")),
    }
}

/// Swap qubit `j` of `ra` with qubit `j` of `rb` for every `j`.
pub fn bitwise_swap<P, CB>(
    b: &mut CB,
    ra: CB::Register,
    rb: CB::Register,
) -> CircuitResult<(CB::Register, CB::Register)>
where
    P: Precision,
    CB: CliffordBuilder<P>,
{
    b.swap(ra, rb)
}

fn oracle_block<P, CB>(b: &mut CB, rs: Vec<CB::Register>) -> CircuitResult<Vec<CB::Register>>
where
    P: Precision,
    CB: CliffordBuilder<P> + Conditionable,
{
    let [res, vertices, adjacent] = unpack(rs)?;
    let (res, vertices, adjacent) = edge_oracle::<P, _>(b, res, vertices, adjacent)?;
    Ok(vec![res, vertices, adjacent])
}

fn swap_if_edge<P, CB>(b: &mut CB, rs: Vec<CB::Register>) -> CircuitResult<Vec<CB::Register>>
where
    P: Precision,
    CB: CliffordBuilder<P> + Conditionable,
{
    let [res, vertices, adjacent] = unpack(rs)?;
    let mut c = b.condition_with(res);
    let (vertices, adjacent) = bitwise_swap::<P, _>(&mut c, vertices, adjacent)?;
    let res = c.dissolve()?;
    Ok(vec![res, vertices, adjacent])
}

/// Exchange `vertices` and `adjacent` when they hold neighboring vertices, leaving them unchanged
/// otherwise. The adjacency test is computed into a temporary qubit and uncomputed afterwards,
/// which returns it to |0> because the test is symmetric under the exchange.
#[instrument(level = "debug", skip_all)]
pub fn shift_operator<P, CB>(
    b: &mut CB,
    vertices: CB::Register,
    adjacent: CB::Register,
) -> CircuitResult<(CB::Register, CB::Register)>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    let res = b.make_zeroed_temp_qubit();
    let rs = within_apply(
        b,
        vec![res, vertices, adjacent],
        |sb, rs| oracle_block::<P, _>(sb, rs),
        |b, rs| swap_if_edge::<P, _>(b, rs),
    )?;
    let [res, vertices, adjacent] = unpack(rs)?;
    b.return_zeroed_temp_register(res);
    Ok((vertices, adjacent))
}

#[cfg(test)]
mod shift_tests {
    use super::*;
    use crate::builder::LocalBuilder;
    use crate::utils::basis_index;
    use crate::Complex;
    use num_traits::One;

    #[test]
    fn test_oracle_truth_table() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let res = b.qubit();
        let v = b.qudit(3).unwrap();
        let a = b.qudit(3).unwrap();
        let (res, v, a) = edge_oracle::<f64, _>(&mut b, res, v, a)?;
        for vi in 0..8usize {
            for ai in 0..8usize {
                let (state, _) = b.calculate_state_with_init([(&res, 0), (&v, vi), (&a, ai)])?;
                let flipped = usize::from(vi.abs_diff(ai) == 1);
                let index = basis_index(
                    b.n(),
                    [(res.indices(), flipped), (v.indices(), vi), (a.indices(), ai)],
                );
                assert_eq!(state[index], Complex::one());
            }
        }
        Ok(())
    }

    #[test]
    fn test_oracle_size_mismatch() {
        let mut b = LocalBuilder::<f64>::default();
        let res = b.qubit();
        let v = b.qudit(2).unwrap();
        let a = b.qudit(3).unwrap();
        assert!(matches!(
            edge_oracle::<f64, _>(&mut b, res, v, a),
            Err(CircuitError::RegisterSizeMismatch(2, 3))
        ));
    }

    #[test]
    fn test_shift_exchanges_neighbors_only() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let v = b.qudit(3).unwrap();
        let a = b.qudit(3).unwrap();
        let (v, a) = shift_operator::<f64, _>(&mut b, v, a)?;
        // One temporary qubit, reused for nothing else.
        assert_eq!(b.n(), 7);
        for vi in 0..8usize {
            for ai in 0..8usize {
                let (state, _) = b.calculate_state_with_init([(&v, vi), (&a, ai)])?;
                let (ve, ae) = if vi.abs_diff(ai) == 1 {
                    (ai, vi)
                } else {
                    (vi, ai)
                };
                let index = basis_index(b.n(), [(v.indices(), ve), (a.indices(), ae)]);
                assert!((state[index] - Complex::one()).norm() < 1e-10);
            }
        }
        Ok(())
    }
}
