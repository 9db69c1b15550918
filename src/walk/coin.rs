use super::graph::neighbor_probabilities;
use super::unpack;
use crate::builder_traits::*;
use crate::conditioning::Conditionable;
use crate::errors::CircuitResult;
use crate::inverter::{within_apply, RecursiveCircuitBuilder};
use crate::state_prep::prepare_state;
use crate::types::Precision;
use tracing::{debug, instrument};

fn flip_to_minus<P, CB>(b: &mut CB, rs: Vec<CB::Register>) -> CircuitResult<Vec<CB::Register>>
where
    P: Precision,
    CB: CliffordBuilder<P>,
{
    let [x, aux] = unpack(rs)?;
    let aux = b.x(aux)?;
    let aux = b.h(aux)?;
    Ok(vec![x, aux])
}

fn flip_unless_zero<P, CB>(b: &mut CB, rs: Vec<CB::Register>) -> CircuitResult<Vec<CB::Register>>
where
    P: Precision,
    CB: CliffordBuilder<P> + Conditionable,
{
    let [x, aux] = unpack(rs)?;
    let mut c = b.condition_on_value(x, 0)?;
    let aux = c.x(aux)?;
    let x = c.dissolve()?;
    let aux = b.x(aux)?;
    Ok(vec![x, aux])
}

/// Reflect `x` about |0>: every nonzero basis state picks up a phase of -1 and |0> is left
/// alone. A temporary qubit prepared in |-> absorbs the flips and is returned in |0>.
pub fn zero_diffuser<P, CB>(b: &mut CB, x: CB::Register) -> CircuitResult<CB::Register>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    let aux = b.make_zeroed_temp_qubit();
    let rs = within_apply(
        b,
        vec![x, aux],
        |sb, rs| flip_to_minus::<P, _>(sb, rs),
        |b, rs| flip_unless_zero::<P, _>(b, rs),
    )?;
    let [x, aux] = unpack(rs)?;
    b.return_zeroed_temp_register(aux);
    Ok(x)
}

/// Apply `U† D U` to `adjacent`, where `U` loads `probabilities` and `D` is the zero diffuser.
pub fn coin_iteration<P, CB>(
    b: &mut CB,
    adjacent: CB::Register,
    probabilities: &[f64],
    bound: f64,
) -> CircuitResult<CB::Register>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    let rs = within_apply(
        b,
        vec![adjacent],
        |sb, rs| {
            let [r] = unpack(rs)?;
            Ok(vec![prepare_state::<P, _>(sb, r, probabilities, bound)?])
        },
        |b, rs| {
            let [r] = unpack(rs)?;
            Ok(vec![zero_diffuser::<P, _>(b, r)?])
        },
    )?;
    let [adjacent] = unpack(rs)?;
    Ok(adjacent)
}

/// For every vertex `i`, controlled on `vertices == i`, mix `adjacent` with the coin iteration
/// built from the neighbors of `i`.
#[instrument(level = "debug", skip(b, vertices, adjacent))]
pub fn coin_operator<P, CB>(
    b: &mut CB,
    vertices: CB::Register,
    adjacent: CB::Register,
    bound: f64,
) -> CircuitResult<(CB::Register, CB::Register)>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    let size = 1usize << vertices.n();
    let (vertices, adjacent) = (0..size).try_fold(
        (vertices, adjacent),
        |(vertices, adjacent), i| -> CircuitResult<_> {
            let probabilities = neighbor_probabilities(i, size)?;
            let mut c = b.condition_on_value(vertices, i)?;
            let adjacent = coin_iteration::<P, _>(&mut c, adjacent, &probabilities, bound)?;
            let vertices = c.dissolve()?;
            debug!(vertex = i, "coin branch");
            Ok((vertices, adjacent))
        },
    )?;
    Ok((vertices, adjacent))
}

#[cfg(test)]
mod coin_tests {
    use super::*;
    use crate::builder::LocalBuilder;
    use crate::state_ops::measurement_ops::measure_probs;
    use crate::state_prep::DEFAULT_PROBABILITY_BOUND;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_diffuser_phases() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let x = b.qudit(2).unwrap();
        let x = zero_diffuser::<f64, _>(&mut b, x)?;
        assert_eq!(b.n(), 3);
        for value in 0..4 {
            let (state, _) = b.calculate_state_with_init([(&x, value)])?;
            // aux is the last qubit and must be back in |0>.
            let expected = if value == 0 { 1.0 } else { -1.0 };
            assert_abs_diff_eq!(state[value << 1].re, expected, epsilon = 1e-10);
            let norm: f64 = state.iter().map(|c| c.norm_sqr()).sum();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_coin_iteration_interior() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let a = b.qudit(2).unwrap();
        let probs = neighbor_probabilities(1, 4)?;
        let a = coin_iteration::<f64, _>(&mut b, a, &probs, DEFAULT_PROBABILITY_BOUND)?;
        let (state, _) = b.calculate_state_with_init([(&a, 0)])?;
        // U sends |00> to (|00> + |10>)/sqrt2, the neighbors {0, 2}. D flips the sign of |10>
        // and U† maps the result to -|10>.
        assert_abs_diff_eq!(state[0b100].re, -1.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_coin_leaves_vertices_alone() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let v = b.qudit(2).unwrap();
        let a = b.qudit(2).unwrap();
        let (v, a) = coin_operator::<f64, _>(&mut b, v, a, DEFAULT_PROBABILITY_BOUND)?;
        for i in 0..4 {
            let (state, _) = b.calculate_state_with_init([(&v, i), (&a, 0)])?;
            let probs = measure_probs(b.n(), v.indices(), &state);
            assert_abs_diff_eq!(probs[i], 1.0, epsilon = 1e-10);
        }
        Ok(())
    }
}
