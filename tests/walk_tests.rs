use approx::assert_abs_diff_eq;
use qwalk::prelude::*;
use qwalk::utils::basis_index;

#[test]
fn test_single_step_amplitudes() -> Result<(), CircuitError> {
    let mut walk = LineWalk::<f64>::build(WalkConfig::default())?;
    // Two registers of four qubits and one temporary shared by the coin and the shift.
    assert_eq!(walk.builder().n(), 9);

    let outcome = walk.simulate()?;
    let n = walk.builder().n();
    let v = walk.vertices().indices();
    let a = walk.adjacent_vertices().indices();

    let mut expected = vec![0.0; 1 << n];
    for i in (0..16).filter(|i| *i != 1) {
        expected[basis_index(n, [(v, i), (a, 0)])] = -0.25;
    }
    expected[basis_index(n, [(v, 2), (a, 1)])] = -0.25;

    for (found, expected) in outcome.state().iter().zip(expected) {
        assert_abs_diff_eq!(found.re, expected, epsilon = 1e-10);
        assert_abs_diff_eq!(found.im, 0.0, epsilon = 1e-10);
    }
    Ok(())
}

#[test]
fn test_single_step_marginals() -> Result<(), CircuitError> {
    let mut walk = LineWalk::<f64>::build(WalkConfig::default())?;
    let outcome = walk.simulate()?;

    let p = outcome.vertex_probabilities();
    assert_eq!(p.len(), 16);
    for (i, p) in p.iter().enumerate() {
        let expected = match i {
            1 => 0.0,
            2 => 2.0 / 16.0,
            _ => 1.0 / 16.0,
        };
        assert_abs_diff_eq!(*p, expected, epsilon = 1e-10);
    }

    let adjacent = outcome.adjacent_probabilities();
    assert_abs_diff_eq!(adjacent[0], 15.0 / 16.0, epsilon = 1e-10);
    assert_abs_diff_eq!(adjacent[1], 1.0 / 16.0, epsilon = 1e-10);
    assert_abs_diff_eq!(outcome.ancilla_zero_probability(), 1.0, epsilon = 1e-10);
    Ok(())
}

#[test]
fn test_two_step_amplitudes() -> Result<(), CircuitError> {
    // On 4 vertices the coin branches act on |a> as
    //   C0 = 2|1><1| - 1, C1 = 2|f1><f1| - 1 with f1 = (|0> - |2>)/sqrt2,
    //   C2 = 2|f2><f2| - 1 with f2 = (|1> - |3>)/sqrt2, C3 = 2|2><2| - 1.
    // Step 1: 1/2 (|0,0> + |1,0> + |2,0> + |3,0>) -> -1/2 (|0,0> + |1,2> + |2,0> + |3,0>)
    //   and the shift takes |1,2> to |2,1>.
    // Step 2: the coin sends |2,1> to -|2,3>, the rest to minus themselves, and the shift
    //   takes |2,3> to |3,2>.
    let config = WalkConfig::new(2)?.with_steps(2)?;
    let mut walk = LineWalk::<f64>::build(config)?;
    assert_eq!(walk.builder().n(), 5);

    let outcome = walk.simulate()?;
    let n = walk.builder().n();
    let v = walk.vertices().indices();
    let a = walk.adjacent_vertices().indices();

    let mut expected = vec![0.0; 1 << n];
    for (vi, ai) in [(0, 0), (2, 0), (3, 0), (3, 2)] {
        expected[basis_index(n, [(v, vi), (a, ai)])] = 0.5;
    }
    for (found, expected) in outcome.state().iter().zip(expected) {
        assert_abs_diff_eq!(found.re, expected, epsilon = 1e-10);
        assert_abs_diff_eq!(found.im, 0.0, epsilon = 1e-10);
    }

    let p = outcome.vertex_probabilities();
    assert_abs_diff_eq!(p[0], 0.25, epsilon = 1e-10);
    assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(p[2], 0.25, epsilon = 1e-10);
    assert_abs_diff_eq!(p[3], 0.5, epsilon = 1e-10);
    Ok(())
}

#[test]
fn test_multiple_steps_stay_normalized() -> Result<(), CircuitError> {
    let config = WalkConfig::new(3)?.with_steps(3)?;
    let mut walk = LineWalk::<f64>::build(config)?;
    assert_eq!(walk.builder().n(), 7);

    let outcome = walk.simulate()?;
    let total: f64 = outcome.vertex_probabilities().iter().sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(outcome.ancilla_zero_probability(), 1.0, epsilon = 1e-10);
    Ok(())
}

#[test]
fn test_more_steps_grow_the_circuit() -> Result<(), CircuitError> {
    let one = LineWalk::<f64>::build(WalkConfig::new(2)?)?;
    let two = LineWalk::<f64>::build(WalkConfig::new(2)?.with_steps(2)?)?;
    let h_gates = 2;
    assert_eq!(
        two.summary().operations - h_gates,
        2 * (one.summary().operations - h_gates)
    );
    assert_eq!(one.summary().qubits, two.summary().qubits);
    Ok(())
}

#[test]
fn test_invalid_configs() {
    assert!(matches!(
        WalkConfig::new(0),
        Err(CircuitError::InvalidConfig(_))
    ));
    assert!(matches!(
        WalkConfig::new(MAX_QUBITS + 1),
        Err(CircuitError::InvalidConfig(_))
    ));
    assert!(matches!(
        WalkConfig::default().with_steps(0),
        Err(CircuitError::InvalidConfig(_))
    ));
    assert!(matches!(
        WalkConfig::default().with_bound(-1.0),
        Err(CircuitError::InvalidConfig(_))
    ));
}

#[test]
fn test_walk_exports_to_qasm() -> Result<(), CircuitError> {
    let walk = LineWalk::<f64>::build(WalkConfig::new(2)?)?;
    let qasm = walk.builder().to_openqasm();
    assert!(qasm.starts_with("OPENQASM 3.0;\n"));
    assert!(qasm.contains("qubit[5] q;"));
    assert!(qasm.contains("h q[0];"));
    assert!(qasm.contains("h q[1];"));
    assert!(qasm.contains("ry("));
    assert!(qasm.contains("negctrl"));
    assert!(qasm.contains("swap"));
    assert!(!qasm.contains("measure"));
    assert_eq!(
        qasm.lines().filter(|l| !l.is_empty()).count(),
        3 + walk.summary().operations
    );
    Ok(())
}

#[test]
fn test_walk_composes_with_other_circuits() -> Result<(), CircuitError> {
    // Start the walker on vertex 5 instead of a uniform superposition, then one coin and shift.
    let mut b = LocalBuilder::<f64>::default();
    let v = b.qudit(3).unwrap();
    let a = b.qudit(3).unwrap();
    let (v, a) = walk_step::<f64, _>(&mut b, v, a, DEFAULT_PROBABILITY_BOUND)?;
    let (v, m) = b.measure_stochastic(v);

    let (_, measurements) = b.calculate_state_with_init([(&v, 5), (&a, 0)])?;
    let probs = measurements.get_stochastic_measurement(m).unwrap();
    // The coin sends |5, 0> to -|5, 0>, which is not an edge.
    assert_abs_diff_eq!(probs[5], 1.0, epsilon = 1e-10);
    Ok(())
}

#[test]
fn test_within_apply_conjugates() -> Result<(), CircuitError> {
    // X conjugated by H is Z: |1> picks up a phase.
    let mut b = LocalBuilder::<f64>::default();
    let r = b.qubit();
    let rs = within_apply(
        &mut b,
        vec![r],
        |sb, rs| rs.into_iter().map(|r| sb.h(r)).collect(),
        |b, rs| rs.into_iter().map(|r| b.x(r)).collect(),
    )?;
    let (state, _) = b.calculate_state_with_init([(&rs[0], 1)])?;
    assert_abs_diff_eq!(state[1].re, -1.0, epsilon = 1e-10);
    Ok(())
}

#[test]
fn test_prepared_neighbor_distribution() -> Result<(), CircuitError> {
    let mut b = LocalBuilder::<f64>::default();
    let r = b.qudit(3).unwrap();
    let probs = neighbor_probabilities(7, 8)?;
    let r = prepare_state::<f64, _>(&mut b, r, &probs, DEFAULT_PROBABILITY_BOUND)?;
    let (r, m) = b.measure_stochastic(r);
    let (_, measurements) = b.calculate_state_with_init([(&r, 0)])?;
    let found = measurements.get_stochastic_measurement(m).unwrap();
    assert_abs_diff_eq!(found[6], 1.0, epsilon = 1e-10);
    Ok(())
}
