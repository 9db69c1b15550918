use super::coin::coin_operator;
use super::config::WalkConfig;
use super::shift::shift_operator;
use crate::builder::{CircuitSummary, LocalBuilder, Qudit};
use crate::builder_traits::*;
use crate::errors::{CircuitError, CircuitResult};
use crate::inverter::RecursiveCircuitBuilder;
use crate::state_ops::measurement_ops::{measure_prob, measure_probs, soft_measure};
use crate::types::Precision;
use crate::Complex;
use tracing::{debug, info, instrument};

/// Put `vertices` into a uniform superposition over every vertex.
pub fn initialize<P, CB>(b: &mut CB, vertices: CB::Register) -> CircuitResult<CB::Register>
where
    P: Precision,
    CB: CliffordBuilder<P>,
{
    b.h(vertices)
}

/// One step of the walk: the coin operator followed by the shift operator.
pub fn walk_step<P, CB>(
    b: &mut CB,
    vertices: CB::Register,
    adjacent: CB::Register,
    bound: f64,
) -> CircuitResult<(CB::Register, CB::Register)>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    let (vertices, adjacent) = coin_operator::<P, _>(b, vertices, adjacent, bound)?;
    shift_operator::<P, _>(b, vertices, adjacent)
}

/// Initialize `vertices` and apply `config.steps()` walk steps.
#[instrument(level = "debug", skip(b, vertices, adjacent))]
pub fn line_walk<P, CB>(
    b: &mut CB,
    vertices: CB::Register,
    adjacent: CB::Register,
    config: &WalkConfig,
) -> CircuitResult<(CB::Register, CB::Register)>
where
    P: Precision,
    CB: RecursiveCircuitBuilder<P>,
{
    if vertices.n() != config.qubits() {
        return Err(CircuitError::InvalidConfig(format!(
            "vertices register has {} qubits, expected {}",
            vertices.n(),
            config.qubits()
        )));
    }
    if adjacent.n() != vertices.n() {
        return Err(CircuitError::RegisterSizeMismatch(
            vertices.n(),
            adjacent.n(),
        ));
    }
    let vertices = initialize::<P, _>(b, vertices)?;
    (0..config.steps()).try_fold((vertices, adjacent), |(vertices, adjacent), step| {
        debug!(step, "building walk step");
        walk_step::<P, _>(b, vertices, adjacent, config.bound())
    })
}

/// A line walk built into its own [`LocalBuilder`].
#[derive(Debug)]
pub struct LineWalk<P: Precision> {
    config: WalkConfig,
    builder: LocalBuilder<P>,
    vertices: Qudit,
    adjacent_vertices: Qudit,
}

impl<P: Precision> LineWalk<P> {
    /// Allocate `vertices` then `adjacent_vertices` and build the walk described by `config`.
    #[instrument(level = "info", skip_all, fields(qubits = config.qubits(), steps = config.steps()))]
    pub fn build(config: WalkConfig) -> CircuitResult<Self> {
        let mut builder = LocalBuilder::default();
        let vertices = builder
            .qudit(config.qubits())
            .ok_or_else(|| CircuitError::InvalidConfig("empty vertices register".to_string()))?;
        let adjacent_vertices = builder
            .qudit(config.qubits())
            .ok_or_else(|| CircuitError::InvalidConfig("empty adjacent register".to_string()))?;
        let (vertices, adjacent_vertices) =
            line_walk::<P, _>(&mut builder, vertices, adjacent_vertices, &config)?;

        let summary = builder.summary();
        info!(
            qubits = summary.qubits,
            operations = summary.operations,
            max_controls = summary.max_controls,
            "line walk built"
        );
        Ok(Self {
            config,
            builder,
            vertices,
            adjacent_vertices,
        })
    }

    /// The configuration the walk was built from.
    pub fn config(&self) -> WalkConfig {
        self.config
    }

    /// The builder holding the walk circuit.
    pub fn builder(&self) -> &LocalBuilder<P> {
        &self.builder
    }

    /// Register holding the walker position.
    pub fn vertices(&self) -> &Qudit {
        &self.vertices
    }

    /// Register holding the neighbor candidate.
    pub fn adjacent_vertices(&self) -> &Qudit {
        &self.adjacent_vertices
    }

    /// Size of the built circuit.
    pub fn summary(&self) -> CircuitSummary {
        self.builder.summary()
    }

    /// Simulate the walk from |0> on every qubit.
    pub fn simulate(&mut self) -> CircuitResult<WalkOutcome<P>> {
        let (state, _) = self.builder.calculate_state_with_init([
            (&self.vertices, 0),
            (&self.adjacent_vertices, 0),
        ])?;
        let outcome = WalkOutcome::new(
            self.builder.n(),
            self.vertices.indices(),
            self.adjacent_vertices.indices(),
            state,
        );
        debug!(
            ancilla_zero_probability = %outcome.ancilla_zero_probability(),
            "line walk simulated"
        );
        Ok(outcome)
    }
}

/// The state at the end of a simulated walk, with its marginals.
#[derive(Debug, Clone)]
pub struct WalkOutcome<P: Precision> {
    n: usize,
    vertex_indices: Vec<usize>,
    state: Vec<Complex<P>>,
    vertex_probabilities: Vec<P>,
    adjacent_probabilities: Vec<P>,
    ancilla_zero_probability: P,
}

impl<P: Precision> WalkOutcome<P> {
    fn new(
        n: usize,
        vertex_indices: &[usize],
        adjacent_indices: &[usize],
        state: Vec<Complex<P>>,
    ) -> Self {
        let vertex_probabilities = measure_probs(n, vertex_indices, &state);
        let adjacent_probabilities = measure_probs(n, adjacent_indices, &state);
        let ancillas = (0..n)
            .filter(|i| !vertex_indices.contains(i) && !adjacent_indices.contains(i))
            .collect::<Vec<_>>();
        let ancilla_zero_probability = if ancillas.is_empty() {
            P::one()
        } else {
            measure_prob(n, 0, &ancillas, &state)
        };
        Self {
            n,
            vertex_indices: vertex_indices.to_vec(),
            state,
            vertex_probabilities,
            adjacent_probabilities,
            ancilla_zero_probability,
        }
    }

    /// Full state vector over every qubit of the circuit.
    pub fn state(&self) -> &[Complex<P>] {
        &self.state
    }

    /// Probability of finding the walker at each vertex.
    pub fn vertex_probabilities(&self) -> &[P] {
        &self.vertex_probabilities
    }

    /// Probability of each value of the `adjacent_vertices` register.
    pub fn adjacent_probabilities(&self) -> &[P] {
        &self.adjacent_probabilities
    }

    /// Probability that every temporary qubit is back in |0>.
    pub fn ancilla_zero_probability(&self) -> P {
        self.ancilla_zero_probability
    }

    /// Sample a walker position.
    pub fn sample_vertex(&self) -> usize {
        soft_measure(self.n, &self.vertex_indices, &self.state)
    }

    /// Sample `shots` walker positions and count how often each vertex was seen.
    pub fn sample_vertices(&self, shots: usize) -> Vec<usize> {
        let mut counts = vec![0; self.vertex_probabilities.len()];
        (0..shots).for_each(|_| counts[self.sample_vertex()] += 1);
        counts
    }
}

#[cfg(test)]
mod driver_tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_small_walk_marginals() -> CircuitResult<()> {
        let config = WalkConfig::new(2)?;
        let mut walk = LineWalk::<f64>::build(config)?;
        let outcome = walk.simulate()?;
        let total: f64 = outcome.vertex_probabilities().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(outcome.ancilla_zero_probability(), 1.0, epsilon = 1e-10);
        Ok(())
    }

    #[test]
    fn test_register_width_checked() {
        let mut b = LocalBuilder::<f64>::default();
        let v = b.qudit(3).unwrap();
        let a = b.qudit(3).unwrap();
        let config = WalkConfig::new(2).unwrap();
        assert!(matches!(
            line_walk::<f64, _>(&mut b, v, a, &config),
            Err(CircuitError::InvalidConfig(_))
        ));

        let mut b = LocalBuilder::<f64>::default();
        let v = b.qudit(2).unwrap();
        let a = b.qudit(3).unwrap();
        assert!(matches!(
            line_walk::<f64, _>(&mut b, v, a, &config),
            Err(CircuitError::RegisterSizeMismatch(2, 3))
        ));
    }

    #[test]
    fn test_sampling_counts_every_shot() -> CircuitResult<()> {
        let mut walk = LineWalk::<f64>::build(WalkConfig::new(2)?)?;
        let outcome = walk.simulate()?;
        let counts = outcome.sample_vertices(50);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.iter().sum::<usize>(), 50);
        Ok(())
    }
}
