use crate::errors::{CircuitError, CircuitResult};
use crate::state_prep::DEFAULT_PROBABILITY_BOUND;

/// Largest register width accepted. Two registers and one temporary qubit at this width are
/// still within [`MAX_SIMULATED_QUBITS`](crate::builder::MAX_SIMULATED_QUBITS).
pub const MAX_QUBITS: usize = 12;

/// Shape of a line walk. Fixed at construction.
///
/// ```
/// use qwalk::walk::WalkConfig;
/// let config = WalkConfig::default();
/// assert_eq!(config.qubits(), 4);
/// assert_eq!(config.size(), 16);
/// assert_eq!(config.steps(), 1);
///
/// let config = WalkConfig::new(3).unwrap().with_steps(2).unwrap();
/// assert_eq!(config.size(), 8);
/// assert_eq!(config.steps(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkConfig {
    qubits: usize,
    bound: f64,
    steps: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            qubits: 4,
            bound: DEFAULT_PROBABILITY_BOUND,
            steps: 1,
        }
    }
}

impl WalkConfig {
    /// A walk on `2^qubits` vertices with the default bound and a single step.
    pub fn new(qubits: usize) -> CircuitResult<Self> {
        if qubits == 0 || qubits > MAX_QUBITS {
            return Err(CircuitError::InvalidConfig(format!(
                "qubits per register must be in 1..={}, got {}",
                MAX_QUBITS, qubits
            )));
        }
        Ok(Self {
            qubits,
            ..Default::default()
        })
    }

    /// Set how far the sum of each neighbor distribution may be from 1.
    pub fn with_bound(self, bound: f64) -> CircuitResult<Self> {
        if !bound.is_finite() || bound < 0.0 {
            return Err(CircuitError::InvalidConfig(format!(
                "probability bound must be finite and non-negative, got {}",
                bound
            )));
        }
        Ok(Self { bound, ..self })
    }

    /// Repeat the coin and shift `steps` times.
    pub fn with_steps(self, steps: usize) -> CircuitResult<Self> {
        if steps == 0 {
            return Err(CircuitError::InvalidConfig(
                "a walk needs at least one step".to_string(),
            ));
        }
        Ok(Self { steps, ..self })
    }

    /// Qubits in each of the two walk registers.
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// Allowed distance between the sum of a neighbor distribution and 1.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Number of coin and shift rounds.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of vertices in the graph.
    pub fn size(&self) -> usize {
        1 << self.qubits
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            WalkConfig::new(0),
            Err(CircuitError::InvalidConfig(_))
        ));
        assert!(WalkConfig::new(MAX_QUBITS + 1).is_err());
        assert!(WalkConfig::default().with_steps(0).is_err());
        assert!(WalkConfig::default().with_bound(-0.1).is_err());
        assert!(WalkConfig::default().with_bound(f64::INFINITY).is_err());
    }

    #[test]
    fn test_widest_walk_is_simulable() {
        use crate::builder::MAX_SIMULATED_QUBITS;
        assert!(2 * MAX_QUBITS + 1 <= MAX_SIMULATED_QUBITS);
        assert!(WalkConfig::new(MAX_QUBITS).is_ok());
        assert!(WalkConfig::new(16).is_err());
    }

    #[test]
    fn test_builder_keeps_other_fields() {
        let config = WalkConfig::new(2)
            .and_then(|c| c.with_bound(0.05))
            .and_then(|c| c.with_steps(3))
            .unwrap();
        assert_eq!(config.qubits(), 2);
        assert_eq!(config.bound(), 0.05);
        assert_eq!(config.steps(), 3);
        assert_eq!(config.size(), 4);
    }
}
