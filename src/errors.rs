use thiserror::Error;

/// An error from building or simulating the circuit.
#[derive(Debug, Error)]
pub enum CircuitError {
    /// A generic error.
    #[error("{0}")]
    Generic(String),

    /// A probability vector which cannot be loaded into a register.
    #[error("probabilities sum to {sum}, which is not within {bound} of 1")]
    InvalidProbabilities {
        /// Sum of the supplied probabilities.
        sum: f64,
        /// Allowed distance from 1.
        bound: f64,
    },

    /// A probability vector of the wrong length for the target register.
    #[error("expected {expected} probabilities for a {qubits} qubit register, got {actual}")]
    ProbabilityCount {
        /// Width of the target register.
        qubits: usize,
        /// Required number of entries, `2^qubits`.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// A vertex index outside of the graph.
    #[error("vertex {vertex} is out of range for a graph with {size} vertices")]
    VertexOutOfRange {
        /// The offending vertex.
        vertex: usize,
        /// Number of vertices in the graph.
        size: usize,
    },

    /// A classical value which does not fit in the register it conditions on.
    #[error("value {value} does not fit in a {qubits} qubit register")]
    ValueOutOfRange {
        /// The offending value.
        value: usize,
        /// Width of the register.
        qubits: usize,
    },

    /// Two registers which must have equal width do not.
    #[error("registers must have equal width, found {0} and {1}")]
    RegisterSizeMismatch(usize, usize),

    /// A circuit too wide to hold as a dense state vector.
    #[error("cannot simulate {qubits} qubits, at most {max} are supported")]
    TooManyQubits {
        /// Qubits in the circuit.
        qubits: usize,
        /// Largest simulated width.
        max: usize,
    },

    /// A walk configuration which cannot be built.
    #[error("invalid walk configuration: {0}")]
    InvalidConfig(String),
}

impl CircuitError {
    /// Construct a new error.
    pub fn new<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Generic(msg.into())
    }
}

/// A result which may contain a circuit error.
pub type CircuitResult<T> = Result<T, CircuitError>;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_probability_message() {
        let err = CircuitError::InvalidProbabilities {
            sum: 0.5,
            bound: 0.01,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.5"));
        assert!(msg.contains("0.01"));
    }

    #[test]
    fn test_generic_message() {
        let err = CircuitError::new("Cannot condition measurements.");
        assert_eq!(err.to_string(), "Cannot condition measurements.");
    }
}
