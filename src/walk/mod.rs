//! A discrete-time quantum walk on a line graph of `2^k` vertices.
//!
//! The walker lives in two registers of `k` qubits each: `vertices` holds its position and
//! `adjacent_vertices` the neighbor it is about to move to. A step is a coin operator, which
//! mixes `adjacent_vertices` according to the neighbors of each vertex, followed by a shift
//! operator, which exchanges the two registers whenever they hold adjacent vertices.

/// Immutable walk configuration.
pub mod config;
/// Classical line graph helpers.
pub mod graph;
/// Coin operator and its diffusion step.
pub mod coin;
/// Edge oracle and shift operator.
pub mod shift;
/// Allocation of registers and composition of whole walks.
pub mod driver;

pub use coin::*;
pub use config::*;
pub use driver::*;
pub use graph::*;
pub use shift::*;

use crate::errors::{CircuitError, CircuitResult};

/// Unpack exactly `N` registers handed back by a scoped block.
pub(crate) fn unpack<R, const N: usize>(rs: Vec<R>) -> CircuitResult<[R; N]> {
    let found = rs.len();
    <[R; N]>::try_from(rs).map_err(|_| {
        CircuitError::new(format!("Expected {} registers, found {}", N, found))
    })
}
