#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    unstable_features,
    unused_import_braces,
    missing_docs
)]

//! Discrete-time quantum walks on line graphs, built as quantum circuits and simulated on a
//! dense state vector.
//!
//! Circuits are built with a [`builder::LocalBuilder`], which hands out registers that are moved
//! through each operation. Any operation can be conditioned on a register holding a given
//! classical value, and any recorded block can be undone, which lets subroutines be written as
//! scoped compute / action / uncompute triples with [`inverter::within_apply`].
//!
//! # Example (one step on 16 vertices)
//! ```
//! use qwalk::prelude::*;
//!
//! # fn main() -> CircuitResult<()> {
//! let mut walk = LineWalk::<f64>::build(WalkConfig::default())?;
//! let outcome = walk.simulate()?;
//!
//! // Every vertex but 1 and 2 keeps its uniform weight, vertex 1 hands its weight to vertex 2.
//! let p = outcome.vertex_probabilities();
//! assert!((p[0] - 1.0 / 16.0).abs() < 1e-10);
//! assert!(p[1].abs() < 1e-10);
//! assert!((p[2] - 2.0 / 16.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```
//!
//! # Example (building blocks)
//! The walk operators are generic over the builder, so they compose with anything else built on
//! the same registers.
//! ```
//! use qwalk::prelude::*;
//!
//! # fn main() -> CircuitResult<()> {
//! let mut b = LocalBuilder::<f64>::default();
//! let vertices = b.qudit(3).unwrap();
//! let adjacent = b.qudit(3).unwrap();
//!
//! // Exchange the registers only if they hold neighboring vertices.
//! let (vertices, adjacent) = shift_operator::<f64, _>(&mut b, vertices, adjacent)?;
//! let (state, _) = b.calculate_state_with_init([(&vertices, 3), (&adjacent, 4)])?;
//! let index = qwalk::utils::basis_index(b.n(), [(vertices.indices(), 4), (adjacent.indices(), 3)]);
//! assert!((state[index].re - 1.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```

pub use num_complex::Complex;
pub use types::*;

/// Circuit builder and its state-vector simulation.
pub mod builder;
/// Traits describing what a circuit builder can do.
pub mod builder_traits;
/// Conditioning circuit objects on the value of a register.
pub mod conditioning;
/// Error types.
pub mod errors;
/// Inverting recorded subcircuits.
pub mod inverter;
/// OpenQASM export.
pub mod qasm;
/// Helpers for running loops in parallel when the feature is enabled.
pub mod rayon_helper;
/// Raw state vector operations.
pub mod state_ops;
/// Amplitude loading.
pub mod state_prep;
/// Numeric types.
pub mod types;
/// Bit and index helpers.
pub mod utils;
/// The line walk itself.
pub mod walk;

/// Commonly used types and traits.
pub mod prelude {
    pub use super::builder::*;
    pub use super::builder_traits::*;
    pub use super::conditioning::*;
    pub use super::errors::*;
    pub use super::inverter::*;
    pub use super::qasm::*;
    pub use super::state_prep::*;
    pub use super::types::*;
    pub use super::walk::*;
    pub use super::Complex;
}
