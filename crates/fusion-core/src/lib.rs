//! Transient step engine for cable-in-conduit conductors.
//!
//! Coolant channels (velocity, pressure, temperature) and solid components
//! (strands, stabilizer, jackets) share a 1D finite-element mesh. Each step
//! assembles the coupled operators into one banded system, applies the time
//! scheme and channel boundary conditions, and solves by banded elimination.

pub mod assembly;
pub mod boundary;
pub mod coupling;
pub mod integration;
pub mod layout;
pub mod radiation;
pub mod step;
pub mod timestep;

pub use step::{StepDiagnostics, StepOutcome, TransientSolver};
