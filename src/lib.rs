//! Simulation of a planar chain of N rigid pendulum links.
//!
//! The physics kernel lives in [`dynamics`] (equation assembly), [`solver`]
//! (dense linear solve), and [`integrator`] (RK4 time stepping), with
//! [`controller::SimulationController`] owning the authoritative state. The
//! [`ui`] module exposes the kernel over HTTP.

pub mod controller;
pub mod dynamics;
pub mod error;
pub mod integrator;
pub mod model;
pub mod solver;
pub mod ui;

pub use controller::{SimulationController, DT};
pub use error::SimError;
pub use model::{bob_positions, PendulumParameters, PendulumState, PendulumSystem};
pub use solver::{Matrix, SingularPolicy};
