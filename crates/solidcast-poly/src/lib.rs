#![warn(missing_docs)]

//! Low-degree polynomial root finding for the solidcast ray tracing core.
//!
//! Curved-surface primitives reduce ray/surface intersection to finding the
//! real roots of a real-coefficient polynomial of degree at most 4. This
//! crate provides that solver:
//!
//! - [`Polynomial`] - coefficients highest-order first, mutated in place by
//!   reduction and deflation; consumed by the solver.
//! - [`Complex`] - the minimal complex arithmetic Laguerre iteration needs.
//!
//! Quartics and cubics are attempted in closed form (Ferrari / Cardano) and
//! accepted only when every candidate root passes a residual check; anything
//! else goes through Laguerre iteration with synthetic-division deflation.
//! Non-convergence is reported, never fatal: the caller receives the roots
//! found so far and decides what a short list means (for intersection code,
//! a miss).

mod complex;
mod roots;

pub use complex::Complex;
pub use roots::{Polynomial, RootsError, MAX_DEGREE};
