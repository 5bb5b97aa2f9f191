//! Sable check: the phased evaluation driver for generics.
//!
//! Classifies instruction constant phases, seals generic regions into eval
//! blocks, and resolves regions for specifics by re-running eval blocks
//! under binding-to-argument substitution.

pub mod context;
pub mod errors;
pub mod eval;

pub use context::Context;
pub use errors::EvalError;
pub use eval::{eval_inst, resolve_specific_region};
