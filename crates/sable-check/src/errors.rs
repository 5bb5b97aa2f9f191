//! Compile-time evaluation errors (E3xxx).
//!
//! These are the real failures of constant folding - not phase results.
//! "Not constant" and "not yet known" are ordinary sentinel values, never
//! errors; what lands here is surfaced to the user by the checking
//! pipeline.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("integer overflow in compile-time arithmetic")]
    #[diagnostic(
        code(E3001),
        help("compile-time integers are evaluated with 64-bit signed precision")
    )]
    IntegerOverflow,

    #[error("division by zero in compile-time arithmetic")]
    #[diagnostic(code(E3002))]
    DivisionByZero,
}
