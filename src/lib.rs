// src/lib.rs
//! Facade over the Sable semantic-IR generics crates.

pub use sable_check as check;
pub use sable_identity as identity;
pub use sable_semir as semir;
