//! Sable identity: shared id newtypes for the semantic IR stores.

mod entities;

pub use entities::{BindIndex, GenericId, InstBlockId, InstId, SpecificId};
