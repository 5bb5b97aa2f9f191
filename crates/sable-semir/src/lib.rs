//! Sable semantic IR: instruction, constant, and type storage, plus the
//! generic-instantiation machinery (generics, deduplicated specifics, and
//! substitution queries).

pub mod constant;
pub mod generic;
pub mod inst;
pub mod ir;
pub mod substitute;
pub mod types;

pub use constant::{ConstantId, ConstantInfo, ConstantKind, ConstantStore, EvalSlot};
pub use generic::{Generic, GenericStore, Region, Specific, SpecificDump, SpecificStore};
pub use inst::{Inst, InstBlockStore, InstIdVec, InstStore};
pub use ir::SemIr;
pub use substitute::{constant_in_specific, constant_value_in_specific, type_in_specific};
pub use types::{TypeId, TypeStore};
