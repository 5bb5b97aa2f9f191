//! Constant values and their phases.
//!
//! `ConstantId` is a `u32` handle with reserved low indices: two sentinels
//! live below `FIRST_DYNAMIC` so that "not yet computed" and "known to be
//! runtime-phase" stay distinguishable without an enum wrapper in every
//! slot.
//!
//! Dynamic constants come in two kinds. A concrete constant has a fixed
//! value, deduplicated structurally by its defining instruction. A symbolic
//! constant depends on a generic's compile-time bindings; its identity is
//! its defining instruction, and once the enclosing generic region is
//! sealed it knows its position (`EvalSlot`) in that region's eval block.

use std::fmt;

use rustc_hash::FxHashMap;
use sable_identity::{GenericId, InstId};

use crate::generic::Region;
use crate::inst::{Inst, InstStore};

/// Handle to a constant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstantId(u32);

impl ConstantId {
    /// "Not yet computed" - also the initial constant value of every
    /// instruction, and the result of substitution queries on unresolved
    /// regions.
    pub const UNKNOWN: ConstantId = ConstantId(0);

    /// "Known to be runtime-phase" - distinct from `UNKNOWN`.
    pub const NOT_CONSTANT: ConstantId = ConstantId(1);

    /// First index holding an actual constant.
    pub const FIRST_DYNAMIC: u32 = 2;

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    #[inline]
    pub fn is_not_constant(self) -> bool {
        self == Self::NOT_CONSTANT
    }

    /// Whether this id names an actual compile-time value (as opposed to
    /// either sentinel).
    #[inline]
    pub fn is_constant(self) -> bool {
        self.0 >= Self::FIRST_DYNAMIC
    }
}

impl fmt::Display for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UNKNOWN => write!(f, "constant<unknown>"),
            Self::NOT_CONSTANT => write!(f, "constant<not constant>"),
            _ => write!(f, "constant{}", self.0),
        }
    }
}

/// Position of a symbolic constant within its generic's eval block for one
/// region. Assigned exactly once, when that region is sealed; the value
/// block produced for a specific is positionally aligned with the eval
/// block, so this is also the constant's slot in every specific's value
/// block for the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalSlot {
    pub generic_id: GenericId,
    pub region: Region,
    pub offset: u32,
}

/// Phase-specific data for a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
    /// A fixed compile-time value.
    Concrete,
    /// A value that depends on a generic's bindings. `slot` is unset until
    /// the defining instruction's region is sealed.
    Symbolic { slot: Option<EvalSlot> },
}

/// One dynamic constant.
#[derive(Debug, Clone, Copy)]
pub struct ConstantInfo {
    /// The canonical instruction defining this constant. For canonical
    /// argument lists, slots of value blocks, and the concrete dedup map,
    /// this instruction *is* the constant's identity.
    pub inst_id: InstId,
    pub kind: ConstantKind,
}

/// Append-only storage for dynamic constants, with structural interning of
/// concrete constants.
#[derive(Debug, Default)]
pub struct ConstantStore {
    infos: Vec<ConstantInfo>,
    /// Dedup map for concrete constants, keyed on the defining instruction's
    /// contents.
    concrete_map: FxHashMap<Inst, ConstantId>,
}

impl ConstantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, info: ConstantInfo) -> ConstantId {
        let id = ConstantId(Self::base_index() + self.infos.len() as u32);
        self.infos.push(info);
        id
    }

    fn base_index() -> u32 {
        ConstantId::FIRST_DYNAMIC
    }

    /// Intern the concrete constant produced by `inst_id`, whose contents
    /// are `inst`. If an equal instruction was interned before, its constant
    /// is returned and `inst_id` is not made canonical.
    pub fn concrete(&mut self, inst_id: InstId, inst: Inst) -> ConstantId {
        if let Some(&id) = self.concrete_map.get(&inst) {
            return id;
        }
        let id = self.push(ConstantInfo {
            inst_id,
            kind: ConstantKind::Concrete,
        });
        self.concrete_map.insert(inst, id);
        id
    }

    /// Intern a concrete constant for a freshly computed value, allocating
    /// a canonical instruction for it if none exists yet. Used by constant
    /// folding, where the folded value may not correspond to any
    /// instruction the pipeline wrote.
    pub fn concrete_for(&mut self, insts: &mut InstStore, inst: Inst) -> ConstantId {
        if let Some(&id) = self.concrete_map.get(&inst) {
            return id;
        }
        let inst_id = insts.add(inst);
        let id = self.push(ConstantInfo {
            inst_id,
            kind: ConstantKind::Concrete,
        });
        insts.set_constant_value(inst_id, id);
        self.concrete_map.insert(inst, id);
        id
    }

    /// Create a symbolic constant for `inst_id`. Symbolic constants are
    /// per-instruction; they are never merged with other instructions.
    pub fn symbolic(&mut self, inst_id: InstId) -> ConstantId {
        self.push(ConstantInfo {
            inst_id,
            kind: ConstantKind::Symbolic { slot: None },
        })
    }

    /// Get a dynamic constant's info. `id` must name an actual constant.
    pub fn get(&self, id: ConstantId) -> &ConstantInfo {
        debug_assert!(id.is_constant(), "no info for sentinel {id}");
        &self.infos[(id.index() - Self::base_index()) as usize]
    }

    /// The canonical defining instruction of a constant.
    pub fn inst_of(&self, id: ConstantId) -> InstId {
        self.get(id).inst_id
    }

    /// Whether a constant depends on generic bindings. Sentinels are not
    /// symbolic.
    pub fn is_symbolic(&self, id: ConstantId) -> bool {
        id.is_constant() && matches!(self.get(id).kind, ConstantKind::Symbolic { .. })
    }

    /// The eval-block slot of a symbolic constant, if its region has been
    /// sealed.
    pub fn slot(&self, id: ConstantId) -> Option<EvalSlot> {
        match self.get(id).kind {
            ConstantKind::Symbolic { slot } => slot,
            ConstantKind::Concrete => None,
        }
    }

    /// Assign a symbolic constant's eval-block slot. Written at most once,
    /// when the defining region is sealed.
    pub fn set_slot(&mut self, id: ConstantId, new_slot: EvalSlot) {
        let index = (id.index() - Self::base_index()) as usize;
        match &mut self.infos[index].kind {
            ConstantKind::Symbolic { slot } => {
                debug_assert!(slot.is_none(), "eval slot of {id} assigned twice");
                *slot = Some(new_slot);
            }
            ConstantKind::Concrete => {
                debug_assert!(false, "{id} is concrete and has no eval slot");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_identity::BindIndex;

    use crate::types::TypeId;

    #[test]
    fn sentinels_are_distinct() {
        assert!(ConstantId::UNKNOWN.is_unknown());
        assert!(ConstantId::NOT_CONSTANT.is_not_constant());
        assert!(!ConstantId::UNKNOWN.is_constant());
        assert!(!ConstantId::NOT_CONSTANT.is_constant());
        assert_ne!(ConstantId::UNKNOWN, ConstantId::NOT_CONSTANT);
    }

    #[test]
    fn concrete_constants_deduplicate() {
        let mut insts = InstStore::new();
        let mut constants = ConstantStore::new();

        let three = insts.add(Inst::IntValue { value: 3 });
        let c3 = constants.concrete(three, insts.get(three));
        insts.set_constant_value(three, c3);

        // A second literal with the same value shares the constant; the
        // canonical instruction stays the first one.
        let three_again = insts.add(Inst::IntValue { value: 3 });
        let c3_again = constants.concrete(three_again, insts.get(three_again));
        assert_eq!(c3, c3_again);
        assert_eq!(constants.inst_of(c3), three);

        let four = insts.add(Inst::IntValue { value: 4 });
        let c4 = constants.concrete(four, insts.get(four));
        assert_ne!(c3, c4);
    }

    #[test]
    fn folding_allocates_a_canonical_inst() {
        let mut insts = InstStore::new();
        let mut constants = ConstantStore::new();

        let c7 = constants.concrete_for(&mut insts, Inst::IntValue { value: 7 });
        assert!(c7.is_constant());
        let canonical = constants.inst_of(c7);
        assert_eq!(insts.get(canonical), Inst::IntValue { value: 7 });
        assert_eq!(insts.constant_value(canonical), c7);

        // Re-folding the same value reuses the constant and the inst.
        let before = insts.len();
        assert_eq!(constants.concrete_for(&mut insts, Inst::IntValue { value: 7 }), c7);
        assert_eq!(insts.len(), before);
    }

    #[test]
    fn symbolic_constants_are_per_instruction() {
        let mut insts = InstStore::new();
        let mut constants = ConstantStore::new();

        let t = insts.add(Inst::BindSymbolic {
            bind_index: BindIndex::new(0),
            type_id: TypeId::TYPE,
        });
        let u = insts.add(Inst::BindSymbolic {
            bind_index: BindIndex::new(0),
            type_id: TypeId::TYPE,
        });
        let ct = constants.symbolic(t);
        let cu = constants.symbolic(u);
        assert_ne!(ct, cu);
        assert!(constants.is_symbolic(ct));
        assert_eq!(constants.slot(ct), None);

        let slot = EvalSlot {
            generic_id: GenericId::new(0),
            region: Region::Declaration,
            offset: 0,
        };
        constants.set_slot(ct, slot);
        assert_eq!(constants.slot(ct), Some(slot));
        assert_eq!(constants.slot(cu), None);
    }
}
