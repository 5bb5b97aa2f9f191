//! The semantic IR for one compilation unit.
//!
//! `SemIr` owns every store and carries the cross-store operations that no
//! single store can do alone: seeding the reserved types, creating a
//! generic together with its self specific, and the checked entry point for
//! instantiation requests.
//!
//! Single-threaded by design: one checking pipeline mutates the IR
//! sequentially, every store is append-only, and every post-creation write
//! is write-once, so indices handed out here may be cached freely anywhere
//! in the compiler.

use sable_identity::{GenericId, InstBlockId, InstId, SpecificId};

use crate::constant::ConstantStore;
use crate::generic::{GenericStore, SpecificStore};
use crate::inst::{Inst, InstBlockStore, InstIdVec, InstStore};
use crate::types::{TypeId, TypeStore};

/// All IR stores for one compilation unit.
#[derive(Debug)]
pub struct SemIr {
    pub insts: InstStore,
    pub inst_blocks: InstBlockStore,
    pub constants: ConstantStore,
    pub types: TypeStore,
    pub generics: GenericStore,
    pub specifics: SpecificStore,
}

impl SemIr {
    /// Create an IR with the reserved types pre-interned.
    pub fn new() -> Self {
        let mut ir = Self {
            insts: InstStore::new(),
            inst_blocks: InstBlockStore::new(),
            constants: ConstantStore::new(),
            types: TypeStore::new(),
            generics: GenericStore::new(),
            specifics: SpecificStore::new(),
        };

        // Pre-intern the type values in the order fixed by the TypeId
        // constants. The debug_asserts verify the constants match the
        // interned indices.
        let ty = ir.seed_type(Inst::TypeType);
        debug_assert_eq!(ty, TypeId::TYPE);
        let int = ir.seed_type(Inst::IntType);
        debug_assert_eq!(int, TypeId::INT);
        let bool_ = ir.seed_type(Inst::BoolType);
        debug_assert_eq!(bool_, TypeId::BOOL);

        ir
    }

    fn seed_type(&mut self, inst: Inst) -> TypeId {
        let inst_id = self.insts.add(inst);
        let constant_id = self.constants.concrete(inst_id, inst);
        self.insts.set_constant_value(inst_id, constant_id);
        self.types.intern_for_constant(constant_id)
    }

    /// The canonical instruction for a reserved type value. Useful when
    /// building argument lists out of the pre-interned types.
    pub fn type_inst(&self, type_id: TypeId) -> InstId {
        self.constants.inst_of(self.types.constant_of(type_id))
    }

    /// Create a generic entity together with its self specific - the
    /// instance whose argument list maps every binding to itself.
    pub fn make_generic(&mut self, decl_id: InstId, bindings_id: InstBlockId) -> GenericId {
        let generic_id = self.generics.add(decl_id, bindings_id);
        let bindings: InstIdVec = self.inst_blocks.get(bindings_id).iter().copied().collect();
        let args_id = self.inst_blocks.add_canonical(&bindings);
        let self_id = self.get_or_add_specific(generic_id, args_id);
        self.generics.set_self_specific(generic_id, self_id);
        tracing::debug!(%generic_id, %self_id, "generic created");
        generic_id
    }

    /// Checked entry point for instantiation requests. Argument
    /// canonicality and arity are caller contracts; both are validated
    /// defensively in debug builds before handing off to the dedup table.
    pub fn get_or_add_specific(
        &mut self,
        generic_id: GenericId,
        args_id: InstBlockId,
    ) -> SpecificId {
        debug_assert!(
            self.inst_blocks.is_canonical(args_id),
            "specific args {args_id} must be a canonical block"
        );
        debug_assert_eq!(
            self.inst_blocks.get(args_id).len(),
            self.inst_blocks
                .get(self.generics.get(generic_id).bindings_id)
                .len(),
            "argument count must match the binding count of {generic_id}"
        );
        self.specifics.get_or_add(generic_id, args_id)
    }
}

impl Default for SemIr {
    fn default() -> Self {
        Self::new()
    }
}
