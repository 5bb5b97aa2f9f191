//! Substitution queries: read-only projections over resolved value blocks.
//!
//! Given a specific and a constant, instruction, or type defined in the
//! generic's scope, these return the corresponding substituted value for
//! that specific - if it has already been computed. They never trigger
//! evaluation; driving resolution is the checking pipeline's job. That
//! makes them safe to call speculatively, e.g. from diagnostics.
//!
//! "Not yet computed" comes back as `ConstantId::UNKNOWN` (or
//! `TypeId::INVALID` for types); "known to be runtime-phase" comes back as
//! `ConstantId::NOT_CONSTANT`. The two are never conflated.

use sable_identity::{InstId, SpecificId};

use crate::constant::ConstantId;
use crate::ir::SemIr;
use crate::types::TypeId;

/// The substituted value of a constant within a specific.
///
/// Concrete constants and the sentinels pass through unchanged. A symbolic
/// constant is looked up by its eval-block slot in the specific's value
/// block for the corresponding region; `UNKNOWN` if that region has not
/// been resolved for this specific.
pub fn constant_in_specific(
    ir: &SemIr,
    specific_id: SpecificId,
    constant_id: ConstantId,
) -> ConstantId {
    if !ir.constants.is_symbolic(constant_id) {
        return constant_id;
    }
    // A symbolic constant gets its slot when its region is sealed; before
    // that there is nothing to look up.
    let Some(slot) = ir.constants.slot(constant_id) else {
        return ConstantId::UNKNOWN;
    };
    let specific = ir.specifics.get(specific_id);
    if specific.generic_id != slot.generic_id {
        debug_assert!(
            false,
            "{constant_id} belongs to {}, not {}",
            slot.generic_id, specific.generic_id
        );
        return ConstantId::UNKNOWN;
    }
    let Some(block) = specific.value_block(slot.region) else {
        return ConstantId::UNKNOWN;
    };
    let value_inst = ir.inst_blocks.get(block)[slot.offset as usize];
    if !value_inst.is_valid() {
        return ConstantId::NOT_CONSTANT;
    }
    ir.insts.constant_value(value_inst)
}

/// The substituted constant value of an instruction within a specific.
pub fn constant_value_in_specific(
    ir: &SemIr,
    specific_id: SpecificId,
    inst_id: InstId,
) -> ConstantId {
    constant_in_specific(ir, specific_id, ir.insts.constant_value(inst_id))
}

/// The substituted value of a type within a specific, or `TypeId::INVALID`
/// if it is not yet known.
pub fn type_in_specific(ir: &SemIr, specific_id: SpecificId, type_id: TypeId) -> TypeId {
    let constant_id = ir.types.constant_of(type_id);
    let substituted = constant_in_specific(ir, specific_id, constant_id);
    if !substituted.is_constant() {
        return TypeId::INVALID;
    }
    ir.types.for_constant(substituted)
}
