//! Constant-phase classification and per-specific region evaluation.
//!
//! `eval_inst` is the single classification primitive: it decides whether
//! one instruction has constant phase (returning its folded or already-known
//! constant) or runtime phase (returning `ConstantId::NOT_CONSTANT`).
//!
//! `resolve_specific_region` is the only writer of a specific's value
//! blocks: it re-runs a sealed eval block with each binding replaced by the
//! specific's corresponding argument, classifying every instruction along
//! the way, and freezes the positionally-aligned results.

use rustc_hash::FxHashMap;
use sable_identity::{InstBlockId, InstId, SpecificId};
use sable_semir::{ConstantId, Inst, Region, SemIr, constant_value_in_specific};

use crate::context::Context;
use crate::errors::EvalError;

/// Determine the constant phase of `inst`, returning its constant value if
/// it has one. Runtime-phase instructions yield
/// `ConstantId::NOT_CONSTANT`.
pub fn eval_inst(
    ctx: &mut Context<'_>,
    inst_id: InstId,
    inst: Inst,
) -> Result<ConstantId, EvalError> {
    let ir = ctx.ir_mut();
    match inst {
        Inst::TypeType
        | Inst::IntType
        | Inst::BoolType
        | Inst::IntValue { .. }
        | Inst::BoolValue { .. } => Ok(ir.constants.concrete(inst_id, inst)),
        Inst::BindSymbolic { .. } => Ok(ir.constants.symbolic(inst_id)),
        Inst::IntAdd { lhs, rhs } | Inst::IntDiv { lhs, rhs } => {
            eval_int_op(ir, inst_id, inst, lhs, rhs)
        }
        Inst::Param { .. } | Inst::Decl => Ok(ConstantId::NOT_CONSTANT),
    }
}

/// Classify an integer operation from its operands' constants: fold when
/// both are concrete, stay symbolic when a binding is still involved, and
/// go runtime-phase otherwise.
fn eval_int_op(
    ir: &mut SemIr,
    inst_id: InstId,
    inst: Inst,
    lhs: InstId,
    rhs: InstId,
) -> Result<ConstantId, EvalError> {
    if !lhs.is_valid() || !rhs.is_valid() {
        return Ok(ConstantId::NOT_CONSTANT);
    }
    let lhs_constant = ir.insts.constant_value(lhs);
    let rhs_constant = ir.insts.constant_value(rhs);
    if !lhs_constant.is_constant() || !rhs_constant.is_constant() {
        return Ok(ConstantId::NOT_CONSTANT);
    }
    if ir.constants.is_symbolic(lhs_constant) || ir.constants.is_symbolic(rhs_constant) {
        // Still binding-dependent. Re-evaluation under a substitution that
        // leaves an operand symbolic (the self specific) must not mint a
        // second symbolic constant for the same instruction.
        let existing = ir.insts.constant_value(inst_id);
        if ir.constants.is_symbolic(existing) {
            return Ok(existing);
        }
        return Ok(ir.constants.symbolic(inst_id));
    }

    let (Some(lhs_value), Some(rhs_value)) = (
        int_value(ir, lhs_constant),
        int_value(ir, rhs_constant),
    ) else {
        debug_assert!(false, "non-integer operands on {inst_id}");
        return Ok(ConstantId::NOT_CONSTANT);
    };
    let value = match inst {
        Inst::IntAdd { .. } => lhs_value
            .checked_add(rhs_value)
            .ok_or(EvalError::IntegerOverflow)?,
        Inst::IntDiv { .. } => {
            if rhs_value == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs_value
                .checked_div(rhs_value)
                .ok_or(EvalError::IntegerOverflow)?
        }
        _ => unreachable!("not an integer operation"),
    };
    Ok(ir
        .constants
        .concrete_for(&mut ir.insts, Inst::IntValue { value }))
}

/// The integer value of a concrete constant, if its canonical instruction
/// is an integer literal.
fn int_value(ir: &SemIr, constant_id: ConstantId) -> Option<i64> {
    match ir.insts.get(ir.constants.inst_of(constant_id)) {
        Inst::IntValue { value } => Some(value),
        _ => None,
    }
}

/// Evaluate a region's eval block for a specific and freeze the resulting
/// value block. Each slot is positionally aligned with the eval block:
/// the substituted constant's canonical instruction, or `InstId::INVALID`
/// for a slot that came out runtime-phase.
///
/// Definition values may reference declaration values, so resolving the
/// definition region resolves the declaration region for this specific
/// first, when it is sealed and not yet resolved.
///
/// The generic's region must already be sealed, and this specific's region
/// must not have been resolved before; both are caller contracts.
pub fn resolve_specific_region(
    ctx: &mut Context<'_>,
    specific_id: SpecificId,
    region: Region,
) -> Result<InstBlockId, EvalError> {
    let (generic_id, args_id) = {
        let specific = ctx.ir().specifics.get(specific_id);
        debug_assert!(
            specific.value_block(region).is_none(),
            "{region:?} of {specific_id} resolved twice"
        );
        (specific.generic_id, specific.args_id)
    };
    if region == Region::Definition
        && ctx
            .ir()
            .specifics
            .get(specific_id)
            .value_block(Region::Declaration)
            .is_none()
        && ctx
            .ir()
            .generics
            .get(generic_id)
            .eval_block(Region::Declaration)
            .is_some()
    {
        resolve_specific_region(ctx, specific_id, Region::Declaration)?;
    }
    let Some(eval_block) = ctx.ir().generics.get(generic_id).eval_block(region) else {
        debug_assert!(
            false,
            "resolving {region:?} of {specific_id} before {generic_id} sealed it"
        );
        return Ok(InstBlockId::INVALID);
    };

    let eval_insts: Vec<InstId> = ctx.ir().inst_blocks.get(eval_block).to_vec();
    let args: Vec<InstId> = ctx.ir().inst_blocks.get(args_id).to_vec();

    // Substituted value instruction for each eval-block member, so that
    // later members see their operands already substituted.
    let mut value_of: FxHashMap<InstId, InstId> = FxHashMap::default();
    let mut values: Vec<InstId> = Vec::with_capacity(eval_insts.len());
    for &inst_id in &eval_insts {
        let value_inst = match ctx.ir().insts.get(inst_id) {
            Inst::BindSymbolic { bind_index, .. } => {
                let index = bind_index.index() as usize;
                debug_assert!(index < args.len(), "no argument for {bind_index}");
                args[index]
            }
            Inst::IntAdd { lhs, rhs } => {
                let substituted = Inst::IntAdd {
                    lhs: substituted_operand(ctx.ir(), specific_id, &value_of, lhs),
                    rhs: substituted_operand(ctx.ir(), specific_id, &value_of, rhs),
                };
                int_op_value_inst(ctx.ir_mut(), inst_id, substituted)?
            }
            Inst::IntDiv { lhs, rhs } => {
                let substituted = Inst::IntDiv {
                    lhs: substituted_operand(ctx.ir(), specific_id, &value_of, lhs),
                    rhs: substituted_operand(ctx.ir(), specific_id, &value_of, rhs),
                };
                int_op_value_inst(ctx.ir_mut(), inst_id, substituted)?
            }
            other => {
                // Eval blocks hold only binding-dependent instructions.
                debug_assert!(false, "unexpected {other:?} in eval block of {generic_id}");
                InstId::INVALID
            }
        };
        value_of.insert(inst_id, value_inst);
        values.push(value_inst);
    }

    let block = ctx.ir_mut().inst_blocks.add(&values);
    ctx.ir_mut().specifics.set_value_block(specific_id, region, block);
    tracing::trace!(%specific_id, ?region, %block, "specific region resolved");
    Ok(block)
}

/// The instruction an operand substitutes to for this specific: a value
/// computed earlier in the current block, a value from an
/// already-resolved region, or the operand itself.
fn substituted_operand(
    ir: &SemIr,
    specific_id: SpecificId,
    value_of: &FxHashMap<InstId, InstId>,
    operand: InstId,
) -> InstId {
    if let Some(&value_inst) = value_of.get(&operand) {
        return value_inst;
    }
    let constant_id = constant_value_in_specific(ir, specific_id, operand);
    if constant_id.is_constant() {
        ir.constants.inst_of(constant_id)
    } else {
        operand
    }
}

/// Classify a substituted integer operation and return the instruction to
/// put in its value-block slot.
fn int_op_value_inst(
    ir: &mut SemIr,
    inst_id: InstId,
    substituted: Inst,
) -> Result<InstId, EvalError> {
    let (lhs, rhs) = match substituted {
        Inst::IntAdd { lhs, rhs } | Inst::IntDiv { lhs, rhs } => (lhs, rhs),
        _ => unreachable!("not an integer operation"),
    };
    let constant_id = eval_int_op(ir, inst_id, substituted, lhs, rhs)?;
    if constant_id.is_constant() {
        Ok(ir.constants.inst_of(constant_id))
    } else {
        Ok(InstId::INVALID)
    }
}
