//! Checking context: the mutable view of the IR the driver works through.
//!
//! `Context` wraps the IR for one compilation unit and tracks the generic
//! region currently being checked. Adding an instruction through the
//! context classifies its constant phase immediately and, inside a generic
//! region, collects binding-dependent instructions so the region's eval
//! block can be sealed in one step when checking finishes it.

use sable_identity::{GenericId, InstBlockId, InstId};
use sable_semir::{EvalSlot, Inst, Region, SemIr, TypeId};

use crate::errors::EvalError;
use crate::eval::eval_inst;

/// Instructions collected for the generic region being checked.
struct RegionBuilder {
    kind: Region,
    dependent_insts: Vec<InstId>,
}

/// Mutable checking state over one compilation unit's IR.
pub struct Context<'ir> {
    ir: &'ir mut SemIr,
    region: Option<RegionBuilder>,
}

impl<'ir> Context<'ir> {
    pub fn new(ir: &'ir mut SemIr) -> Self {
        Self { ir, region: None }
    }

    pub fn ir(&self) -> &SemIr {
        self.ir
    }

    pub fn ir_mut(&mut self) -> &mut SemIr {
        self.ir
    }

    /// Add an instruction and classify its constant phase.
    ///
    /// Type-valued constants are interned into the type store as they
    /// appear, which is what keeps the substitution queries' reverse
    /// constant-to-type lookup total without ever mutating on the query
    /// path. Symbolically-constant instructions are collected into the
    /// active generic region, if any.
    pub fn add_inst(&mut self, inst: Inst) -> Result<InstId, EvalError> {
        let inst_id = self.ir.insts.add(inst);
        let constant_id = eval_inst(self, inst_id, inst)?;
        self.ir.insts.set_constant_value(inst_id, constant_id);
        if constant_id.is_constant() && inst.type_id() == TypeId::TYPE {
            self.ir.types.intern_for_constant(constant_id);
        }
        if self.ir.constants.is_symbolic(constant_id) {
            if let Some(builder) = &mut self.region {
                builder.dependent_insts.push(inst_id);
            }
        }
        Ok(inst_id)
    }

    /// Begin checking a generic region. Regions do not nest.
    pub fn start_region(&mut self, kind: Region) {
        debug_assert!(self.region.is_none(), "generic regions do not nest");
        self.region = Some(RegionBuilder {
            kind,
            dependent_insts: Vec::new(),
        });
    }

    /// Finish checking the current generic region: freeze its eval block
    /// into the generic, assign each collected symbolic constant its slot,
    /// and seal the region. Returns the sealed eval block.
    pub fn finish_region(&mut self, generic_id: GenericId) -> InstBlockId {
        let Some(builder) = self.region.take() else {
            debug_assert!(false, "no generic region in progress");
            return InstBlockId::INVALID;
        };
        let block = self.ir.inst_blocks.add(&builder.dependent_insts);
        for (offset, &inst_id) in builder.dependent_insts.iter().enumerate() {
            let constant_id = self.ir.insts.constant_value(inst_id);
            self.ir.constants.set_slot(
                constant_id,
                EvalSlot {
                    generic_id,
                    region: builder.kind,
                    offset: offset as u32,
                },
            );
        }
        self.ir.generics.set_eval_block(generic_id, builder.kind, block);
        tracing::trace!(%generic_id, region = ?builder.kind, %block, "generic region sealed");
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_identity::BindIndex;
    use sable_semir::ConstantId;

    #[test]
    fn add_inst_records_constant_phase() {
        let mut ir = SemIr::new();
        let mut ctx = Context::new(&mut ir);

        let three = ctx.add_inst(Inst::IntValue { value: 3 }).unwrap();
        assert!(ctx.ir().insts.constant_value(three).is_constant());

        let param = ctx
            .add_inst(Inst::Param {
                type_id: TypeId::INT,
            })
            .unwrap();
        assert_eq!(
            ctx.ir().insts.constant_value(param),
            ConstantId::NOT_CONSTANT
        );
    }

    #[test]
    fn region_collects_binding_dependent_insts() {
        let mut ir = SemIr::new();
        let mut ctx = Context::new(&mut ir);

        ctx.start_region(Region::Declaration);
        let t = ctx
            .add_inst(Inst::BindSymbolic {
                bind_index: BindIndex::new(0),
                type_id: TypeId::TYPE,
            })
            .unwrap();
        // Concrete instructions are not binding-dependent and stay out of
        // the eval block.
        let lit = ctx.add_inst(Inst::IntValue { value: 1 }).unwrap();

        let decl = ctx.add_inst(Inst::Decl).unwrap();
        let bindings = ctx.ir_mut().inst_blocks.add_canonical(&[t]);
        let g = ctx.ir_mut().make_generic(decl, bindings);
        let eval_block = ctx.finish_region(g);

        assert_eq!(ctx.ir().inst_blocks.get(eval_block), &[t]);
        assert!(!ctx.ir().inst_blocks.get(eval_block).contains(&lit));

        let t_constant = ctx.ir().insts.constant_value(t);
        let slot = ctx.ir().constants.slot(t_constant).unwrap();
        assert_eq!(slot.generic_id, g);
        assert_eq!(slot.region, Region::Declaration);
        assert_eq!(slot.offset, 0);
    }

    #[test]
    fn symbolic_type_bindings_are_interned_as_types() {
        let mut ir = SemIr::new();
        let mut ctx = Context::new(&mut ir);

        let t = ctx
            .add_inst(Inst::BindSymbolic {
                bind_index: BindIndex::new(0),
                type_id: TypeId::TYPE,
            })
            .unwrap();
        let t_constant = ctx.ir().insts.constant_value(t);
        let t_type = ctx.ir().types.for_constant(t_constant);
        assert!(!t_type.is_invalid());
        assert_eq!(ctx.ir().types.constant_of(t_type), t_constant);
    }
}
