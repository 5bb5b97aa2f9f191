//! Instruction representation and storage.
//!
//! The instruction set is the minimal surface the generic machinery needs:
//! type values, literals, compile-time bindings, foldable integer
//! arithmetic, and a runtime parameter. Instructions are stored append-only
//! and addressed by `InstId`; each instruction's constant value is recorded
//! once, when the checking pipeline first evaluates it.

use rustc_hash::FxHashMap;
use sable_identity::{BindIndex, InstBlockId, InstId};
use smallvec::SmallVec;

use crate::constant::ConstantId;
use crate::types::TypeId;

/// One semantic IR instruction.
///
/// Instructions referencing other instructions do so by `InstId`; the ids
/// are stable for the lifetime of the compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inst {
    /// The type `type` itself. Its own type is `type`.
    TypeType,
    /// The integer type, as a type value.
    IntType,
    /// The boolean type, as a type value.
    BoolType,
    /// An integer literal.
    IntValue { value: i64 },
    /// A boolean literal.
    BoolValue { value: bool },
    /// A compile-time binding in a generic scope. `bind_index` is the
    /// binding's position in the enclosing generic's bindings block.
    BindSymbolic { bind_index: BindIndex, type_id: TypeId },
    /// Integer addition, foldable when both operands are constant.
    IntAdd { lhs: InstId, rhs: InstId },
    /// Integer division, foldable when both operands are constant.
    IntDiv { lhs: InstId, rhs: InstId },
    /// A runtime parameter reference. Never constant.
    Param { type_id: TypeId },
    /// A declaration of an entity. Stands in for the declaration
    /// instructions of the wider IR; generics point at one of these as
    /// their first declaration. Produces no value.
    Decl,
}

impl Inst {
    /// The type of the value this instruction produces.
    pub fn type_id(&self) -> TypeId {
        match self {
            Inst::TypeType | Inst::IntType | Inst::BoolType => TypeId::TYPE,
            Inst::IntValue { .. } | Inst::IntAdd { .. } | Inst::IntDiv { .. } => TypeId::INT,
            Inst::BoolValue { .. } => TypeId::BOOL,
            Inst::BindSymbolic { type_id, .. } | Inst::Param { type_id } => *type_id,
            Inst::Decl => TypeId::INVALID,
        }
    }
}

/// Append-only instruction store.
///
/// Alongside each instruction it keeps the instruction's constant value,
/// which starts as `ConstantId::UNKNOWN` and is written once when the
/// instruction is evaluated.
#[derive(Debug, Default)]
pub struct InstStore {
    insts: Vec<Inst>,
    constant_values: Vec<ConstantId>,
}

impl InstStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction, returning its id.
    pub fn add(&mut self, inst: Inst) -> InstId {
        let id = InstId::new(self.insts.len() as u32);
        self.insts.push(inst);
        self.constant_values.push(ConstantId::UNKNOWN);
        id
    }

    /// Get an instruction by id.
    pub fn get(&self, id: InstId) -> Inst {
        self.insts[id.index() as usize]
    }

    /// The constant value recorded for an instruction, or
    /// `ConstantId::UNKNOWN` if it has not been evaluated yet.
    pub fn constant_value(&self, id: InstId) -> ConstantId {
        self.constant_values[id.index() as usize]
    }

    /// Record an instruction's constant value. Written at most once.
    pub fn set_constant_value(&mut self, id: InstId, value: ConstantId) {
        let slot = &mut self.constant_values[id.index() as usize];
        debug_assert!(
            slot.is_unknown() || *slot == value,
            "constant value of {id} written twice"
        );
        *slot = value;
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

/// SmallVec for instruction-block contents - inline up to 4 ids (covers most
/// binding and argument lists).
pub type InstIdVec = SmallVec<[InstId; 4]>;

/// Storage for instruction blocks.
///
/// Two kinds of block live here: plain blocks (eval blocks and value
/// blocks, appended without deduplication) and canonical blocks (binding
/// and argument lists, interned so that componentwise-identical contents
/// share one id). Canonical block ids are what the instantiation dedup
/// table hashes, so argument-list equality reduces to id equality.
#[derive(Debug, Default)]
pub struct InstBlockStore {
    blocks: Vec<InstIdVec>,
    canonical: FxHashMap<InstIdVec, InstBlockId>,
}

impl InstBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain (non-interned) block.
    pub fn add(&mut self, insts: &[InstId]) -> InstBlockId {
        let id = InstBlockId::new(self.blocks.len() as u32);
        self.blocks.push(InstIdVec::from_slice(insts));
        id
    }

    /// Intern a canonical block, returning the existing id if a block with
    /// the same contents was interned before.
    pub fn add_canonical(&mut self, insts: &[InstId]) -> InstBlockId {
        let contents = InstIdVec::from_slice(insts);
        if let Some(&id) = self.canonical.get(&contents) {
            return id;
        }
        let id = InstBlockId::new(self.blocks.len() as u32);
        self.blocks.push(contents.clone());
        self.canonical.insert(contents, id);
        id
    }

    /// Get a block's contents.
    pub fn get(&self, id: InstBlockId) -> &[InstId] {
        &self.blocks[id.index() as usize]
    }

    /// Whether `id` is the canonical block for its contents.
    pub fn is_canonical(&self, id: InstBlockId) -> bool {
        let contents = &self.blocks[id.index() as usize];
        self.canonical.get(contents) == Some(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_types() {
        assert_eq!(Inst::IntType.type_id(), TypeId::TYPE);
        assert_eq!(Inst::IntValue { value: 3 }.type_id(), TypeId::INT);
        assert_eq!(Inst::BoolValue { value: true }.type_id(), TypeId::BOOL);
        assert_eq!(
            Inst::Param {
                type_id: TypeId::INT
            }
            .type_id(),
            TypeId::INT
        );
    }

    #[test]
    fn canonical_blocks_deduplicate() {
        let mut insts = InstStore::new();
        let a = insts.add(Inst::IntValue { value: 1 });
        let b = insts.add(Inst::IntValue { value: 2 });

        let mut blocks = InstBlockStore::new();
        let ab = blocks.add_canonical(&[a, b]);
        let ab_again = blocks.add_canonical(&[a, b]);
        let ba = blocks.add_canonical(&[b, a]);

        assert_eq!(ab, ab_again);
        assert_ne!(ab, ba);
        assert_eq!(blocks.get(ab), &[a, b]);
        assert!(blocks.is_canonical(ab));
    }

    #[test]
    fn plain_blocks_are_not_interned() {
        let mut insts = InstStore::new();
        let a = insts.add(Inst::IntValue { value: 1 });

        let mut blocks = InstBlockStore::new();
        let first = blocks.add(&[a]);
        let second = blocks.add(&[a]);
        assert_ne!(first, second);
        assert!(!blocks.is_canonical(first));

        let canonical = blocks.add_canonical(&[a]);
        assert_ne!(canonical, first);
        assert!(blocks.is_canonical(canonical));
    }
}
