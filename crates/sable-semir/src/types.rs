//! Interned types, identified by their defining constants.
//!
//! A type is a compile-time value, so the store keeps no structure of its
//! own: each `TypeId` maps to the `ConstantId` of the type value that
//! defines it, and a reverse map makes the constant-to-type direction a
//! read-only lookup. That reverse direction is what lets substitution
//! queries turn a substituted type constant back into a `TypeId` without
//! mutating anything.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::constant::ConstantId;

/// Handle to an interned type.
///
/// Reserved low indices cover the invalid sentinel and the types
/// pre-interned by `SemIr::new()`; everything from `FIRST_DYNAMIC` up is
/// allocated on demand (symbolic binding types, in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// Invalid type (must be 0 for the store's seeding order).
    pub const INVALID: TypeId = TypeId(0);
    /// The type `type`.
    pub const TYPE: TypeId = TypeId(1);
    /// The integer type.
    pub const INT: TypeId = TypeId(2);
    /// The boolean type.
    pub const BOOL: TypeId = TypeId(3);

    /// First non-reserved index.
    pub const FIRST_DYNAMIC: u32 = 4;

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "type<invalid>")
        } else {
            write!(f, "type{}", self.0)
        }
    }
}

/// Per-compilation type store.
#[derive(Debug)]
pub struct TypeStore {
    /// Defining constant of each type, indexed by TypeId.
    constants: Vec<ConstantId>,
    /// Reverse map for read-only constant-to-type lookups.
    by_constant: FxHashMap<ConstantId, TypeId>,
}

impl TypeStore {
    pub fn new() -> Self {
        let mut store = Self {
            constants: Vec::new(),
            by_constant: FxHashMap::default(),
        };
        // Seed the invalid type at index 0. It has no defining constant.
        let invalid = store.push(ConstantId::UNKNOWN);
        debug_assert_eq!(invalid, TypeId::INVALID);
        store
    }

    fn push(&mut self, constant_id: ConstantId) -> TypeId {
        let id = TypeId(self.constants.len() as u32);
        self.constants.push(constant_id);
        id
    }

    /// Intern the type defined by a type-valued constant, returning the
    /// existing id if one was interned before.
    pub fn intern_for_constant(&mut self, constant_id: ConstantId) -> TypeId {
        debug_assert!(constant_id.is_constant(), "cannot intern a type for {constant_id}");
        if let Some(&id) = self.by_constant.get(&constant_id) {
            return id;
        }
        let id = self.push(constant_id);
        self.by_constant.insert(constant_id, id);
        id
    }

    /// The defining constant of a type.
    pub fn constant_of(&self, id: TypeId) -> ConstantId {
        self.constants[id.index() as usize]
    }

    /// Read-only reverse lookup: the type defined by `constant_id`, or
    /// `TypeId::INVALID` if no such type has been interned.
    pub fn for_constant(&self, constant_id: ConstantId) -> TypeId {
        self.by_constant
            .get(&constant_id)
            .copied()
            .unwrap_or(TypeId::INVALID)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantStore;
    use crate::inst::{Inst, InstStore};

    #[test]
    fn interning_roundtrips() {
        let mut insts = InstStore::new();
        let mut constants = ConstantStore::new();
        let mut types = TypeStore::new();

        let c = constants.concrete_for(&mut insts, Inst::IntType);
        let t = types.intern_for_constant(c);
        assert_eq!(types.intern_for_constant(c), t);
        assert_eq!(types.constant_of(t), c);
        assert_eq!(types.for_constant(c), t);
    }

    #[test]
    fn uninterned_constant_has_no_type() {
        let mut insts = InstStore::new();
        let mut constants = ConstantStore::new();
        let types = TypeStore::new();

        let c = constants.concrete_for(&mut insts, Inst::BoolType);
        assert_eq!(types.for_constant(c), TypeId::INVALID);
    }
}
