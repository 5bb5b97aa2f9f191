//! Generic entities and their deduplicated specifics.
//!
//! A `Generic` is a compile-time-parameterized entity (function, class, or
//! interface) in its unsubstituted form. A `Specific` is one concrete
//! instantiation of a generic for one canonical argument list. Both live in
//! append-only stores addressed by stable index; the specific store also
//! maintains the deduplication table that guarantees a single specific per
//! (generic, argument-list) equivalence class.
//!
//! Both record types carry two write-once instruction-block fields, one per
//! region of the generic's lifecycle: eval blocks on the generic (sealed
//! when checking finishes the region) and value blocks on the specific
//! (written when the region is resolved for that specific, which may be
//! much later than its creation, or never).

use std::fmt;
use std::mem;

use rustc_hash::FxHashMap;
use sable_identity::{GenericId, InstBlockId, InstId, SpecificId};
use serde::Serialize;

/// The two independently-sealed regions of a generic's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Declaration,
    Definition,
}

/// One generic entity. Immutable identity, created once per entity.
#[derive(Debug, Clone)]
pub struct Generic {
    /// The first declaration of the entity.
    pub decl_id: InstId,
    /// Block of compile-time binding instructions in this generic's scope.
    /// A binding's position in this block is its bind index, and argument
    /// lists are matched to it positionally.
    pub bindings_id: InstBlockId,
    /// The specific whose argument list maps every binding to itself, e.g.
    /// `Vector(T)` for `Vector(T:! type)`.
    pub self_specific_id: SpecificId,

    decl_eval_block: Option<InstBlockId>,
    definition_eval_block: Option<InstBlockId>,
}

impl Generic {
    /// The eval block for a region: the instructions to re-evaluate, under
    /// substitution, to compute that region's values for a specific.
    /// `None` until checking seals the region.
    pub fn eval_block(&self, region: Region) -> Option<InstBlockId> {
        match region {
            Region::Declaration => self.decl_eval_block,
            Region::Definition => self.definition_eval_block,
        }
    }
}

impl fmt::Display for Generic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{decl: {}, bindings: {}}}", self.decl_id, self.bindings_id)
    }
}

/// Append-only storage for generics.
#[derive(Debug, Default)]
pub struct GenericStore {
    generics: Vec<Generic>,
}

impl GenericStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new generic with unset eval blocks. The self specific is
    /// registered separately, once the id exists to build it from.
    pub fn add(&mut self, decl_id: InstId, bindings_id: InstBlockId) -> GenericId {
        let id = GenericId::new(self.generics.len() as u32);
        self.generics.push(Generic {
            decl_id,
            bindings_id,
            self_specific_id: SpecificId::INVALID,
            decl_eval_block: None,
            definition_eval_block: None,
        });
        id
    }

    pub fn get(&self, id: GenericId) -> &Generic {
        &self.generics[id.index() as usize]
    }

    pub fn get_mut(&mut self, id: GenericId) -> &mut Generic {
        &mut self.generics[id.index() as usize]
    }

    /// Seal a region's eval block. Written at most once per region.
    pub fn set_eval_block(&mut self, id: GenericId, region: Region, block: InstBlockId) {
        let generic = self.get_mut(id);
        let slot = match region {
            Region::Declaration => &mut generic.decl_eval_block,
            Region::Definition => &mut generic.definition_eval_block,
        };
        debug_assert!(slot.is_none(), "{region:?} eval block of {id} sealed twice");
        *slot = Some(block);
    }

    pub(crate) fn set_self_specific(&mut self, id: GenericId, specific_id: SpecificId) {
        let generic = self.get_mut(id);
        debug_assert!(!generic.self_specific_id.is_valid());
        generic.self_specific_id = specific_id;
    }

    /// The self specific of a generic, or `SpecificId::INVALID` when `id`
    /// is itself invalid. Invalidity propagates instead of asserting so
    /// that call sites holding an optional generic stay branch-free.
    pub fn self_specific(&self, id: GenericId) -> SpecificId {
        if id.is_valid() {
            self.get(id).self_specific_id
        } else {
            SpecificId::INVALID
        }
    }

    pub fn len(&self) -> usize {
        self.generics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generics.is_empty()
    }
}

/// One specific: a concrete instantiation of a generic.
#[derive(Debug, Clone)]
pub struct Specific {
    /// The generic this instantiates.
    pub generic_id: GenericId,
    /// Canonical block of argument values, positionally aligned with the
    /// generic's bindings block.
    pub args_id: InstBlockId,

    decl_value_block: Option<InstBlockId>,
    definition_value_block: Option<InstBlockId>,
}

impl Specific {
    /// The value block for a region: the substituted results of running the
    /// generic's eval block for this specific. `None` until the region is
    /// resolved for this specific.
    pub fn value_block(&self, region: Region) -> Option<InstBlockId> {
        match region {
            Region::Declaration => self.decl_value_block,
            Region::Definition => self.definition_value_block,
        }
    }
}

impl fmt::Display for Specific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{generic: {}, args: {}}}", self.generic_id, self.args_id)
    }
}

/// One row of the structured instance-table dump.
#[derive(Debug, Clone, Serialize)]
pub struct SpecificDump {
    pub id: u32,
    pub generic: u32,
    pub args: u32,
}

/// Append-only storage for specifics, plus the deduplication table.
///
/// The table is keyed on `(GenericId, InstBlockId)`. Argument blocks are
/// canonical (interned upstream), so componentwise-identical argument lists
/// share one block id and key equality is plain id equality - no structural
/// comparison happens here, by contract.
///
/// Tracks hit/miss statistics for debugging instantiation behavior.
#[derive(Debug, Default)]
pub struct SpecificStore {
    specifics: Vec<Specific>,
    lookup: FxHashMap<(GenericId, InstBlockId), SpecificId>,
    hits: u64,
    misses: u64,
}

impl SpecificStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the existing specific for `(generic_id, args_id)`, or add a new
    /// one with unset value blocks. Idempotent: equal arguments always
    /// yield the same id, no matter how many specifics were created in
    /// between.
    ///
    /// `args_id` must be a canonical instruction block whose length matches
    /// the generic's binding count; `SemIr::get_or_add_specific` is the
    /// entry point that checks both.
    pub fn get_or_add(&mut self, generic_id: GenericId, args_id: InstBlockId) -> SpecificId {
        if let Some(&id) = self.lookup.get(&(generic_id, args_id)) {
            self.hits += 1;
            tracing::trace!(%generic_id, %args_id, %id, "specific lookup hit");
            return id;
        }
        self.misses += 1;
        let id = SpecificId::new(self.specifics.len() as u32);
        self.specifics.push(Specific {
            generic_id,
            args_id,
            decl_value_block: None,
            definition_value_block: None,
        });
        self.lookup.insert((generic_id, args_id), id);
        tracing::trace!(%generic_id, %args_id, %id, "specific created");
        id
    }

    pub fn get(&self, id: SpecificId) -> &Specific {
        &self.specifics[id.index() as usize]
    }

    pub fn get_mut(&mut self, id: SpecificId) -> &mut Specific {
        &mut self.specifics[id.index() as usize]
    }

    /// Record a region's value block. Written at most once per specific and
    /// region; the phased evaluation driver is the only caller.
    pub fn set_value_block(&mut self, id: SpecificId, region: Region, block: InstBlockId) {
        let specific = self.get_mut(id);
        let slot = match region {
            Region::Declaration => &mut specific.decl_value_block,
            Region::Definition => &mut specific.definition_value_block,
        };
        debug_assert!(slot.is_none(), "{region:?} of {id} resolved twice");
        *slot = Some(block);
    }

    pub fn len(&self) -> usize {
        self.specifics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifics.is_empty()
    }

    /// Structured dump of the whole instance table, for debugging and
    /// serialization tooling.
    pub fn dump(&self) -> Vec<SpecificDump> {
        self.specifics
            .iter()
            .enumerate()
            .map(|(index, specific)| SpecificDump {
                id: index as u32,
                generic: specific.generic_id.index(),
                args: specific.args_id.index(),
            })
            .collect()
    }

    /// Approximate bytes held by the instance table and its dedup index.
    pub fn mem_usage(&self) -> usize {
        self.specifics.capacity() * mem::size_of::<Specific>()
            + self.lookup.capacity()
                * mem::size_of::<((GenericId, InstBlockId), SpecificId)>()
    }

    // ========================================================================
    // Lookup metrics
    // ========================================================================

    pub fn hit_count(&self) -> u64 {
        self.hits
    }

    pub fn miss_count(&self) -> u64 {
        self.misses
    }

    /// Lookup hit rate as a percentage. Returns 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_generic() -> (GenericStore, SpecificStore, GenericId) {
        let mut generics = GenericStore::new();
        let id = generics.add(InstId::new(0), InstBlockId::new(0));
        (generics, SpecificStore::new(), id)
    }

    #[test]
    fn get_or_add_is_idempotent() {
        let (_, mut specifics, g) = store_with_generic();
        let args = InstBlockId::new(1);
        let first = specifics.get_or_add(g, args);
        let second = specifics.get_or_add(g, args);
        assert_eq!(first, second);
        assert_eq!(specifics.len(), 1);
        assert_eq!(specifics.hit_count(), 1);
        assert_eq!(specifics.miss_count(), 1);
    }

    #[test]
    fn distinct_args_make_distinct_specifics() {
        let (_, mut specifics, g) = store_with_generic();
        let a = specifics.get_or_add(g, InstBlockId::new(1));
        let b = specifics.get_or_add(g, InstBlockId::new(2));
        assert_ne!(a, b);
        assert_eq!(specifics.len(), 2);
    }

    #[test]
    fn ids_stay_stable_as_the_table_grows() {
        let (_, mut specifics, g) = store_with_generic();
        let first = specifics.get_or_add(g, InstBlockId::new(1));
        for i in 2..100 {
            specifics.get_or_add(g, InstBlockId::new(i));
        }
        assert_eq!(specifics.get_or_add(g, InstBlockId::new(1)), first);
        assert_eq!(specifics.get(first).args_id, InstBlockId::new(1));
    }

    #[test]
    fn eval_blocks_seal_independently_per_region() {
        let (mut generics, _, g) = store_with_generic();
        assert_eq!(generics.get(g).eval_block(Region::Declaration), None);
        assert_eq!(generics.get(g).eval_block(Region::Definition), None);

        // Definition first, then declaration: the regions are independent.
        generics.set_eval_block(g, Region::Definition, InstBlockId::new(5));
        generics.set_eval_block(g, Region::Declaration, InstBlockId::new(4));
        assert_eq!(
            generics.get(g).eval_block(Region::Declaration),
            Some(InstBlockId::new(4))
        );
        assert_eq!(
            generics.get(g).eval_block(Region::Definition),
            Some(InstBlockId::new(5))
        );
    }

    #[test]
    #[should_panic(expected = "sealed twice")]
    #[cfg(debug_assertions)]
    fn double_sealing_a_region_is_rejected() {
        let (mut generics, _, g) = store_with_generic();
        generics.set_eval_block(g, Region::Declaration, InstBlockId::new(4));
        generics.set_eval_block(g, Region::Declaration, InstBlockId::new(5));
    }

    #[test]
    #[should_panic(expected = "resolved twice")]
    #[cfg(debug_assertions)]
    fn double_resolving_a_region_is_rejected() {
        let (_, mut specifics, g) = store_with_generic();
        let s = specifics.get_or_add(g, InstBlockId::new(1));
        specifics.set_value_block(s, Region::Definition, InstBlockId::new(6));
        specifics.set_value_block(s, Region::Definition, InstBlockId::new(7));
    }

    #[test]
    fn self_specific_propagates_invalidity() {
        let (mut generics, mut specifics, g) = store_with_generic();
        let s = specifics.get_or_add(g, InstBlockId::new(0));
        generics.set_self_specific(g, s);
        assert_eq!(generics.self_specific(g), s);
        assert_eq!(generics.self_specific(GenericId::INVALID), SpecificId::INVALID);
    }

    #[test]
    fn display_formats() {
        let (mut generics, mut specifics, g) = store_with_generic();
        let s = specifics.get_or_add(g, InstBlockId::new(2));
        assert_eq!(generics.get(g).to_string(), "{decl: inst0, bindings: block0}");
        assert_eq!(
            specifics.get(s).to_string(),
            "{generic: generic0, args: block2}"
        );
        generics.set_self_specific(g, s);

        let dump = specifics.dump();
        assert_eq!(dump.len(), 1);
        assert_eq!(dump[0].id, 0);
        assert_eq!(dump[0].generic, 0);
        assert_eq!(dump[0].args, 2);

        assert!(specifics.mem_usage() > 0);
    }
}
