//! First-class identity types for semantic IR entities.
//!
//! These types provide type-safe indices into the IR stores, eliminating
//! raw-integer lookups and preventing mix-ups between entity kinds. All
//! stores are append-only, so an id, once issued, stays valid for the
//! lifetime of the compilation unit.
//!
//! Each id reserves `u32::MAX` as an explicit invalid sentinel. Invalid ids
//! are used to propagate "no such entity" through optional call sites and to
//! mark runtime-phase slots in value blocks.

use std::fmt;

/// Identity for an instruction in the instruction store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstId(u32);

impl InstId {
    /// Sentinel for "no instruction" (runtime-phase value-block slots).
    pub const INVALID: InstId = InstId(u32::MAX);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "inst{}", self.0)
        } else {
            write!(f, "inst<invalid>")
        }
    }
}

/// Identity for a block of instructions (bindings, args, eval and value
/// blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstBlockId(u32);

impl InstBlockId {
    /// Sentinel for "no block".
    pub const INVALID: InstBlockId = InstBlockId(u32::MAX);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for InstBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "block{}", self.0)
        } else {
            write!(f, "block<invalid>")
        }
    }
}

/// Identity for a generic entity (a compile-time-parameterized function,
/// class, or interface in its unsubstituted form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericId(u32);

impl GenericId {
    /// Sentinel for "not a generic" (e.g. a non-generic entity's record).
    pub const INVALID: GenericId = GenericId(u32::MAX);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for GenericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "generic{}", self.0)
        } else {
            write!(f, "generic<invalid>")
        }
    }
}

/// Identity for a specific: one concrete instantiation of a generic for one
/// canonical argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecificId(u32);

impl SpecificId {
    /// Sentinel propagated by lookups on invalid generics.
    pub const INVALID: SpecificId = SpecificId(u32::MAX);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for SpecificId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "specific{}", self.0)
        } else {
            write!(f, "specific<invalid>")
        }
    }
}

/// Position of a compile-time binding within its generic's bindings block.
/// Arguments are matched to bindings positionally through this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindIndex(u32);

impl BindIndex {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BindIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bind{}", self.0)
    }
}
