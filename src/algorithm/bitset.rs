use crate::registry::modules::ModuleId;
use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over the candidate palette
///
/// Bit `i` stands for `ModuleId::new(i)`. Used for cell candidate sets and
/// for the support flags gathered during propagation. Iteration always runs
/// in palette order, which keeps random draws over a set reproducible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSet {
    bits: BitVec,
}

impl ModuleSet {
    /// Create a set with no modules present
    pub fn new(palette_len: usize) -> Self {
        Self {
            bits: bitvec![0; palette_len],
        }
    }

    /// Create a set containing every palette module
    pub fn all(palette_len: usize) -> Self {
        Self {
            bits: bitvec![1; palette_len],
        }
    }

    /// Insert a module, ignoring ids outside the palette
    pub fn insert(&mut self, module: ModuleId) {
        if module.index() < self.bits.len() {
            self.bits.set(module.index(), true);
        }
    }

    /// Remove a module, returning whether it was present
    pub fn remove(&mut self, module: ModuleId) -> bool {
        let present = self.contains(module);
        if present {
            self.bits.set(module.index(), false);
        }
        present
    }

    /// Test module membership
    pub fn contains(&self, module: ModuleId) -> bool {
        self.bits.get(module.index()).as_deref() == Some(&true)
    }

    /// Keep only modules also present in `other`, returning how many were removed
    pub fn intersect_with(&mut self, other: &Self) -> usize {
        let before = self.count();
        self.bits &= &other.bits;
        before - self.count()
    }

    /// Whether every member of this set is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.iter_ones().all(|index| other.bits.get(index).as_deref() == Some(&true))
    }

    /// Remove every module
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Test if no modules are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count modules in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// The `n`-th member in palette order
    pub fn nth(&self, n: usize) -> Option<ModuleId> {
        self.bits.iter_ones().nth(n).map(ModuleId::new)
    }

    /// Members in palette order
    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.bits.iter_ones().map(ModuleId::new)
    }

    /// Extract all members as a vector
    pub fn to_vec(&self) -> Vec<ModuleId> {
        self.iter().collect()
    }
}

impl fmt::Display for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<usize> = self.bits.iter_ones().collect();
        write!(f, "ModuleSet({} modules: {members:?})", self.count())
    }
}
