//! Module types, identities and name lookup
//!
//! Modules are the cell types a volume is built from. The core only ever
//! handles [`ModuleId`]s; the registry owns the modules themselves together
//! with whatever payload the host attached to them.

use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use ndarray::Array3;
use std::collections::HashMap;
use std::fmt;

/// Index of a module inside its registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Wrap a raw registry index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw registry index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named cell type with an opaque host payload
///
/// Equality only looks at the type name; the payload is never inspected.
#[derive(Clone, Debug)]
pub struct Module<P = ()> {
    name: String,
    payload: P,
}

impl<P> Module<P> {
    /// Create a module carrying a payload
    pub fn new(name: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// The module's type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The host payload
    pub const fn payload(&self) -> &P {
        &self.payload
    }
}

impl Module<()> {
    /// Create a module without payload
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, ())
    }
}

impl<P> PartialEq for Module<P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<P> Eq for Module<P> {}

/// Fixed set of modules plus the designated filler
///
/// The palette (the modules passed to [`ModuleRegistry::new`], in order) is
/// the initial candidate set of every output cell. The filler marks cells
/// that could not be resolved; it only becomes a candidate when it shares
/// its name with a palette module.
#[derive(Clone, Debug)]
pub struct ModuleRegistry<P = ()> {
    modules: Vec<Module<P>>,
    palette_len: usize,
    filler: ModuleId,
    by_name: HashMap<String, ModuleId>,
}

impl<P> ModuleRegistry<P> {
    /// Build a registry from the candidate palette and the filler module
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The palette is empty
    /// - Two palette modules share a type name
    pub fn new(palette: Vec<Module<P>>, filler: Module<P>) -> Result<Self> {
        if palette.is_empty() {
            return Err(invalid_parameter(
                "modules",
                &"[]",
                &"at least one module is required",
            ));
        }

        let mut by_name = HashMap::with_capacity(palette.len() + 1);
        for (index, module) in palette.iter().enumerate() {
            if by_name
                .insert(module.name.clone(), ModuleId(index))
                .is_some()
            {
                return Err(AlgorithmError::DuplicateModule {
                    name: module.name.clone(),
                });
            }
        }

        let palette_len = palette.len();
        let mut modules = palette;
        let filler = if let Some(&id) = by_name.get(&filler.name) {
            id
        } else {
            let id = ModuleId(modules.len());
            by_name.insert(filler.name.clone(), id);
            modules.push(filler);
            id
        };

        Ok(Self {
            modules,
            palette_len,
            filler,
            by_name,
        })
    }

    /// Find a module by type name
    pub fn lookup(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Find a module by type name, failing for unknown names
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::UnknownModule`] if no module has this name
    pub fn require(&self, name: &str) -> Result<ModuleId> {
        self.lookup(name)
            .ok_or_else(|| AlgorithmError::UnknownModule {
                name: name.to_string(),
            })
    }

    /// Access a module by id
    pub fn get(&self, id: ModuleId) -> Option<&Module<P>> {
        self.modules.get(id.0)
    }

    /// Type name of a module, empty for ids from another registry
    pub fn name(&self, id: ModuleId) -> &str {
        self.get(id).map_or("", Module::name)
    }

    /// The filler module used for unresolved cells
    pub const fn filler(&self) -> ModuleId {
        self.filler
    }

    /// Number of candidate modules
    pub const fn palette_len(&self) -> usize {
        self.palette_len
    }

    /// Candidate modules in palette order
    pub fn palette(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.palette_len).map(ModuleId)
    }

    /// Whether the id names a candidate module
    pub const fn is_candidate(&self, id: ModuleId) -> bool {
        id.0 < self.palette_len
    }

    /// Total number of modules including a separate filler
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Registries always hold at least one module
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules in id order
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module<P>)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, module)| (ModuleId(index), module))
    }

    /// Resolve a volume of type names into module ids
    ///
    /// Names missing from the registry become `None`. The second value lists
    /// every distinct unknown name in first-seen order.
    pub fn resolve_volume<S: AsRef<str>>(
        &self,
        names: &Array3<S>,
    ) -> (Array3<Option<ModuleId>>, Vec<String>) {
        let mut unknown: Vec<String> = Vec::new();
        let resolved = names.map(|name| {
            let name = name.as_ref();
            let id = self.lookup(name);
            if id.is_none() && !unknown.iter().any(|seen| seen == name) {
                unknown.push(name.to_string());
            }
            id
        });
        (resolved, unknown)
    }

    /// Type names of a volume of module ids
    pub fn names_of(&self, volume: &Array3<ModuleId>) -> Array3<String> {
        volume.map(|&id| self.name(id).to_string())
    }
}
