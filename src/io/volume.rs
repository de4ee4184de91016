//! JSON volume documents for the command line
//!
//! A document carries the module palette with display colours, the filler,
//! the volume dimensions and the cell names in x-major order. Input
//! documents may also list pinned cells. Solved volumes are written back in
//! the same schema so they can be fed in again.

use crate::{
    io::error::{AlgorithmError, Result},
    registry::modules::{Module, ModuleId, ModuleRegistry},
    spatial::coordinates::{Coord, Extent},
};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// RGBA display colour carried as module payload
pub type Rgba = [u8; 4];

const fn transparent() -> Rgba {
    [0, 0, 0, 0]
}

/// A module type and its display colour
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Type name
    pub name: String,
    /// Display colour, transparent when omitted
    #[serde(default = "transparent")]
    pub color: Rgba,
}

/// A cell fixed to a module before solving
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinEntry {
    /// Cell coordinate `[x, y, z]`
    pub at: [usize; 3],
    /// Type name to commit
    pub module: String,
}

/// A labelled volume with its module palette
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDocument {
    /// Candidate modules in palette order
    pub modules: Vec<ModuleEntry>,
    /// Module used for unresolved cells
    pub filler: ModuleEntry,
    /// Dimensions `[x, y, z]`
    pub size: [usize; 3],
    /// Type names in x-major order
    pub cells: Vec<String>,
    /// Cells to pin before the random cycles start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinned: Vec<PinEntry>,
}

impl VolumeDocument {
    /// Read and validate a document
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The content is not a valid document
    /// - The cell count does not match the dimensions
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AlgorithmError::FileSystem {
            path: path.to_path_buf(),
            operation: "read volume",
            source,
        })?;
        let document: Self =
            serde_json::from_str(&text).map_err(|source| AlgorithmError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        document.validate()?;
        Ok(document)
    }

    /// Write the document as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| AlgorithmError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| AlgorithmError::FileSystem {
            path: path.to_path_buf(),
            operation: "write volume",
            source,
        })
    }

    /// Check that the dimensions and cell list agree
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::InvalidSourceData`] if a dimension is zero,
    /// the volume size overflows or the cell count differs from it
    pub fn validate(&self) -> Result<()> {
        let extent = self.extent();
        if extent.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!("volume size {extent} has an empty axis"),
            });
        }
        let Some(cell_count) = extent.checked_cell_count() else {
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!("volume size {extent} has more cells than can be addressed"),
            });
        };
        if self.cells.len() != cell_count {
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!(
                    "{} cells listed for a {extent} volume of {cell_count} cells",
                    self.cells.len()
                ),
            });
        }
        Ok(())
    }

    /// Volume dimensions
    pub const fn extent(&self) -> Extent {
        let [x, y, z] = self.size;
        Extent::new(x, y, z)
    }

    /// Build the registry described by the document, colours as payload
    ///
    /// # Errors
    ///
    /// Returns an error if the palette is empty or repeats a name
    pub fn registry(&self) -> Result<ModuleRegistry<Rgba>> {
        let palette = self
            .modules
            .iter()
            .map(|entry| Module::new(entry.name.clone(), entry.color))
            .collect();
        ModuleRegistry::new(
            palette,
            Module::new(self.filler.name.clone(), self.filler.color),
        )
    }

    /// Cell names as a volume
    ///
    /// # Errors
    ///
    /// Returns an error if the cell count does not match the dimensions
    pub fn volume(&self) -> Result<Array3<String>> {
        Array3::from_shape_vec(self.extent().shape(), self.cells.clone()).map_err(|source| {
            AlgorithmError::InvalidSourceData {
                reason: format!("cells do not fill a {} volume: {source}", self.extent()),
            }
        })
    }

    /// Pinned cells in listed order
    pub fn pins(&self) -> impl Iterator<Item = (Coord, &str)> {
        self.pinned
            .iter()
            .map(|pin| (Coord::from(pin.at), pin.module.as_str()))
    }

    /// Describe a solved volume with the palette of its registry
    pub fn from_solution(registry: &ModuleRegistry<Rgba>, volume: &Array3<ModuleId>) -> Self {
        let entry = |id: ModuleId| ModuleEntry {
            name: registry.name(id).to_string(),
            color: registry
                .get(id)
                .map_or_else(transparent, |module| *module.payload()),
        };
        let (x, y, z) = volume.dim();

        Self {
            modules: registry.palette().map(entry).collect(),
            filler: entry(registry.filler()),
            size: [x, y, z],
            cells: volume
                .iter()
                .map(|&id| registry.name(id).to_string())
                .collect(),
            pinned: Vec::new(),
        }
    }
}
