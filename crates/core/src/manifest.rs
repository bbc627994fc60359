//! Material manifests produced by the calculation engine.

use serde::{Deserialize, Serialize};

/// The materials and quantities computed for a repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialManifest {
    /// Total covered area in square feet
    pub total_area: f64,

    /// Material lines in fixed application order
    pub materials: Vec<MaterialLine>,
}

/// A single material line. Quantities are whole purchasable units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
}

impl MaterialManifest {
    /// Look up a line by material name.
    pub fn line(&self, name: &str) -> Option<&MaterialLine> {
        self.materials.iter().find(|m| m.name == name)
    }
}
