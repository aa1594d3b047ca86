use super::buffer_system::BufferSystem;
use super::incompatibility::IncompatibilityRule;
use super::molmass::calculate_molar_mass;
use super::strong_acid_base::StrongAcidBase;
use crate::Utils::load_from_file::{load_json_from_file, parse_json_str};
use crate::error::{AcidBaseError, Result};
use log::{error, info, warn};
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

const BUILTIN_CATALOG: &str = include_str!("data/buffer_catalog.json");

/// declared molar mass may differ from the formula by this much before a warning, g/mol
const MOLAR_MASS_TOLERANCE: f64 = 0.5;

/// On-disk layout of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub buffers: Vec<BufferSystem>,
    #[serde(default)]
    pub strong_acids_bases: Vec<StrongAcidBase>,
    #[serde(default)]
    pub incompatibilities: Vec<IncompatibilityRule>,
}

/// Read-only registry of buffer systems, strong acids/bases and incompatibility rules.
/// Built once, then only borrowed.
#[derive(Debug, Clone, Default)]
pub struct BufferCatalog {
    buffers: HashMap<String, BufferSystem>,
    /// ids in catalog order
    order: Vec<String>,
    reagents: HashMap<String, StrongAcidBase>,
    reagent_order: Vec<String>,
    incompatibilities: Vec<IncompatibilityRule>,
}

impl BufferCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the registry, rejecting invalid records and duplicate ids.
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut catalog = Self::empty();
        for buffer in document.buffers {
            buffer.validate()?;
            check_declared_molar_masses(&buffer);
            let range = buffer.effective_range;
            if buffer
                .pKa
                .iter()
                .all(|p| *p < range.low - 1.0 || *p > range.high + 1.0)
            {
                warn!(
                    "Buffer '{}': effective range {}..{} is far from every pKa",
                    buffer.id, range.low, range.high
                );
            }
            if catalog.buffers.contains_key(&buffer.id) {
                return Err(AcidBaseError::DuplicateId { id: buffer.id });
            }
            catalog.order.push(buffer.id.clone());
            catalog.buffers.insert(buffer.id.clone(), buffer);
        }
        for reagent in document.strong_acids_bases {
            if !(reagent.molar_mass.is_finite() && reagent.molar_mass > 0.0) {
                return Err(AcidBaseError::invalid_record(
                    &reagent.id,
                    "molar mass must be positive",
                ));
            }
            if reagent.equivalents == 0 {
                return Err(AcidBaseError::invalid_record(&reagent.id, "zero equivalents"));
            }
            if catalog.reagents.contains_key(&reagent.id) {
                return Err(AcidBaseError::DuplicateId { id: reagent.id });
            }
            catalog.reagent_order.push(reagent.id.clone());
            catalog.reagents.insert(reagent.id.clone(), reagent);
        }
        catalog.incompatibilities = document.incompatibilities;
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: CatalogDocument = parse_json_str(content, "buffer catalog")?;
        Self::from_document(document)
    }

    pub fn from_file(file_name: &str) -> Result<Self> {
        let document: CatalogDocument = load_json_from_file(file_name)?;
        let catalog = Self::from_document(document)?;
        info!(
            "Loaded buffer catalog '{}': {} buffer systems, {} strong acids/bases",
            file_name,
            catalog.order.len(),
            catalog.reagent_order.len()
        );
        Ok(catalog)
    }

    /// Catalog shipped with the crate, parsed on first use.
    pub fn builtin() -> &'static BufferCatalog {
        static BUILTIN: OnceLock<BufferCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| match Self::from_json_str(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Built-in buffer catalog is broken: {}", e);
                Self::empty()
            }
        })
    }

    pub fn get(&self, id: &str) -> Option<&BufferSystem> {
        self.buffers.get(id)
    }

    /// Lookup by id, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Result<&BufferSystem> {
        if let Some(buffer) = self.buffers.get(id_or_name) {
            return Ok(buffer);
        }
        let wanted = id_or_name.trim().to_lowercase();
        self.iter()
            .find(|b| b.id.to_lowercase() == wanted || b.name.to_lowercase() == wanted)
            .ok_or_else(|| AcidBaseError::UnknownBuffer {
                id: id_or_name.to_string(),
            })
    }

    /// Buffer systems in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferSystem> {
        self.order.iter().filter_map(|id| self.buffers.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn reagent(&self, id_or_formula: &str) -> Result<&StrongAcidBase> {
        if let Some(reagent) = self.reagents.get(id_or_formula) {
            return Ok(reagent);
        }
        let wanted = id_or_formula.trim().to_lowercase();
        self.reagents()
            .find(|r| r.formula.to_lowercase() == wanted || r.name.to_lowercase() == wanted)
            .ok_or_else(|| AcidBaseError::UnknownReagent {
                id: id_or_formula.to_string(),
            })
    }

    pub fn reagents(&self) -> impl Iterator<Item = &StrongAcidBase> {
        self.reagent_order
            .iter()
            .filter_map(|id| self.reagents.get(id))
    }

    pub fn incompatibilities(&self) -> &[IncompatibilityRule] {
        &self.incompatibilities
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row!["Id", "Name", "pKa (25 °C)", "dpKa/dT", "Range", "Suitability"]);
        for buffer in self.iter() {
            let pKa = buffer
                .pKa
                .iter()
                .map(|p| format!("{:.2}", p))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(row![
                buffer.id,
                buffer.name,
                pKa,
                format!("{:+.4}", buffer.dpKadT),
                format!("{:.1}-{:.1}", buffer.effective_range.low, buffer.effective_range.high),
                buffer.suitability
            ]);
        }
        table.printstd();
    }
}

fn check_declared_molar_masses(buffer: &BufferSystem) {
    for (form, formula) in &buffer.formulas {
        let Some(declared) = buffer.molar_mass.get(form) else {
            warn!(
                "Buffer '{}': formula given for '{}' but no molar mass",
                buffer.id, form
            );
            continue;
        };
        match calculate_molar_mass(formula) {
            Ok(computed) if (computed - declared).abs() > MOLAR_MASS_TOLERANCE => warn!(
                "Buffer '{}': declared molar mass {} of '{}' differs from {} computed for {}",
                buffer.id, declared, form, computed, formula
            ),
            Ok(_) => {}
            Err(e) => warn!("Buffer '{}': {}", buffer.id, e),
        }
    }
}
