use crate::error::{AcidBaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the protonated form in [`BufferSystem::molar_mass`]
pub const ACID_FORM: &str = "acid";
/// Key of the deprotonated form in [`BufferSystem::molar_mass`]
pub const BASE_FORM: &str = "base";

/// Effective buffering range of a system, pH units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRange {
    pub low: f64,
    pub high: f64,
}

impl EffectiveRange {
    pub fn contains(&self, pH: f64) -> bool {
        pH >= self.low && pH <= self.high
    }
}

/// One buffer system of the catalog.
///
/// pKa values refer to 25 °C. They are stored as declared; anything that needs
/// the protonation states in order works on [`BufferSystem::sorted_pKa`], which
/// is a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct BufferSystem {
    pub id: String,
    pub name: String,
    pub pKa: Vec<f64>,
    /// dpKa/dT, applied to every pKa of the system
    pub dpKadT: f64,
    pub effective_range: EffectiveRange,
    /// g/mol keyed by chemical form; always holds `acid` and `base`
    pub molar_mass: BTreeMap<String, f64>,
    pub category: String,
    pub suitability: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub incompatibilities: Vec<String>,
    /// charge of the fully protonated species
    #[serde(default)]
    pub acid_charge: i32,
    /// labels of the protonation states, most protonated first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<String>>,
    /// names of the purchasable forms, keyed like `molar_mass`
    #[serde(default)]
    pub form_names: BTreeMap<String, String>,
    /// chemical formulas of the forms, keyed like `molar_mass`
    #[serde(default)]
    pub formulas: BTreeMap<String, String>,
    /// index (ascending pKa) of the step separating the `acid` and `base` forms,
    /// `None` when the forms are the fully protonated and fully deprotonated states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_step: Option<usize>,
}

impl BufferSystem {
    /// Ascending copy of the pKa values.
    pub fn sorted_pKa(&self) -> Vec<f64> {
        let mut pKa = self.pKa.clone();
        pKa.sort_by(|a, b| a.total_cmp(b));
        pKa
    }

    pub fn molar_mass_of(&self, form: &str) -> Result<f64> {
        self.molar_mass
            .get(form)
            .copied()
            .ok_or_else(|| AcidBaseError::MissingMolarMass {
                buffer: self.id.clone(),
                form: form.to_string(),
            })
    }

    /// Display name of a form, falling back to "<name> (<form>)".
    pub fn form_name(&self, form: &str) -> String {
        self.form_names
            .get(form)
            .cloned()
            .unwrap_or_else(|| format!("{} ({})", self.name, form))
    }

    /// Step between the declared `acid` and `base` forms; a single pKa is always step 0.
    pub fn declared_form_step(&self) -> Option<usize> {
        match self.form_step {
            Some(step) => Some(step),
            None if self.pKa.len() == 1 => Some(0),
            None => None,
        }
    }

    /// Smallest gap between adjacent sorted pKa values, `None` for a single pKa.
    pub fn min_pKa_gap(&self) -> Option<f64> {
        min_adjacent_gap(&self.sorted_pKa())
    }

    /// Checks the data-model invariants of a catalog record.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AcidBaseError::invalid_record(&self.name, "empty id"));
        }
        if self.pKa.is_empty() {
            return Err(AcidBaseError::EmptyPKa {
                buffer: self.id.clone(),
            });
        }
        if self.pKa.iter().any(|p| !p.is_finite()) {
            return Err(AcidBaseError::invalid_record(&self.id, "non-finite pKa"));
        }
        if !self.dpKadT.is_finite() {
            return Err(AcidBaseError::invalid_record(&self.id, "non-finite dpKa/dT"));
        }
        let range = self.effective_range;
        if !(range.low.is_finite() && range.high.is_finite() && range.low < range.high) {
            return Err(AcidBaseError::invalid_record(
                &self.id,
                format!("effective range {}..{} is not ordered", range.low, range.high),
            ));
        }
        for form in [ACID_FORM, BASE_FORM] {
            let mass = self.molar_mass_of(form)?;
            if !(mass.is_finite() && mass > 0.0) {
                return Err(AcidBaseError::invalid_record(
                    &self.id,
                    format!("molar mass of '{}' form must be positive, got {}", form, mass),
                ));
            }
        }
        if let Some(step) = self.form_step {
            if step >= self.pKa.len() {
                return Err(AcidBaseError::invalid_record(
                    &self.id,
                    format!("form step {} for {} pKa values", step, self.pKa.len()),
                ));
            }
        }
        if let Some(species) = &self.species {
            if species.len() != self.pKa.len() + 1 {
                return Err(AcidBaseError::invalid_record(
                    &self.id,
                    format!(
                        "{} species labels for {} pKa values",
                        species.len(),
                        self.pKa.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Smallest difference between neighbours of an ascending slice.
pub fn min_adjacent_gap(sorted: &[f64]) -> Option<f64> {
    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
pub(crate) fn test_buffer(id: &str, pKa: Vec<f64>, dpKadT: f64) -> BufferSystem {
    let low = pKa.iter().cloned().fold(f64::INFINITY, f64::min) - 1.0;
    let high = pKa.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 1.0;
    BufferSystem {
        id: id.to_string(),
        name: id.to_string(),
        pKa,
        dpKadT,
        effective_range: EffectiveRange { low, high },
        molar_mass: BTreeMap::from([(ACID_FORM.to_string(), 100.0), (BASE_FORM.to_string(), 122.0)]),
        category: "test".to_string(),
        suitability: "general".to_string(),
        warnings: vec![],
        incompatibilities: vec![],
        acid_charge: 0,
        species: None,
        form_names: BTreeMap::new(),
        formulas: BTreeMap::new(),
        form_step: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_copy_leaves_record_untouched() {
        let buffer = test_buffer("x", vec![7.2, 2.15, 12.35], -0.0028);
        assert_eq!(buffer.sorted_pKa(), vec![2.15, 7.2, 12.35]);
        assert_eq!(buffer.pKa, vec![7.2, 2.15, 12.35]);
    }

    #[test]
    fn min_gap() {
        let buffer = test_buffer("citrate", vec![6.40, 3.13, 4.76], 0.0);
        let gap = buffer.min_pKa_gap().unwrap();
        assert!((gap - 1.63).abs() < 1e-9);
        assert!(test_buffer("tris", vec![8.06], -0.028).min_pKa_gap().is_none());
    }

    #[test]
    fn validation_rejects_broken_records() {
        let mut buffer = test_buffer("x", vec![7.0], 0.0);
        assert!(buffer.validate().is_ok());

        buffer.molar_mass.remove(BASE_FORM);
        assert!(matches!(
            buffer.validate(),
            Err(AcidBaseError::MissingMolarMass { .. })
        ));

        let mut buffer = test_buffer("x", vec![], 0.0);
        buffer.effective_range = EffectiveRange { low: 6.0, high: 8.0 };
        assert!(matches!(buffer.validate(), Err(AcidBaseError::EmptyPKa { .. })));

        let mut buffer = test_buffer("x", vec![7.0], 0.0);
        buffer.effective_range = EffectiveRange { low: 8.0, high: 6.0 };
        assert!(buffer.validate().is_err());

        let mut buffer = test_buffer("x", vec![7.0], 0.0);
        buffer.species = Some(vec!["HA".to_string()]);
        assert!(buffer.validate().is_err());

        let mut buffer = test_buffer("x", vec![6.35, 10.33], 0.0);
        buffer.form_step = Some(2);
        assert!(buffer.validate().is_err());
        buffer.form_step = Some(1);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn declared_form_step() {
        assert_eq!(test_buffer("x", vec![7.0], 0.0).declared_form_step(), Some(0));
        let mut buffer = test_buffer("x", vec![3.13, 4.76, 6.40], 0.0);
        assert_eq!(buffer.declared_form_step(), None);
        buffer.form_step = Some(1);
        assert_eq!(buffer.declared_form_step(), Some(1));
    }

    #[test]
    fn form_name_fallback() {
        let mut buffer = test_buffer("hepes", vec![7.48], -0.014);
        assert_eq!(buffer.form_name(ACID_FORM), "hepes (acid)");
        buffer
            .form_names
            .insert(BASE_FORM.to_string(), "HEPES sodium salt".to_string());
        assert_eq!(buffer.form_name(BASE_FORM), "HEPES sodium salt");
    }
}
