use serde::{Deserialize, Serialize};
use std::fmt;

/// acid or base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcidBaseKind {
    Acid,
    Base,
}

impl fmt::Display for AcidBaseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AcidBaseKind::Acid => write!(f, "acid"),
            AcidBaseKind::Base => write!(f, "base"),
        }
    }
}

fn one() -> u32 {
    1
}

/// Reference record of a strong (or near-strong) acid or base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct StrongAcidBase {
    pub id: String,
    pub name: String,
    pub formula: String,
    #[serde(rename = "type")]
    pub kind: AcidBaseKind,
    /// pKa of the last, not fully dissociated step (H2SO4: HSO4-)
    #[serde(default)]
    pub pKa: Option<f64>,
    pub molar_mass: f64,
    /// H+ or OH- released per formula unit by the fully dissociating steps
    #[serde(default = "one")]
    pub equivalents: u32,
    #[serde(default)]
    pub stock_concentration: Option<f64>,
    #[serde(default)]
    pub stock_percentage: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"id":"hcl","name":"Hydrochloric acid","formula":"HCl","type":"acid","molar_mass":36.46}"#;
        let reagent: StrongAcidBase = serde_json::from_str(json).unwrap();
        assert_eq!(reagent.kind, AcidBaseKind::Acid);
        assert_eq!(reagent.equivalents, 1);
        assert!(reagent.pKa.is_none());
        assert_eq!(reagent.kind.to_string(), "acid");
    }
}
