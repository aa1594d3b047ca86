use crate::error::{AcidBaseError, Result};
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};

/// Prefix marking safety-relevant warnings
pub const CRITICAL_PREFIX: &str = "CRITICAL: ";

/// An amount of one chemical form to weigh out or pipette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub form: String,
    pub value: f64,
    pub unit: String,
    /// the same amount in mol
    pub moles: f64,
}

impl Amount {
    pub fn new(form: impl Into<String>, value: f64, unit: impl Into<String>, moles: f64) -> Self {
        Self {
            form: form.into(),
            value,
            unit: unit.into(),
            moles,
        }
    }
}

/// Equilibrium fraction of one protonation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesFraction {
    pub formula: String,
    pub fraction: f64,
    /// mol/L, when a total concentration was given
    pub concentration: Option<f64>,
}

/// Outcome of one calculator call.
///
/// `success == false` carries a single message in `error`; warnings and steps of a
/// failed call are whatever had been collected before validation stopped it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct CalculationResult {
    pub success: bool,
    pub pH: Option<f64>,
    pub pOH: Option<f64>,
    pub acid_amount: Option<Amount>,
    pub base_amount: Option<Amount>,
    pub species_distribution: Option<Vec<SpeciesFraction>>,
    pub warnings: Vec<String>,
    pub steps: Vec<String>,
    pub error: Option<String>,
}

impl CalculationResult {
    /// Empty successful result to be filled in.
    pub fn new() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Turns a calculator body into a result; an `Err` becomes a failed result.
    pub fn from_result(result: Result<CalculationResult>) -> Self {
        match result {
            Ok(result) => result,
            Err(e) => Self::failure(e.to_string()),
        }
    }

    pub fn step(&mut self, line: impl Into<String>) {
        self.steps.push(line.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    pub fn warn_critical(&mut self, message: impl AsRef<str>) {
        self.warn(format!("{}{}", CRITICAL_PREFIX, message.as_ref()));
    }

    pub fn extend_warnings<I: IntoIterator<Item = String>>(&mut self, warnings: I) {
        for w in warnings {
            self.warn(w);
        }
    }

    pub fn critical_warnings(&self) -> impl Iterator<Item = &String> {
        self.warnings
            .iter()
            .filter(|w| w.starts_with(CRITICAL_PREFIX))
    }

    pub fn has_critical_warnings(&self) -> bool {
        self.critical_warnings().next().is_some()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(AcidBaseError::from)
    }

    pub fn pretty_print(&self) {
        if !self.success {
            println!(
                "Calculation failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
            return;
        }
        let mut table = Table::new();
        table.add_row(row!["Quantity", "Value", "Units"]);
        if let Some(pH) = self.pH {
            table.add_row(row!["pH", format!("{:.2}", pH), "-"]);
        }
        if let Some(pOH) = self.pOH {
            table.add_row(row!["pOH", format!("{:.2}", pOH), "-"]);
        }
        for amount in [&self.acid_amount, &self.base_amount].into_iter().flatten() {
            table.add_row(row![
                amount.form,
                format!("{:.4}", amount.value),
                amount.unit
            ]);
            table.add_row(row!["", format!("{:.4e}", amount.moles), "mol"]);
        }
        table.printstd();

        if let Some(species) = &self.species_distribution {
            let mut species_table = Table::new();
            species_table.add_row(row!["Species", "Fraction", "Concentration, M"]);
            for s in species {
                let concentration = s
                    .concentration
                    .map(|c| format!("{:.4e}", c))
                    .unwrap_or_else(|| "-".to_string());
                species_table.add_row(row![s.formula, format!("{:.4}", s.fraction), concentration]);
            }
            species_table.printstd();
        }
        for warning in &self.warnings {
            if warning.starts_with(CRITICAL_PREFIX) {
                println!("\x1b[31m{}\x1b[0m", warning);
            } else {
                println!("\x1b[33mWarning: {}\x1b[0m", warning);
            }
        }
        for (i, step) in self.steps.iter().enumerate() {
            println!("{:>3}. {}", i + 1, step);
        }
    }
}
