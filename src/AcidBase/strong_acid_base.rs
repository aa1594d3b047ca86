//! pH of strong acids and bases in water.
//!
//! acid: pH = −log10(c·n), base: pOH = −log10(c·n), pH = pKw(T) − pOH, with n the
//! equivalents per formula unit. Below 1e-6 M the water autoionisation is no
//! longer negligible and [H+] (or [OH−]) = (c + √(c² + 4·Kw))/2 is used instead.
//! A near-strong further step (HSO4− of sulfuric acid) adds the root of
//! x² + (c·n + Ka)·x − Ka·c = 0.
use super::calculation_result::CalculationResult;
use super::temperature::{get_pKw, pKw_is_clamped};
use crate::Catalog::strong_acid_base::{AcidBaseKind, StrongAcidBase};
use crate::error::{Result, require_finite, require_positive};
use log::debug;

/// Excess H+ or OH− below which water autoionisation is included, mol/L
pub const DILUTE_LIMIT: f64 = 1e-6;
/// Above this concentration activities depart strongly from concentrations, mol/L
const CONCENTRATED_LIMIT: f64 = 1.0;

/// Extra H+ released by a weak step of pKa `pKa` in the presence of `h0` mol/L H+.
#[allow(non_snake_case)]
pub fn weak_step_protons(c: f64, h0: f64, pKa: f64) -> f64 {
    let Ka = 10f64.powf(-pKa);
    let b = h0 + Ka;
    (-b + (b * b + 4.0 * Ka * c).sqrt()) / 2.0
}

#[allow(non_snake_case)]
fn strong_pH(
    label: &str,
    kind: AcidBaseKind,
    equivalents: u32,
    weak_step_pKa: Option<f64>,
    concentration_molar: f64,
    T: f64,
) -> Result<CalculationResult> {
    require_positive("concentration (M)", concentration_molar)?;
    require_finite("temperature (°C)", T)?;
    let mut result = CalculationResult::new();
    let pKw = get_pKw(T);
    result.step(format!("pKw at {:.1} °C = {:.2}", T, pKw));
    if pKw_is_clamped(T) {
        result.warn(format!(
            "{:.1} °C is outside the pKw table (0-100 °C); the nearest table value is used",
            T
        ));
    }

    let mut excess = concentration_molar * f64::from(equivalents);
    if equivalents != 1 {
        result.step(format!(
            "{} {} × {} equivalents = {:.4e} M",
            label, concentration_molar, equivalents, excess
        ));
    }
    match (kind, weak_step_pKa) {
        (AcidBaseKind::Acid, Some(pKa)) => {
            let extra = weak_step_protons(concentration_molar, excess, pKa);
            result.step(format!(
                "Partial dissociation (pKa {}): x² + ({:.4e} + Ka)·x − Ka·{} = 0, x = {:.4e} M",
                pKa, excess, concentration_molar, extra
            ));
            excess += extra;
        }
        (AcidBaseKind::Base, Some(_)) => {
            debug!("pKa of base '{}' ignored", label);
        }
        _ => {}
    }

    let Kw = 10f64.powf(-pKw);
    let ion = if excess < DILUTE_LIMIT {
        let ion = (excess + (excess * excess + 4.0 * Kw).sqrt()) / 2.0;
        result.step(format!(
            "Dilute solution: [{}] = (c + √(c² + 4·Kw))/2 = {:.4e} M",
            hydro_ion(kind),
            ion
        ));
        result.warn(format!(
            "{:.1e} M is below {:.0e} M: water autoionisation included",
            excess, DILUTE_LIMIT
        ));
        ion
    } else {
        result.step(format!("[{}] = {:.4e} M", hydro_ion(kind), excess));
        excess
    };
    if excess > CONCENTRATED_LIMIT {
        result.warn(format!(
            "Above {} M activity effects make the calculated pH approximate",
            CONCENTRATED_LIMIT
        ));
    }

    let p_ion = -ion.log10();
    let (pH, pOH) = match kind {
        AcidBaseKind::Acid => {
            result.step(format!("pH = −log10[H+] = {:.3}", p_ion));
            result.step(format!("pOH = pKw − pH = {:.3}", pKw - p_ion));
            (p_ion, pKw - p_ion)
        }
        AcidBaseKind::Base => {
            result.step(format!("pOH = −log10[OH−] = {:.3}", p_ion));
            result.step(format!("pH = pKw − pOH = {:.3}", pKw - p_ion));
            (pKw - p_ion, p_ion)
        }
    };
    result.pH = Some(pH);
    result.pOH = Some(pOH);
    Ok(result)
}

fn hydro_ion(kind: AcidBaseKind) -> &'static str {
    match kind {
        AcidBaseKind::Acid => "H+",
        AcidBaseKind::Base => "OH−",
    }
}

/// pH of a fully dissociated monoprotic acid.
///
/// ```
/// use BufferLab::AcidBase::strong_acid_base::calculate_strong_acid_pH;
/// let result = calculate_strong_acid_pH(0.1, 25.0);
/// assert!((result.pH.unwrap() - 1.0).abs() < 0.01);
/// ```
#[allow(non_snake_case)]
pub fn calculate_strong_acid_pH(concentration_molar: f64, T: f64) -> CalculationResult {
    CalculationResult::from_result(strong_pH("acid", AcidBaseKind::Acid, 1, None, concentration_molar, T))
}

/// pH of a fully dissociated monohydroxide base.
#[allow(non_snake_case)]
pub fn calculate_strong_base_pH(concentration_molar: f64, T: f64) -> CalculationResult {
    CalculationResult::from_result(strong_pH("base", AcidBaseKind::Base, 1, None, concentration_molar, T))
}

/// pH of a catalog reagent, honouring its equivalents and a near-strong last step.
#[allow(non_snake_case)]
pub fn calculate_strong_reagent_pH(reagent: &StrongAcidBase, concentration_molar: f64, T: f64) -> CalculationResult {
    CalculationResult::from_result(strong_pH(
        &reagent.formula,
        reagent.kind,
        reagent.equivalents,
        reagent.pKa,
        concentration_molar,
        T,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog::catalog_api::BufferCatalog;
    use approx::assert_relative_eq;

    #[test]
    fn tenth_molar_acid_and_base() {
        let acid = calculate_strong_acid_pH(0.1, 25.0);
        assert!(acid.success);
        assert_relative_eq!(acid.pH.unwrap(), 1.0, epsilon = 0.01);
        assert_relative_eq!(acid.pOH.unwrap(), 13.0, epsilon = 0.01);
        let base = calculate_strong_base_pH(0.1, 25.0);
        assert_relative_eq!(base.pH.unwrap(), 13.0, epsilon = 0.01);
        assert!(acid.warnings.is_empty() && base.warnings.is_empty());
    }

    #[test]
    fn base_ph_follows_pkw() {
        let base = calculate_strong_base_pH(0.01, 37.0);
        assert_relative_eq!(base.pH.unwrap(), get_pKw(37.0) - 2.0, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_concentration_fails() {
        for c in [0.0, -0.1, f64::NAN] {
            let result = calculate_strong_acid_pH(c, 25.0);
            assert!(!result.success);
            assert!(result.error.is_some());
            assert!(!calculate_strong_base_pH(c, 25.0).success);
        }
    }

    #[test]
    fn very_dilute_acid_stays_below_seven() {
        let result = calculate_strong_acid_pH(1e-8, 25.0);
        let pH = result.pH.unwrap();
        assert!(pH < 7.0 && pH > 6.9);
        assert!(result.warnings.iter().any(|w| w.contains("autoionisation")));
    }

    #[test]
    fn catalog_reagents() {
        let catalog = BufferCatalog::builtin();
        let naoh = catalog.reagent("NaOH").unwrap();
        assert_relative_eq!(
            calculate_strong_reagent_pH(naoh, 0.1, 25.0).pH.unwrap(),
            13.0,
            epsilon = 0.01
        );
        // HSO4- dissociates partly: more acidic than 0.1 M HCl, less than 0.2 M
        let h2so4 = catalog.reagent("h2so4").unwrap();
        let pH = calculate_strong_reagent_pH(h2so4, 0.1, 25.0).pH.unwrap();
        assert!(pH < 1.0 && pH > -(0.2f64).log10());
        assert_relative_eq!(pH, 0.964, epsilon = 0.005);
    }
}
