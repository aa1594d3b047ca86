//! Strong acid or base needed to bring a buffered solution from one pH to another.
//!
//! The buffer's acid fraction f(pH) = 1/(1 + 10^(pH − pKa)) is evaluated at the
//! current and at the target pH; the protons to add are C·V·(f_target − f_current).
//! With dilution correction the free [H+] − [OH−] of the final volume V + v is
//! added to that demand and the reagent volume v is iterated to convergence.
use super::advisory::is_dead_zone;
use super::calculation_result::{Amount, CalculationResult};
use super::temperature::{get_pKw, pKw_is_clamped};
use crate::Catalog::strong_acid_base::AcidBaseKind;
use crate::error::{Result, require_finite, require_positive};
use crate::settings::CalcSettings;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct PhAdjustmentRequest {
    pub current_pH: f64,
    pub target_pH: f64,
    pub buffer_concentration_molar: f64,
    /// pKa valid at the working temperature
    pub buffer_pKa: f64,
    pub volume_mL: f64,
    pub adjusting_with: AcidBaseKind,
    pub adjusting_concentration_molar: f64,
}

impl PhAdjustmentRequest {
    pub fn validate(&self) -> Result<()> {
        require_finite("current pH", self.current_pH)?;
        require_finite("target pH", self.target_pH)?;
        require_positive("buffer concentration (M)", self.buffer_concentration_molar)?;
        require_finite("buffer pKa", self.buffer_pKa)?;
        require_positive("volume (mL)", self.volume_mL)?;
        require_positive("reagent concentration (M)", self.adjusting_concentration_molar)?;
        Ok(())
    }

    /// Sign turning a proton demand into reagent moles: +1 for acid, −1 for base.
    fn reagent_sign(&self) -> f64 {
        match self.adjusting_with {
            AcidBaseKind::Acid => 1.0,
            AcidBaseKind::Base => -1.0,
        }
    }
}

/// Fraction of the buffer in the protonated form at `pH`
#[allow(non_snake_case)]
pub fn acid_fraction(pH: f64, pKa: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(pH - pKa))
}

/// [H+] − [OH−] at `pH`, mol/L
#[allow(non_snake_case)]
fn free_protons(pH: f64, pKw: f64) -> f64 {
    10f64.powf(-pH) - 10f64.powf(pH - pKw)
}

/// Fixed-point iteration of the reagent volume (L) against the final volume.
#[allow(non_snake_case)]
fn iterate_dilution(
    request: &PhAdjustmentRequest,
    buffer_demand: f64,
    pKw: f64,
    initial_volume_L: f64,
    settings: &CalcSettings,
    result: &mut CalculationResult,
) -> f64 {
    let V0 = request.volume_mL / 1000.0;
    let c = request.adjusting_concentration_molar;
    let sign = request.reagent_sign();
    let free_current = free_protons(request.current_pH, pKw) * V0;
    let free_target = free_protons(request.target_pH, pKw);
    result.step(format!(
        "Dilution correction: demand(v) = {:.4e} + ([H+] − [OH−])_target·(V + v) − ([H+] − [OH−])_current·V",
        buffer_demand
    ));

    let mut volume_L = initial_volume_L;
    for iteration in 1..=settings.max_dilution_iterations {
        let demand = buffer_demand + free_target * (V0 + volume_L) - free_current;
        let next = sign * demand / c;
        let change = if next != 0.0 {
            ((next - volume_L) / next).abs()
        } else {
            0.0
        };
        debug!(
            "dilution iteration {}: v = {:.6e} L, relative change {:.3e}",
            iteration, next, change
        );
        result.step(format!(
            "  iteration {}: v = {:.4} mL (relative change {:.2e})",
            iteration,
            next * 1000.0,
            change
        ));
        volume_L = next;
        if !volume_L.is_finite() || volume_L < 0.0 {
            result.warn("Dilution correction diverged: the reagent is too dilute to reach the target pH");
            return volume_L;
        }
        if change < settings.dilution_tolerance {
            return volume_L;
        }
    }
    result.warn(format!(
        "Dilution correction did not converge within {} iterations",
        settings.max_dilution_iterations
    ));
    volume_L
}

#[allow(non_snake_case)]
fn adjust(request: &PhAdjustmentRequest, T: f64, settings: &CalcSettings) -> Result<CalculationResult> {
    request.validate()?;
    require_finite("temperature (°C)", T)?;
    let mut result = CalculationResult::new();
    let pKa = request.buffer_pKa;
    let pKw = get_pKw(T);
    if pKw_is_clamped(T) {
        result.warn(format!(
            "{:.1} °C is outside the pKw table (0-100 °C); the nearest table value is used",
            T
        ));
    }

    let f_current = acid_fraction(request.current_pH, pKa);
    let f_target = acid_fraction(request.target_pH, pKa);
    result.step(format!(
        "Acid fraction 1/(1 + 10^(pH − {:.3})): {:.4} at pH {:.2}, {:.4} at pH {:.2}",
        pKa, f_current, request.current_pH, f_target, request.target_pH
    ));
    let V0 = request.volume_mL / 1000.0;
    let buffer_demand = request.buffer_concentration_molar * V0 * (f_target - f_current);
    result.step(format!(
        "Protons taken up by the buffer = {} M × {} mL × ({:.4} − {:.4}) = {:.4e} mol",
        request.buffer_concentration_molar, request.volume_mL, f_target, f_current, buffer_demand
    ));

    let sign = request.reagent_sign();
    let moles = sign * buffer_demand;
    let mut volume_L = moles / request.adjusting_concentration_molar;
    result.step(format!(
        "{} needed = {:.4e} mol / {} M = {:.4} mL",
        request.adjusting_with,
        moles,
        request.adjusting_concentration_molar,
        volume_L * 1000.0
    ));

    let mismatch = moles < 0.0;
    if mismatch {
        let direction = if request.target_pH > request.current_pH {
            "raise"
        } else {
            "lower"
        };
        result.warn(format!(
            "Adding {} cannot {} the pH from {:.2} to {:.2}; the negative amount is diagnostic only",
            request.adjusting_with, direction, request.current_pH, request.target_pH
        ));
    } else if request.current_pH == request.target_pH {
        result.step("Current and target pH are equal: nothing to add");
    } else if settings.dilution_correction {
        volume_L = iterate_dilution(request, buffer_demand, pKw, volume_L, settings, &mut result);
    }

    if is_dead_zone(&[pKa], request.target_pH, settings.dead_zone_width) {
        result.warn(format!(
            "Target pH {:.2} is more than {:.1} unit from pKa {:.2}: the buffer barely resists, small additions move the pH strongly",
            request.target_pH, settings.dead_zone_width, pKa
        ));
    }
    if volume_L > 0.1 * request.volume_mL / 1000.0 {
        result.warn(format!(
            "Reagent volume {:.2} mL exceeds 10% of the solution volume; use a more concentrated stock",
            volume_L * 1000.0
        ));
    }
    result.step(format!(
        "Final volume ≈ {:.2} mL",
        request.volume_mL + volume_L.max(0.0) * 1000.0
    ));

    let amount = Amount::new(
        format!("{} M {}", request.adjusting_concentration_molar, request.adjusting_with),
        volume_L * 1000.0,
        "mL",
        volume_L * request.adjusting_concentration_molar,
    );
    match request.adjusting_with {
        AcidBaseKind::Acid => result.acid_amount = Some(amount),
        AcidBaseKind::Base => result.base_amount = Some(amount),
    }
    result.pH = Some(request.target_pH);
    result.pOH = Some(pKw - request.target_pH);
    Ok(result)
}

#[allow(non_snake_case)]
pub fn calculate_acid_needed_for_pH_adjustment_with_settings(
    request: &PhAdjustmentRequest,
    temperature_C: f64,
    settings: &CalcSettings,
) -> CalculationResult {
    CalculationResult::from_result(adjust(request, temperature_C, settings))
}

/// Reagent volume with default settings (dilution correction on).
///
/// ```
/// use BufferLab::AcidBase::ph_adjustment::{PhAdjustmentRequest, calculate_acid_needed_for_pH_adjustment};
/// use BufferLab::Catalog::strong_acid_base::AcidBaseKind;
///
/// let request = PhAdjustmentRequest {
///     current_pH: 8.5,
///     target_pH: 8.06,
///     buffer_concentration_molar: 0.05,
///     buffer_pKa: 8.06,
///     volume_mL: 1000.0,
///     adjusting_with: AcidBaseKind::Acid,
///     adjusting_concentration_molar: 1.0,
/// };
/// let result = calculate_acid_needed_for_pH_adjustment(&request, 25.0);
/// assert!(result.success);
/// assert!(result.acid_amount.unwrap().value > 0.0);
/// ```
#[allow(non_snake_case)]
pub fn calculate_acid_needed_for_pH_adjustment(request: &PhAdjustmentRequest, temperature_C: f64) -> CalculationResult {
    calculate_acid_needed_for_pH_adjustment_with_settings(request, temperature_C, &CalcSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request(current: f64, target: f64, with: AcidBaseKind) -> PhAdjustmentRequest {
        PhAdjustmentRequest {
            current_pH: current,
            target_pH: target,
            buffer_concentration_molar: 0.1,
            buffer_pKa: 7.2,
            volume_mL: 500.0,
            adjusting_with: with,
            adjusting_concentration_molar: 1.0,
        }
    }

    fn no_dilution() -> CalcSettings {
        CalcSettings {
            dilution_correction: false,
            ..CalcSettings::default()
        }
    }

    #[test]
    fn henderson_hasselbalch_delta() {
        let r = request(8.2, 7.2, AcidBaseKind::Acid);
        let result = calculate_acid_needed_for_pH_adjustment_with_settings(&r, 25.0, &no_dilution());
        assert!(result.success);
        let expected_moles = 0.1 * 0.5 * (0.5 - acid_fraction(8.2, 7.2));
        let acid = result.acid_amount.unwrap();
        assert_relative_eq!(acid.moles, expected_moles, epsilon = 1e-12);
        assert_relative_eq!(acid.value, expected_moles * 1000.0, epsilon = 1e-9);
        assert_eq!(acid.unit, "mL");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn base_raises_ph() {
        let r = request(6.8, 7.4, AcidBaseKind::Base);
        let result = calculate_acid_needed_for_pH_adjustment_with_settings(&r, 25.0, &no_dilution());
        let base = result.base_amount.unwrap();
        assert!(base.value > 0.0);
        assert!(result.acid_amount.is_none());
    }

    #[test]
    fn dilution_correction_stays_close_near_neutral() {
        let r = request(8.2, 7.2, AcidBaseKind::Acid);
        let plain = calculate_acid_needed_for_pH_adjustment_with_settings(&r, 25.0, &no_dilution());
        let corrected = calculate_acid_needed_for_pH_adjustment(&r, 25.0);
        let a = plain.acid_amount.unwrap().value;
        let b = corrected.acid_amount.unwrap().value;
        assert_relative_eq!(a, b, max_relative = 1e-3);
        assert!(corrected.steps.iter().any(|s| s.contains("iteration 1")));
    }

    #[test]
    #[allow(non_snake_case)]
    fn dilution_correction_counts_free_acid() {
        // driving a citrate-like buffer to pH 3 needs extra acid for free H+
        let r = PhAdjustmentRequest {
            current_pH: 4.76,
            target_pH: 3.0,
            buffer_concentration_molar: 0.01,
            buffer_pKa: 4.76,
            volume_mL: 100.0,
            adjusting_with: AcidBaseKind::Acid,
            adjusting_concentration_molar: 0.1,
        };
        let plain = calculate_acid_needed_for_pH_adjustment_with_settings(&r, 25.0, &no_dilution());
        let corrected = calculate_acid_needed_for_pH_adjustment(&r, 25.0);
        assert!(corrected.success);
        let a = plain.acid_amount.unwrap().value;
        let b = corrected.acid_amount.unwrap().value;
        assert!(b > a);
        // v = (C·V·Δf + 1e-3·(V + v) − 10^-4.76·V)/0.1, solved exactly
        let V = 0.1;
        let demand = 0.01 * V * (acid_fraction(3.0, 4.76) - 0.5) + 1e-3 * V - free_protons(4.76, 14.0) * V;
        let exact = demand / (0.1 - 1e-3) * 1000.0;
        assert_relative_eq!(b, exact, max_relative = 1e-3);
    }

    #[test]
    fn direction_mismatch_is_a_warning() {
        let r = request(7.0, 7.5, AcidBaseKind::Acid);
        let result = calculate_acid_needed_for_pH_adjustment(&r, 25.0);
        assert!(result.success);
        assert!(result.acid_amount.unwrap().value < 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("cannot raise")));
        assert!(!result.steps.iter().any(|s| s.contains("iteration")));
    }

    #[test]
    fn equal_ph_needs_nothing() {
        let r = request(7.2, 7.2, AcidBaseKind::Base);
        let result = calculate_acid_needed_for_pH_adjustment(&r, 25.0);
        assert_eq!(result.base_amount.unwrap().value, 0.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn invalid_requests_fail() {
        let mut r = request(8.0, 7.0, AcidBaseKind::Acid);
        r.volume_mL = 0.0;
        assert!(!calculate_acid_needed_for_pH_adjustment(&r, 25.0).success);
        let mut r = request(8.0, 7.0, AcidBaseKind::Acid);
        r.adjusting_concentration_molar = -1.0;
        assert!(!calculate_acid_needed_for_pH_adjustment(&r, 25.0).success);
        let mut r = request(8.0, 7.0, AcidBaseKind::Acid);
        r.current_pH = f64::NAN;
        let result = calculate_acid_needed_for_pH_adjustment(&r, 25.0);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("current pH"));
    }
}
