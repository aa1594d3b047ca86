//! Buffer recipes: how much of the acid form and of the base form to weigh out.
//!
//! Two methods share one entry point. Systems whose adjacent pKa values are at least
//! `polyprotic_gap` apart (2.5 by default) are solved with Henderson-Hasselbalch
//! around the pKa between the declared acid and base forms (the nearest pKa when the
//! record declares no step); overlapping equilibria go through the
//! species distribution solver. [`calculate_buffer_preparation`] inspects the gaps
//! and dispatches; callers may force a method with the dedicated functions.
use super::advisory::{dead_zone_warning, range_warning, temperature_warnings};
use super::calculation_result::{Amount, CalculationResult};
use super::ionic_strength::correct_pKa_values;
use super::species_distribution::{
    buffer_capacity, calculate_labeled_species_distribution, mean_bound_protons, species_labels,
};
use super::temperature::{REFERENCE_TEMPERATURE, corrected_pKa_values, get_pKw};
use crate::Catalog::buffer_system::{ACID_FORM, BASE_FORM, BufferSystem, min_adjacent_gap};
use crate::Catalog::catalog_api::BufferCatalog;
use crate::error::{AcidBaseError, Result, require_finite, require_non_negative, require_positive};
use crate::settings::CalcSettings;
use enum_dispatch::enum_dispatch;
use log::debug;

/// Inputs of a buffer recipe. Units are in the field names.
#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct BufferRequest<'a> {
    pub buffer: &'a BufferSystem,
    pub target_pH: f64,
    pub total_concentration_molar: f64,
    pub final_volume_mL: f64,
    pub temperature_C: f64,
    pub ionic_strength_molar: Option<f64>,
}

impl<'a> BufferRequest<'a> {
    #[allow(non_snake_case)]
    pub fn new(
        buffer: &'a BufferSystem,
        target_pH: f64,
        total_concentration_molar: f64,
        final_volume_mL: f64,
        temperature_C: f64,
        ionic_strength_molar: Option<f64>,
    ) -> Self {
        Self {
            buffer,
            target_pH,
            total_concentration_molar,
            final_volume_mL,
            temperature_C,
            ionic_strength_molar,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer.pKa.is_empty() {
            return Err(AcidBaseError::EmptyPKa {
                buffer: self.buffer.id.clone(),
            });
        }
        for pKa in &self.buffer.pKa {
            require_finite("pKa", *pKa)?;
        }
        require_finite("dpKa/dT", self.buffer.dpKadT)?;
        require_finite("target pH", self.target_pH)?;
        require_positive("total concentration (M)", self.total_concentration_molar)?;
        require_positive("final volume (mL)", self.final_volume_mL)?;
        require_finite("temperature (°C)", self.temperature_C)?;
        if let Some(I) = self.ionic_strength_molar {
            require_non_negative("ionic strength (M)", I)?;
        }
        Ok(())
    }

    fn total_moles(&self) -> f64 {
        self.total_concentration_molar * self.final_volume_mL / 1000.0
    }
}

#[enum_dispatch]
pub trait BufferCalculator {
    fn method_name(&self) -> &'static str;
    /// Fills amounts and steps of `result` from corrected, ascending `pKa`.
    #[allow(non_snake_case)]
    fn compose(&self, request: &BufferRequest, pKa: &[f64], result: &mut CalculationResult) -> Result<()>;
}

/// Single or well separated pKa: pH = pKa + log10([base]/[acid])
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HendersonHasselbalch;

/// Overlapping equilibria: full species distribution, aggregated to the two forms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polyprotic;

#[derive(Debug, Clone, Copy, PartialEq)]
#[enum_dispatch(BufferCalculator)]
pub enum BufferMethod {
    HendersonHasselbalch(HendersonHasselbalch),
    Polyprotic(Polyprotic),
}

impl BufferMethod {
    /// Polyprotic when two adjacent pKa values are closer than `gap`.
    #[allow(non_snake_case)]
    pub fn select(sorted_pKa: &[f64], gap: f64) -> Self {
        match min_adjacent_gap(sorted_pKa) {
            Some(min_gap) if min_gap < gap => BufferMethod::Polyprotic(Polyprotic),
            _ => BufferMethod::HendersonHasselbalch(HendersonHasselbalch),
        }
    }
}

fn form_amount(buffer: &BufferSystem, form: &str, moles: f64) -> Result<Amount> {
    let molar_mass = buffer.molar_mass_of(form)?;
    Ok(Amount::new(buffer.form_name(form), moles * molar_mass, "g", moles))
}

fn push_amount_steps(result: &mut CalculationResult, buffer: &BufferSystem, acid: &Amount, base: &Amount) {
    for (form, amount) in [(ACID_FORM, acid), (BASE_FORM, base)] {
        let molar_mass = buffer.molar_mass.get(form).copied().unwrap_or(f64::NAN);
        result.step(format!(
            "{}: {:.4e} mol × {:.2} g/mol = {:.4} g",
            amount.form, amount.moles, molar_mass, amount.value
        ));
    }
}

impl BufferCalculator for HendersonHasselbalch {
    fn method_name(&self) -> &'static str {
        "Henderson-Hasselbalch"
    }

    #[allow(non_snake_case)]
    fn compose(&self, request: &BufferRequest, pKa: &[f64], result: &mut CalculationResult) -> Result<()> {
        let buffer = request.buffer;
        let pH = request.target_pH;
        let all_pKa = pKa;
        let (nearest, nearest_pKa) = all_pKa
            .iter()
            .copied()
            .enumerate()
            .min_by(|(_, a), (_, b)| (a - pH).abs().total_cmp(&(b - pH).abs()))
            .ok_or_else(|| AcidBaseError::EmptyPKa {
                buffer: buffer.id.clone(),
            })?;
        // the declared forms only buffer around their own step
        let (index, pKa) = match buffer.declared_form_step() {
            Some(step) => {
                let pKa = all_pKa.get(step).copied().ok_or_else(|| AcidBaseError::PKaIndexOutOfRange {
                    buffer: buffer.id.clone(),
                    index: step,
                    len: all_pKa.len(),
                })?;
                (step, pKa)
            }
            None => (nearest, nearest_pKa),
        };
        if all_pKa.len() > 1 {
            result.step(format!(
                "Using pKa{} = {:.3}, the step between {} and {}",
                index + 1,
                pKa,
                buffer.form_name(ACID_FORM),
                buffer.form_name(BASE_FORM)
            ));
        }
        if index != nearest {
            result.warn_critical(format!(
                "{} and {} are the pKa{} pair ({:.2}); pH {:.2} is governed by pKa{} ({:.2}), which these forms cannot buffer. Use the forms of the pKa{} step or another buffer",
                buffer.form_name(ACID_FORM),
                buffer.form_name(BASE_FORM),
                index + 1,
                pKa,
                pH,
                nearest + 1,
                nearest_pKa,
                nearest + 1
            ));
        }
        let ratio = 10f64.powf(pH - pKa);
        result.step(format!(
            "[base]/[acid] = 10^(pH − pKa) = 10^({:.3} − {:.3}) = {:.4}",
            pH, pKa, ratio
        ));
        let acid_fraction = 1.0 / (1.0 + ratio);
        let base_fraction = ratio / (1.0 + ratio);
        result.step(format!(
            "Acid fraction = 1/(1 + ratio) = {:.4}; base fraction = ratio/(1 + ratio) = {:.4}",
            acid_fraction, base_fraction
        ));
        let total_moles = request.total_moles();
        result.step(format!(
            "Total buffer = {} M × {} mL = {:.4e} mol",
            request.total_concentration_molar, request.final_volume_mL, total_moles
        ));
        let acid = form_amount(buffer, ACID_FORM, acid_fraction * total_moles)?;
        let base = form_amount(buffer, BASE_FORM, base_fraction * total_moles)?;
        push_amount_steps(result, buffer, &acid, &base);
        result.acid_amount = Some(acid);
        result.base_amount = Some(base);
        Ok(())
    }
}

impl BufferCalculator for Polyprotic {
    fn method_name(&self) -> &'static str {
        "polyprotic species distribution"
    }

    #[allow(non_snake_case)]
    fn compose(&self, request: &BufferRequest, pKa: &[f64], result: &mut CalculationResult) -> Result<()> {
        let buffer = request.buffer;
        let n = pKa.len();
        let labels = match &buffer.species {
            Some(labels) if labels.len() == n + 1 => labels.clone(),
            _ => species_labels(n, buffer.acid_charge),
        };
        let total_moles = request.total_moles();
        let species = calculate_labeled_species_distribution(
            pKa,
            request.target_pH,
            Some(request.total_concentration_molar),
            Some(&labels),
        )?;
        result.step(format!(
            "Species at pH {:.2} for {} = {:.4e} mol total:",
            request.target_pH,
            buffer.name,
            total_moles
        ));
        let fractions: Vec<f64> = species.iter().map(|s| s.fraction).collect();
        let mut acid_moles = 0.0;
        for (i, s) in species.iter().enumerate() {
            let moles = s.fraction * total_moles;
            let protons = n - i;
            acid_moles += moles * protons as f64 / n as f64;
            result.step(format!(
                "  {}: fraction {:.4}, {:.4e} mol, {} of {} protons",
                s.formula, s.fraction, moles, protons, n
            ));
        }
        result.step(format!(
            "Mean bound protons = {:.4} of {}",
            mean_bound_protons(&fractions),
            n
        ));
        let base_moles = total_moles - acid_moles;
        result.step(format!(
            "Acid-form equivalents = Σ n_i·(protons_i/{}) = {:.4e} mol; base-form = total − acid = {:.4e} mol",
            n, acid_moles, base_moles
        ));
        let acid = form_amount(buffer, ACID_FORM, acid_moles)?;
        let base = form_amount(buffer, BASE_FORM, base_moles)?;
        push_amount_steps(result, buffer, &acid, &base);
        result.acid_amount = Some(acid);
        result.base_amount = Some(base);
        result.species_distribution = Some(species);
        Ok(())
    }
}

/// pKa values of the request after temperature and ionic strength, ascending.
#[allow(non_snake_case)]
fn corrected_pKa(request: &BufferRequest, settings: &CalcSettings, result: &mut CalculationResult) -> Result<Vec<f64>> {
    let buffer = request.buffer;
    let T = request.temperature_C;
    let format_list = |values: &[f64]| {
        values
            .iter()
            .map(|p| format!("{:.3}", p))
            .collect::<Vec<_>>()
            .join(", ")
    };
    result.step(format!("pKa at 25 °C: {}", format_list(&buffer.sorted_pKa())));
    let mut pKa = corrected_pKa_values(buffer, T);
    if T != REFERENCE_TEMPERATURE {
        result.step(format!(
            "pKa at {:.1} °C = pKa + ({}) × ({:.1} − 25) = {}",
            T,
            buffer.dpKadT,
            T,
            format_list(&pKa)
        ));
    }
    if let Some(I) = request.ionic_strength_molar.filter(|I| *I > 0.0) {
        let (corrected, warning) = correct_pKa_values(
            &pKa,
            I,
            buffer.acid_charge,
            settings.davies_a,
            settings.ionic_strength_limit,
        )?;
        pKa = corrected;
        pKa.sort_by(|a, b| a.total_cmp(b));
        result.step(format!(
            "Davies correction at I = {} M (A = {}): pKa = {}",
            I,
            settings.davies_a,
            format_list(&pKa)
        ));
        if let Some(warning) = warning {
            result.warn(warning);
        }
    }
    Ok(pKa)
}

/// Advisory warnings of a finished recipe.
#[allow(non_snake_case)]
fn annotate(
    request: &BufferRequest,
    pKa: &[f64],
    settings: &CalcSettings,
    catalog: &BufferCatalog,
    result: &mut CalculationResult,
) {
    let buffer = request.buffer;
    result.extend_warnings(temperature_warnings(buffer, request.temperature_C));
    if let Some(w) = dead_zone_warning(buffer, pKa, request.target_pH, settings.dead_zone_width, catalog) {
        result.warn(w);
    }
    if let Some(w) = range_warning(buffer, request.target_pH) {
        result.warn(w);
    }
    result.extend_warnings(buffer.warnings.iter().cloned());
}

fn prepare(
    request: &BufferRequest,
    forced: Option<BufferMethod>,
    settings: &CalcSettings,
    catalog: &BufferCatalog,
) -> Result<CalculationResult> {
    request.validate()?;
    let mut result = CalculationResult::new();
    let pKa = corrected_pKa(request, settings, &mut result)?;
    let method = forced.unwrap_or_else(|| BufferMethod::select(&pKa, settings.polyprotic_gap));
    debug!(
        "buffer '{}' at pH {}: {}",
        request.buffer.id,
        request.target_pH,
        method.method_name()
    );
    result.step(format!("Method: {}", method.method_name()));
    method.compose(request, &pKa, &mut result)?;
    let beta = buffer_capacity(
        &pKa,
        request.target_pH,
        request.total_concentration_molar,
        get_pKw(request.temperature_C),
    );
    result.step(format!("Buffer capacity β = {:.4e} mol/(L·pH)", beta));
    result.pH = Some(request.target_pH);
    annotate(request, &pKa, settings, catalog, &mut result);
    Ok(result)
}

/// Buffer recipe with the method chosen from the pKa spacing.
pub fn calculate_buffer_preparation_with_settings(
    request: &BufferRequest,
    settings: &CalcSettings,
    catalog: &BufferCatalog,
) -> CalculationResult {
    CalculationResult::from_result(prepare(request, None, settings, catalog))
}

/// Buffer recipe with a caller-chosen method.
pub fn calculate_buffer_preparation_using(
    method: BufferMethod,
    request: &BufferRequest,
    settings: &CalcSettings,
    catalog: &BufferCatalog,
) -> CalculationResult {
    CalculationResult::from_result(prepare(request, Some(method), settings, catalog))
}

/// Buffer recipe with default settings and the built-in catalog for suggestions.
///
/// ```
/// use BufferLab::AcidBase::buffer_preparation::calculate_buffer_preparation;
/// use BufferLab::Catalog::catalog_api::BufferCatalog;
///
/// let hepes = BufferCatalog::builtin().get("hepes").unwrap();
/// let result = calculate_buffer_preparation(hepes, 7.48, 0.05, 500.0, 25.0, None);
/// assert!(result.success);
/// let acid = result.acid_amount.unwrap();
/// let base = result.base_amount.unwrap();
/// assert!((acid.moles - base.moles).abs() < 1e-12);
/// ```
#[allow(non_snake_case)]
pub fn calculate_buffer_preparation(
    buffer: &BufferSystem,
    target_pH: f64,
    total_concentration_molar: f64,
    final_volume_mL: f64,
    temperature_C: f64,
    ionic_strength_molar: Option<f64>,
) -> CalculationResult {
    let request = BufferRequest::new(
        buffer,
        target_pH,
        total_concentration_molar,
        final_volume_mL,
        temperature_C,
        ionic_strength_molar,
    );
    calculate_buffer_preparation_with_settings(&request, &CalcSettings::default(), BufferCatalog::builtin())
}

/// Henderson-Hasselbalch recipe regardless of the pKa spacing.
#[allow(non_snake_case)]
pub fn calculate_henderson_hasselbalch_preparation(
    buffer: &BufferSystem,
    target_pH: f64,
    total_concentration_molar: f64,
    final_volume_mL: f64,
    temperature_C: f64,
    ionic_strength_molar: Option<f64>,
) -> CalculationResult {
    let request = BufferRequest::new(
        buffer,
        target_pH,
        total_concentration_molar,
        final_volume_mL,
        temperature_C,
        ionic_strength_molar,
    );
    calculate_buffer_preparation_using(
        BufferMethod::HendersonHasselbalch(HendersonHasselbalch),
        &request,
        &CalcSettings::default(),
        BufferCatalog::builtin(),
    )
}

/// Species-distribution recipe regardless of the pKa spacing.
#[allow(non_snake_case)]
pub fn calculate_polyprotic_buffer_preparation(
    buffer: &BufferSystem,
    target_pH: f64,
    total_concentration_molar: f64,
    final_volume_mL: f64,
    temperature_C: f64,
    ionic_strength_molar: Option<f64>,
) -> CalculationResult {
    let request = BufferRequest::new(
        buffer,
        target_pH,
        total_concentration_molar,
        final_volume_mL,
        temperature_C,
        ionic_strength_molar,
    );
    calculate_buffer_preparation_using(
        BufferMethod::Polyprotic(Polyprotic),
        &request,
        &CalcSettings::default(),
        BufferCatalog::builtin(),
    )
}
