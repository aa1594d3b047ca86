//! Warnings attached to calculator results: dead zones, temperature sensitivity,
//! the Tris temperature hazard, buffer suggestions and chemical incompatibilities.
//! All functions are pure over their arguments and the read-only catalog.
use super::calculation_result::CRITICAL_PREFIX;
use super::temperature::{REFERENCE_TEMPERATURE, pKa_shift};
use crate::Catalog::buffer_system::BufferSystem;
use crate::Catalog::catalog_api::BufferCatalog;
use crate::Catalog::incompatibility::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default dead-zone half width, pH units
pub const DEAD_ZONE_WIDTH: f64 = 1.0;
/// Temperature distance from 25 °C that triggers a pKa drift warning, °C
const TEMPERATURE_WARNING_DELTA: f64 = 5.0;

/// Bands of |dpKa/dT|, K⁻¹
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemperatureSensitivity {
    /// below 0.010
    Minimal,
    /// 0.010 - 0.015
    Low,
    /// 0.015 - 0.020
    Moderate,
    /// 0.020 - 0.025
    High,
    /// 0.025 and above
    VeryHigh,
}

impl TemperatureSensitivity {
    #[allow(non_snake_case)]
    pub fn from_dpKadT(dpKadT: f64) -> Self {
        let magnitude = dpKadT.abs();
        if magnitude < 0.010 {
            TemperatureSensitivity::Minimal
        } else if magnitude < 0.015 {
            TemperatureSensitivity::Low
        } else if magnitude < 0.020 {
            TemperatureSensitivity::Moderate
        } else if magnitude < 0.025 {
            TemperatureSensitivity::High
        } else {
            TemperatureSensitivity::VeryHigh
        }
    }
}

impl fmt::Display for TemperatureSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TemperatureSensitivity::Minimal => "minimal",
            TemperatureSensitivity::Low => "low",
            TemperatureSensitivity::Moderate => "moderate",
            TemperatureSensitivity::High => "high",
            TemperatureSensitivity::VeryHigh => "very high",
        };
        write!(f, "{}", s)
    }
}

pub fn get_temperature_sensitivity(buffer: &BufferSystem) -> TemperatureSensitivity {
    TemperatureSensitivity::from_dpKadT(buffer.dpKadT)
}

/// True when `pH` is more than `width` from every pKa. Exactly `width` away is not dead.
#[allow(non_snake_case)]
pub fn is_dead_zone(pKa: &[f64], pH: f64, width: f64) -> bool {
    pKa.iter().all(|p| (pH - p).abs() > width)
}

/// Dead-zone test against the catalog pKa values (25 °C).
#[allow(non_snake_case)]
pub fn is_in_dead_zone(buffer: &BufferSystem, target_pH: f64) -> bool {
    is_dead_zone(&buffer.pKa, target_pH, DEAD_ZONE_WIDTH)
}

/// Catalog buffers whose effective range covers `target_pH`, best first
/// (smallest distance from the target to one of their pKa values).
#[allow(non_snake_case)]
pub fn get_suggested_buffers(target_pH: f64, catalog: &BufferCatalog) -> Vec<&BufferSystem> {
    let distance = |b: &BufferSystem| {
        b.pKa
            .iter()
            .map(|p| (p - target_pH).abs())
            .fold(f64::INFINITY, f64::min)
    };
    let mut suggestions: Vec<&BufferSystem> = catalog
        .iter()
        .filter(|b| b.effective_range.contains(target_pH))
        .collect();
    suggestions.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
    suggestions
}

/// Name tokens allowed next to "tris" in a plain Tris record ("Tris", "Tris-HCl", "Tris base").
/// Bis-Tris, Tris-glycine and similar are different buffers.
const TRIS_NAME_TOKENS: [&str; 3] = ["tris", "hcl", "base"];

pub fn is_tris(buffer: &BufferSystem) -> bool {
    if buffer.id.eq_ignore_ascii_case("tris") {
        return true;
    }
    let tokens = tokenize(&[buffer.name.as_str()]);
    tokens.contains("tris") && tokens.iter().all(|t| TRIS_NAME_TOKENS.contains(&t.as_str()))
}

/// Temperature warnings for a buffer used at `T`, °C.
///
/// Tris away from 25 °C always gets a `CRITICAL` warning; other Moderate-or-worse
/// buffers are warned when |T − 25| reaches 5 °C.
#[allow(non_snake_case)]
pub fn temperature_warnings(buffer: &BufferSystem, T: f64) -> Vec<String> {
    let mut warnings = Vec::new();
    let shift = pKa_shift(buffer, T);
    let sensitivity = get_temperature_sensitivity(buffer);
    if is_tris(buffer) && T != REFERENCE_TEMPERATURE {
        warnings.push(format!(
            "{}Tris pKa shifts by {:+.3} at {:.1} °C (dpKa/dT = {}); a Tris buffer titrated at 25 °C will read {:+.2} pH units off at {:.1} °C. Adjust pH at the working temperature.",
            CRITICAL_PREFIX, shift, T, buffer.dpKadT, shift, T
        ));
    } else if sensitivity >= TemperatureSensitivity::Moderate
        && (T - REFERENCE_TEMPERATURE).abs() >= TEMPERATURE_WARNING_DELTA
    {
        warnings.push(format!(
            "{} has {} temperature sensitivity (dpKa/dT = {}); pKa shifts by {:+.3} at {:.1} °C",
            buffer.name, sensitivity, buffer.dpKadT, shift, T
        ));
    }
    warnings
}

/// Dead-zone warning with alternatives, `None` when `pH` is inside the buffering region.
#[allow(non_snake_case)]
pub fn dead_zone_warning(
    buffer: &BufferSystem,
    pKa: &[f64],
    pH: f64,
    width: f64,
    catalog: &BufferCatalog,
) -> Option<String> {
    if !is_dead_zone(pKa, pH, width) {
        return None;
    }
    let alternatives: Vec<&str> = get_suggested_buffers(pH, catalog)
        .into_iter()
        .filter(|b| b.id != buffer.id)
        .take(3)
        .map(|b| b.name.as_str())
        .collect();
    let mut message = format!(
        "pH {:.2} is more than {:.1} unit from every pKa of {}: poor buffering capacity",
        pH, width, buffer.name
    );
    if !alternatives.is_empty() {
        message.push_str(&format!("; consider {}", alternatives.join(", ")));
    }
    Some(message)
}

#[allow(non_snake_case)]
pub fn range_warning(buffer: &BufferSystem, pH: f64) -> Option<String> {
    let range = buffer.effective_range;
    (!range.contains(pH)).then(|| {
        format!(
            "pH {:.2} is outside the effective range of {} ({:.1}-{:.1})",
            pH, buffer.name, range.low, range.high
        )
    })
}

/// Hazards of a set of chemicals, from the catalog's incompatibility table.
/// A rule fires when at least two of its chemicals appear among the name tokens.
pub fn check_incompatibilities<S: AsRef<str>>(chemicals: &[S], catalog: &BufferCatalog) -> Vec<String> {
    let tokens = tokenize(chemicals);
    catalog
        .incompatibilities()
        .iter()
        .filter(|rule| rule.fires(&tokens))
        .map(|rule| rule.message())
        .collect()
}

/// Hazards of adding `additives` to `buffer`: the buffer's own incompatibility list
/// plus the table rules, with the buffer id and name counted as chemicals.
/// A table rule must also name an additive that is not part of the buffer itself,
/// so a buffer never conflicts with its own name.
pub fn check_buffer_additives<S: AsRef<str>>(
    buffer: &BufferSystem,
    additives: &[S],
    catalog: &BufferCatalog,
) -> Vec<String> {
    let additive_tokens = tokenize(additives);
    let mut warnings: Vec<String> = buffer
        .incompatibilities
        .iter()
        .filter(|chemical| {
            tokenize(&[chemical.as_str()])
                .iter()
                .all(|t| additive_tokens.contains(t))
        })
        .map(|chemical| format!("{} is incompatible with {}", buffer.name, chemical))
        .collect();

    let buffer_tokens = tokenize(&[buffer.id.as_str(), buffer.name.as_str()]);
    let foreign: HashSet<String> = additive_tokens.difference(&buffer_tokens).cloned().collect();
    let all_tokens: HashSet<String> = additive_tokens.union(&buffer_tokens).cloned().collect();
    for rule in catalog.incompatibilities() {
        if !rule.fires(&all_tokens) || rule.matching_tokens(&foreign) == 0 {
            continue;
        }
        let w = rule.message();
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }
    warnings
}
