//! Protonation-state distribution of an n-pKa system.
//!
//! For state i (0 = fully protonated, n = fully deprotonated)
//!
//! x_i = Π_{k<i} Ka_k · [H+]^(n−i) / Σ_j Π_{k<j} Ka_k · [H+]^(n−j)
//!
//! evaluated with log10 terms L_i = −Σ_{k<i} pKa_k − (n−i)·pH normalised by
//! log-sum-exp, so no term underflows however far pH is from the pKa values.
use super::calculation_result::SpeciesFraction;
use crate::error::{AcidBaseError, Result, require_finite, require_non_negative};
use std::f64::consts::LN_10;

/// Generic label of the state with `protons` protons and charge `charge`: H2A-, HA2-, A3-, H2A+.
pub fn species_label(protons: usize, charge: i32) -> String {
    let h = match protons {
        0 => String::new(),
        1 => "H".to_string(),
        n => format!("H{}", n),
    };
    let z = match charge {
        0 => String::new(),
        1 => "+".to_string(),
        -1 => "-".to_string(),
        c if c > 0 => format!("{}+", c),
        c => format!("{}-", -c),
    };
    format!("{}A{}", h, z)
}

/// Labels of all n+1 states, most protonated first; the first one carries `acid_charge`.
pub fn species_labels(n: usize, acid_charge: i32) -> Vec<String> {
    (0..=n)
        .map(|i| species_label(n - i, acid_charge - i as i32))
        .collect()
}

/// Mole fractions of the n+1 states at `pH`, from an ascending pKa list.
///
/// Terms are taken relative to the fully protonated state, log10(αᵢ/α₀) = i·pH − ΣpKa,
/// so α₀ never overflows. Far enough above every pKa several terms reach +∞;
/// the highest of them dominates and takes the whole fraction.
#[allow(non_snake_case)]
pub fn alpha_fractions(pKa: &[f64], pH: f64) -> Vec<f64> {
    let n = pKa.len();
    let mut log_terms = Vec::with_capacity(n + 1);
    let mut sum_pKa = 0.0;
    for i in 0..=n {
        if i > 0 {
            sum_pKa += pKa[i - 1];
        }
        log_terms.push(i as f64 * pH - sum_pKa);
    }
    if let Some(top) = log_terms.iter().rposition(|l| *l == f64::INFINITY) {
        return (0..=n).map(|i| if i == top { 1.0 } else { 0.0 }).collect();
    }
    let max = log_terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = log_terms
        .iter()
        .map(|l| ((l - max) * LN_10).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| w / total).collect()
}

/// Equilibrium fractions of every protonation state at `pH`.
///
/// The pKa values may come in any order; a sorted copy defines the states.
/// With `total_concentration` (mol/L) each record carries its absolute concentration.
#[allow(non_snake_case)]
pub fn calculate_species_distribution(
    pKa: &[f64],
    pH: f64,
    total_concentration: Option<f64>,
) -> Result<Vec<SpeciesFraction>> {
    calculate_labeled_species_distribution(pKa, pH, total_concentration, None)
}

/// Same as [`calculate_species_distribution`] with explicit state labels.
#[allow(non_snake_case)]
pub fn calculate_labeled_species_distribution(
    pKa: &[f64],
    pH: f64,
    total_concentration: Option<f64>,
    labels: Option<&[String]>,
) -> Result<Vec<SpeciesFraction>> {
    require_finite("pH", pH)?;
    for p in pKa {
        require_finite("pKa", *p)?;
    }
    if let Some(c) = total_concentration {
        require_non_negative("total concentration", c)?;
    }
    let mut sorted = pKa.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let labels = match labels {
        Some(labels) if labels.len() == sorted.len() + 1 => labels.to_vec(),
        Some(labels) => {
            return Err(AcidBaseError::invalid_input(
                "species labels",
                labels.len() as f64,
                format!("{} pKa values need {} labels", sorted.len(), sorted.len() + 1),
            ));
        }
        None => species_labels(sorted.len(), 0),
    };
    let fractions = alpha_fractions(&sorted, pH);
    Ok(fractions
        .into_iter()
        .zip(labels)
        .map(|(fraction, formula)| SpeciesFraction {
            formula,
            fraction,
            concentration: total_concentration.map(|c| c * fraction),
        })
        .collect())
}

/// Mean number of bound protons, Σ x_i·(n − i)
pub fn mean_bound_protons(fractions: &[f64]) -> f64 {
    let n = fractions.len().saturating_sub(1);
    fractions
        .iter()
        .enumerate()
        .map(|(i, x)| x * (n - i) as f64)
        .sum()
}

/// Buffer capacity β = dC_base/dpH, mol/(L·pH).
///
/// β = ln10 · ([H+] + [OH−] + C·(Σ i²·x_i − (Σ i·x_i)²)), i counting released protons.
#[allow(non_snake_case)]
pub fn buffer_capacity(pKa: &[f64], pH: f64, total_concentration: f64, pKw: f64) -> f64 {
    let mut sorted = pKa.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let x = alpha_fractions(&sorted, pH);
    let mean: f64 = x.iter().enumerate().map(|(i, xi)| i as f64 * xi).sum();
    let mean_sq: f64 = x.iter().enumerate().map(|(i, xi)| (i * i) as f64 * xi).sum();
    let h = 10f64.powf(-pH);
    let oh = 10f64.powf(pH - pKw);
    LN_10 * (h + oh + total_concentration * (mean_sq - mean * mean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn sum(species: &[SpeciesFraction]) -> f64 {
        species.iter().map(|s| s.fraction).sum()
    }

    #[test]
    fn fractions_sum_to_one_everywhere() {
        let systems: [&[f64]; 4] = [&[], &[8.06], &[2.15, 7.20, 12.35], &[3.13, 4.76, 6.40]];
        for pKa in systems {
            let mut pH = -2.0;
            while pH <= 16.0 {
                let species = calculate_species_distribution(pKa, pH, None).unwrap();
                assert_eq!(species.len(), pKa.len() + 1);
                assert_abs_diff_eq!(sum(&species), 1.0, epsilon = 1e-6);
                assert!(species.iter().all(|s| (0.0..=1.0).contains(&s.fraction)));
                pH += 0.25;
            }
            for pH in [-f64::MAX, -1e308, -1e5, 1e5, 1e308, f64::MAX] {
                let species = calculate_species_distribution(pKa, pH, None).unwrap();
                assert!(species.iter().all(|s| s.fraction.is_finite()), "{:?} at {}", pKa, pH);
                assert_abs_diff_eq!(sum(&species), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn extreme_ph_picks_the_end_states() {
        let phosphate = [2.15, 7.20, 12.35];
        let acid = alpha_fractions(&phosphate, -1e308);
        assert_eq!(acid[0], 1.0);
        assert!(acid[1..].iter().all(|a| *a == 0.0));
        let base = alpha_fractions(&phosphate, 1e308);
        assert_eq!(base[3], 1.0);
        assert!(base[..3].iter().all(|a| *a == 0.0));
    }

    #[test]
    fn half_and_half_at_pka() {
        let species = calculate_species_distribution(&[4.76], 4.76, None).unwrap();
        assert_relative_eq!(species[0].fraction, 0.5, epsilon = 1e-12);
        assert_relative_eq!(species[1].fraction, 0.5, epsilon = 1e-12);
        assert_eq!(species[0].formula, "HA");
        assert_eq!(species[1].formula, "A-");
    }

    #[test]
    fn unsorted_input_gives_ordered_states() {
        let a = calculate_species_distribution(&[12.35, 2.15, 7.20], 7.20, None).unwrap();
        let b = calculate_species_distribution(&[2.15, 7.20, 12.35], 7.20, None).unwrap();
        assert_eq!(a, b);
        // H2PO4- and HPO4 2- dominate equally at pKa2
        assert_relative_eq!(a[1].fraction, a[2].fraction, epsilon = 1e-9);
        assert_eq!(a[0].formula, "H3A");
        assert_eq!(a[3].formula, "A3-");
    }

    #[test]
    fn far_outside_pka_span_stays_finite() {
        let species = calculate_species_distribution(&[2.15, 7.20, 12.35], 40.0, None).unwrap();
        assert!(species.iter().all(|s| s.fraction.is_finite()));
        assert_relative_eq!(species[3].fraction, 1.0, epsilon = 1e-12);
        let species = calculate_species_distribution(&[2.15, 7.20, 12.35], -30.0, None).unwrap();
        assert_relative_eq!(species[0].fraction, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn absolute_concentrations() {
        let species = calculate_species_distribution(&[7.48], 7.48, Some(0.05)).unwrap();
        for s in &species {
            assert_relative_eq!(s.concentration.unwrap(), 0.025, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(calculate_species_distribution(&[7.0], f64::NAN, None).is_err());
        assert!(calculate_species_distribution(&[f64::INFINITY], 7.0, None).is_err());
        assert!(calculate_species_distribution(&[7.0], 7.0, Some(-1.0)).is_err());
        let labels = vec!["HA".to_string()];
        assert!(calculate_labeled_species_distribution(&[7.0], 7.0, None, Some(&labels)).is_err());
    }

    #[test]
    fn labels_with_charges() {
        assert_eq!(species_labels(2, 1), vec!["H2A+", "HA", "A-"]);
        assert_eq!(species_labels(3, 0), vec!["H3A", "H2A-", "HA2-", "A3-"]);
        assert_eq!(species_label(1, 2), "HA2+");
    }

    #[test]
    fn bound_protons_and_capacity() {
        let x = alpha_fractions(&[4.76], 4.76);
        assert_relative_eq!(mean_bound_protons(&x), 0.5, epsilon = 1e-12);
        // 0.1 M monoprotic buffer at pH = pKa: β ≈ ln10·C/4
        let beta = buffer_capacity(&[7.0], 7.0, 0.1, 14.0);
        assert_relative_eq!(beta, LN_10 * (2e-7 + 0.025), epsilon = 1e-9);
        // capacity falls away from the pKa
        assert!(buffer_capacity(&[7.0], 9.0, 0.1, 14.0) < beta / 5.0);
    }
}
