//! Ionic strength correction of pKa with the Davies equation
//!
//! log10 γ = −A·z²·(√I/(1+√I) − 0.3·I)
//!
//! For a step HA(z) ⇌ H+ + A(z−1), with pH read as an activity, the concentration
//! pKa becomes pKa' = pKa + (2z − 1)·A·(√I/(1+√I) − 0.3·I). A neutral acid (z = 0)
//! gives pKa' = pKa + log10 γ(|z| = 1).
use crate::error::{Result, require_finite, require_non_negative};

/// A of the Davies equation in water at 25 °C
pub const DAVIES_A_25C: f64 = 0.51;

/// Bracket of the Davies equation, f(I) = √I/(1+√I) − 0.3·I
#[allow(non_snake_case)]
pub fn davies_term(I: f64) -> f64 {
    let sqrt_I = I.sqrt();
    sqrt_I / (1.0 + sqrt_I) - 0.3 * I
}

/// log10 of the activity coefficient of an ion of charge `z`
#[allow(non_snake_case)]
pub fn davies_log_gamma(I: f64, z: i32, A: f64) -> f64 {
    -A * f64::from(z * z) * davies_term(I)
}

/// Ionic strength of a mixture of ions given as (concentration mol/L, charge), ½·Σ c·z²
pub fn ionic_strength_from_ions(ions: &[(f64, i32)]) -> f64 {
    0.5 * ions
        .iter()
        .map(|(c, z)| c * f64::from(z * z))
        .sum::<f64>()
}

/// pKa after correction, plus an accuracy note when I exceeds the validity limit
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct IonicCorrection {
    pub pKa: f64,
    pub shift: f64,
    pub warning: Option<String>,
}

/// Corrects one pKa whose acid form carries charge `acid_charge`.
///
/// Above `limit` (mol/L) the correction is still applied; the result then
/// carries a warning about reduced accuracy.
#[allow(non_snake_case)]
pub fn correct_pKa_for_ionic_strength(
    pKa: f64,
    I: f64,
    acid_charge: i32,
    A: f64,
    limit: f64,
) -> Result<IonicCorrection> {
    require_finite("pKa", pKa)?;
    require_non_negative("ionic strength", I)?;
    let shift = f64::from(2 * acid_charge - 1) * A * davies_term(I);
    let warning = (I > limit).then(|| {
        format!(
            "Ionic strength {:.3} M exceeds {:.2} M; the Davies correction loses accuracy",
            I, limit
        )
    });
    Ok(IonicCorrection {
        pKa: pKa + shift,
        shift,
        warning,
    })
}

/// Corrects an ascending pKa list; step k has acid charge `acid_charge − k`.
#[allow(non_snake_case)]
pub fn correct_pKa_values(
    pKa: &[f64],
    I: f64,
    acid_charge: i32,
    A: f64,
    limit: f64,
) -> Result<(Vec<f64>, Option<String>)> {
    let mut corrected = Vec::with_capacity(pKa.len());
    let mut warning = None;
    for (k, p) in pKa.iter().enumerate() {
        let correction = correct_pKa_for_ionic_strength(*p, I, acid_charge - k as i32, A, limit)?;
        corrected.push(correction.pKa);
        warning = warning.or(correction.warning);
    }
    Ok((corrected, warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_ionic_strength_changes_nothing() {
        let c = correct_pKa_for_ionic_strength(7.2, 0.0, 0, DAVIES_A_25C, 0.5).unwrap();
        assert_eq!(c.pKa, 7.2);
        assert!(c.warning.is_none());
    }

    #[test]
    fn neutral_acid_matches_log_gamma() {
        let I = 0.1;
        let c = correct_pKa_for_ionic_strength(4.76, I, 0, DAVIES_A_25C, 0.5).unwrap();
        assert_relative_eq!(c.pKa, 4.76 + davies_log_gamma(I, 1, DAVIES_A_25C), epsilon = 1e-12);
        // ~ -0.11 at 0.1 M
        assert!(c.shift < -0.10 && c.shift > -0.12);
    }

    #[test]
    fn cationic_acid_shifts_up() {
        // TrisH+ -> Tris
        let c = correct_pKa_for_ionic_strength(8.06, 0.1, 1, DAVIES_A_25C, 0.5).unwrap();
        assert!(c.shift > 0.0);
        // H2PO4- -> HPO4 2-
        let c = correct_pKa_for_ionic_strength(7.20, 0.1, -1, DAVIES_A_25C, 0.5).unwrap();
        assert_relative_eq!(c.shift, 3.0 * davies_log_gamma(0.1, 1, DAVIES_A_25C), epsilon = 1e-12);
    }

    #[test]
    fn high_ionic_strength_warns_but_corrects() {
        let c = correct_pKa_for_ionic_strength(7.0, 0.8, 0, DAVIES_A_25C, 0.5).unwrap();
        assert!(c.warning.is_some());
        assert_ne!(c.pKa, 7.0);
        assert!(correct_pKa_for_ionic_strength(7.0, -0.1, 0, DAVIES_A_25C, 0.5).is_err());
    }

    #[test]
    fn per_step_charges() {
        let (pKa, warning) = correct_pKa_values(&[2.15, 7.20, 12.35], 0.1, 0, DAVIES_A_25C, 0.5).unwrap();
        let f = DAVIES_A_25C * davies_term(0.1);
        assert_relative_eq!(pKa[0], 2.15 - f, epsilon = 1e-12);
        assert_relative_eq!(pKa[1], 7.20 - 3.0 * f, epsilon = 1e-12);
        assert_relative_eq!(pKa[2], 12.35 - 5.0 * f, epsilon = 1e-12);
        assert!(warning.is_none());
    }

    #[test]
    fn ionic_strength_of_salts() {
        // 0.1 M NaCl
        assert_relative_eq!(ionic_strength_from_ions(&[(0.1, 1), (0.1, -1)]), 0.1);
        // 0.1 M Na2HPO4
        assert_relative_eq!(ionic_strength_from_ions(&[(0.2, 1), (0.1, -2)]), 0.3);
    }
}
