//! Temperature correction of pKa and pKw.
//!
//! pKa(T) = pKa(25 °C) + dpKa/dT · (T − 25), with one dpKa/dT for all steps of a
//! system. pKw is interpolated in a table of measured values and clamped to the
//! table ends outside 0..100 °C.
use crate::Catalog::buffer_system::BufferSystem;
use crate::error::{AcidBaseError, Result, require_finite};

/// Temperature the catalog pKa values refer to, °C
pub const REFERENCE_TEMPERATURE: f64 = 25.0;

/// (°C, pKw) of pure water
const PKW_TABLE: [(f64, f64); 16] = [
    (0.0, 14.94),
    (5.0, 14.73),
    (10.0, 14.53),
    (15.0, 14.35),
    (20.0, 14.17),
    (25.0, 14.00),
    (30.0, 13.83),
    (35.0, 13.68),
    (40.0, 13.53),
    (45.0, 13.40),
    (50.0, 13.26),
    (60.0, 13.02),
    (70.0, 12.80),
    (80.0, 12.60),
    (90.0, 12.42),
    (100.0, 12.26),
];

#[allow(non_snake_case)]
pub fn pKa_at_temperature(pKa: f64, dpKadT: f64, T: f64) -> f64 {
    pKa + dpKadT * (T - REFERENCE_TEMPERATURE)
}

/// pKa number `index` (catalog order) of a buffer at temperature `T`, °C.
/// At 25 °C the catalog value comes back unchanged.
#[allow(non_snake_case)]
pub fn get_pKa_at_temperature(buffer: &BufferSystem, T: f64, index: usize) -> Result<f64> {
    require_finite("temperature", T)?;
    let pKa = buffer
        .pKa
        .get(index)
        .copied()
        .ok_or_else(|| AcidBaseError::PKaIndexOutOfRange {
            buffer: buffer.id.clone(),
            index,
            len: buffer.pKa.len(),
        })?;
    Ok(pKa_at_temperature(pKa, buffer.dpKadT, T))
}

/// All pKa of a buffer at temperature `T`, ascending.
#[allow(non_snake_case)]
pub fn corrected_pKa_values(buffer: &BufferSystem, T: f64) -> Vec<f64> {
    buffer
        .sorted_pKa()
        .into_iter()
        .map(|pKa| pKa_at_temperature(pKa, buffer.dpKadT, T))
        .collect()
}

/// Shift of every pKa of the buffer between 25 °C and `T`.
#[allow(non_snake_case)]
pub fn pKa_shift(buffer: &BufferSystem, T: f64) -> f64 {
    buffer.dpKadT * (T - REFERENCE_TEMPERATURE)
}

/// pKw at temperature `T`, °C. Linear between table points, clamped outside the table.
#[allow(non_snake_case)]
pub fn get_pKw(T: f64) -> f64 {
    let (first_T, first_pKw) = PKW_TABLE[0];
    let (last_T, last_pKw) = PKW_TABLE[PKW_TABLE.len() - 1];
    // NaN: 25 °C value
    if T.is_nan() {
        return PKW_TABLE[5].1;
    }
    if T <= first_T {
        return first_pKw;
    }
    if T >= last_T {
        return last_pKw;
    }
    for pair in PKW_TABLE.windows(2) {
        let (T0, pKw0) = pair[0];
        let (T1, pKw1) = pair[1];
        if T == T0 {
            return pKw0;
        }
        if T > T0 && T < T1 {
            return pKw0 + (pKw1 - pKw0) * (T - T0) / (T1 - T0);
        }
    }
    last_pKw
}

/// True when `T` lies outside the pKw table and the value was clamped.
#[allow(non_snake_case)]
pub fn pKw_is_clamped(T: f64) -> bool {
    T < PKW_TABLE[0].0 || T > PKW_TABLE[PKW_TABLE.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog::buffer_system::test_buffer;
    use approx::assert_relative_eq;

    #[test]
    fn no_correction_at_reference_temperature() {
        let buffer = test_buffer("phosphate", vec![7.20, 2.15, 12.35], -0.0028);
        for i in 0..3 {
            assert_eq!(get_pKa_at_temperature(&buffer, 25.0, i).unwrap(), buffer.pKa[i]);
        }
    }

    #[test]
    fn tris_at_cold_room() {
        let tris = test_buffer("tris", vec![8.06], -0.028);
        let pKa = get_pKa_at_temperature(&tris, 4.0, 0).unwrap();
        assert_relative_eq!(pKa, 8.06 + 0.588, epsilon = 1e-9);
        assert_relative_eq!(pKa_shift(&tris, 37.0), -0.336, epsilon = 1e-9);
    }

    #[test]
    fn index_out_of_range() {
        let tris = test_buffer("tris", vec![8.06], -0.028);
        assert!(matches!(
            get_pKa_at_temperature(&tris, 25.0, 1),
            Err(AcidBaseError::PKaIndexOutOfRange { index: 1, len: 1, .. })
        ));
        assert!(get_pKa_at_temperature(&tris, f64::NAN, 0).is_err());
    }

    #[test]
    fn corrected_values_are_sorted() {
        let citrate = test_buffer("citrate", vec![6.40, 3.13, 4.76], -0.0024);
        let pKa = corrected_pKa_values(&citrate, 37.0);
        assert!(pKa.windows(2).all(|w| w[0] < w[1]));
        assert_relative_eq!(pKa[0], 3.13 - 0.0024 * 12.0, epsilon = 1e-12);
    }

    #[test]
    fn pkw_table_and_interpolation() {
        assert_eq!(get_pKw(25.0), 14.00);
        assert_eq!(get_pKw(0.0), 14.94);
        assert_relative_eq!(get_pKw(37.0), 13.68 + (13.53 - 13.68) * 2.0 / 5.0, epsilon = 1e-12);
        assert_relative_eq!(get_pKw(22.5), (14.17 + 14.00) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn pkw_clamps_outside_table() {
        assert_eq!(get_pKw(-10.0), 14.94);
        assert_eq!(get_pKw(150.0), 12.26);
        assert!(pKw_is_clamped(-10.0));
        assert!(!pKw_is_clamped(37.0));
    }
}
