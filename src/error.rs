//! Error type shared by the acid-base engine, the buffer catalog and the settings loader.
//!
//! Calculators never return these to the caller directly: a failed validation is
//! folded into a `CalculationResult` with `success == false`. Loaders and lookups
//! (catalog, settings, species solver) return them as ordinary `Result`s.

use thiserror::Error;

/// Result type alias using [`AcidBaseError`].
pub type Result<T> = std::result::Result<T, AcidBaseError>;

#[derive(Error, Debug)]
pub enum AcidBaseError {
    // ============ Input validation ============
    /// A required numeric input is non-finite or outside its domain
    #[error("Invalid value for {parameter}: {value} ({reason})")]
    InvalidInput {
        parameter: String,
        value: f64,
        reason: String,
    },

    /// Buffer system without any pKa value
    #[error("Buffer system '{buffer}' has no pKa values")]
    EmptyPKa { buffer: String },

    /// pKa index outside the buffer's pKa list
    #[error("Buffer system '{buffer}' has {len} pKa value(s), index {index} is out of range")]
    PKaIndexOutOfRange {
        buffer: String,
        index: usize,
        len: usize,
    },

    /// Molar mass for a chemical form is not declared
    #[error("Buffer system '{buffer}' declares no molar mass for the '{form}' form")]
    MissingMolarMass { buffer: String, form: String },

    // ============ Catalog ============
    #[error("Unknown buffer system '{id}'")]
    UnknownBuffer { id: String },

    #[error("Unknown strong acid/base '{id}'")]
    UnknownReagent { id: String },

    #[error("Duplicate catalog id '{id}'")]
    DuplicateId { id: String },

    /// Catalog record violating a data-model invariant
    #[error("Invalid catalog record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Cannot parse chemical formula '{formula}': {reason}")]
    FormulaParse { formula: String, reason: String },

    // ============ I/O ============
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcidBaseError {
    /// Create an invalid input error
    pub fn invalid_input(parameter: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an invalid catalog record error
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Fails unless `value` is finite.
pub fn require_finite(parameter: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AcidBaseError::invalid_input(parameter, value, "must be a finite number"))
    }
}

/// Fails unless `value` is finite and strictly positive.
pub fn require_positive(parameter: &str, value: f64) -> Result<f64> {
    require_finite(parameter, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(AcidBaseError::invalid_input(parameter, value, "must be greater than zero"))
    }
}

/// Fails unless `value` is finite and not negative.
pub fn require_non_negative(parameter: &str, value: f64) -> Result<f64> {
    require_finite(parameter, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(AcidBaseError::invalid_input(parameter, value, "must not be negative"))
    }
}
