//! Acid-base equilibrium engine.
//!
//! Every calculator is a pure function of its inputs and the read-only buffer catalog.
//! A request flows through the temperature and ionic strength corrections, one of the
//! calculators, and the advisory checks; the answer is a [`calculation_result::CalculationResult`]
//! holding amounts, pH, species, warnings and a step trace. Bad input does not panic or
//! return `Err`: it comes back as `success == false` with one message.
//! # Examples
//! ```
//! use BufferLab::AcidBase::buffer_preparation::calculate_buffer_preparation;
//! use BufferLab::Catalog::catalog_api::BufferCatalog;
//!
//! let tris = BufferCatalog::builtin().find("Tris").unwrap();
//! // Tris made up in the cold room
//! let result = calculate_buffer_preparation(tris, 8.0, 0.05, 1000.0, 4.0, None);
//! assert!(result.success);
//! assert!(result.has_critical_warnings());
//! result.pretty_print();
//! ```

/// dead zones, temperature sensitivity, suggestions, incompatibilities
pub mod advisory;
/// buffer recipes: Henderson-Hasselbalch and polyprotic
pub mod buffer_preparation;
pub mod calculation_result;
/// Davies activity correction
pub mod ionic_strength;
/// strong acid/base titrant for a pH change
pub mod ph_adjustment;
pub mod species_distribution;
pub mod strong_acid_base;
/// pKa(T), pKw(T)
pub mod temperature;
