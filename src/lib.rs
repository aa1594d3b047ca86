//! # BufferLab
//!
//! Acid-base equilibrium engine for the laboratory bench: buffer recipes
//! (Henderson-Hasselbalch and polyprotic), strong acid/base pH, pH adjustment with
//! strong reagents, protonation-state distributions, temperature and ionic strength
//! corrections of pKa, and advisory warnings (dead zones, Tris temperature hazard,
//! chemical incompatibilities) over a catalog of common buffer systems.
#[allow(non_snake_case)]
pub mod AcidBase;
#[allow(non_snake_case)]
pub mod Catalog;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod error;
pub mod settings;

pub use AcidBase::calculation_result::CalculationResult;
pub use Catalog::catalog_api::BufferCatalog;
pub use error::{AcidBaseError, Result};
pub use settings::{CalcSettings, SettingsManager};
