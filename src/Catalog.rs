//! Reference data of the calculators: buffer systems, strong acids and bases and
//! the table of hazardous combinations.
//!
//! The built-in catalog is embedded JSON parsed once per process; a catalog file
//! with the same layout can replace it.
//! ```
//! use BufferLab::Catalog::catalog_api::BufferCatalog;
//! let catalog = BufferCatalog::builtin();
//! let hepes = catalog.find("HEPES").unwrap();
//! assert_eq!(hepes.pKa, vec![7.48]);
//! ```

/// buffer system record
pub mod buffer_system;
/// registry of the catalog records
pub mod catalog_api;
/// co-occurring chemical hazards
pub mod incompatibility;
/// molar mass of chemical formulas
pub mod molmass;
/// strong acid/base record
pub mod strong_acid_base;
