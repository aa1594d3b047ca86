/// calculator dialogs
pub mod cli_calculators;
/// catalog browsing, incompatibilities and settings
pub mod cli_catalog;
/// main menu and input helpers
pub mod cli_main;
