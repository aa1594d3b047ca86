use super::cli_calculators::{
    buffer_preparation_dialog, ph_adjustment_dialog, species_distribution_dialog, strong_acid_base_dialog,
};
use super::cli_catalog::{catalog_menu, settings_menu};
use crate::Catalog::catalog_api::BufferCatalog;
use crate::settings::SettingsManager;
use log::{error, info};
use std::io::{self, BufRead, Write};

/// What every dialog works with: the loaded settings and the catalog they point to.
pub struct CliSession {
    pub manager: SettingsManager,
    pub catalog: BufferCatalog,
}

impl CliSession {
    pub fn new(manager: SettingsManager) -> Self {
        let catalog = load_catalog(&manager);
        Self { manager, catalog }
    }

    /// Reloads the catalog after the settings changed.
    pub fn reload_catalog(&mut self) {
        self.catalog = load_catalog(&self.manager);
    }
}

fn load_catalog(manager: &SettingsManager) -> BufferCatalog {
    match manager.settings().load_catalog() {
        Ok(catalog) => {
            info!("catalog with {} buffer systems ready", catalog.len());
            catalog
        }
        Err(e) => {
            error!("{}; falling back to the built-in catalog", e);
            BufferCatalog::builtin().clone()
        }
    }
}

pub fn run_interactive_menu(manager: SettingsManager) {
    let mut session = CliSession::new(manager);
    loop {
        show_main_menu();
        let Some(choice) = get_user_input() else {
            println!();
            info!("end of input, leaving BufferLab");
            break;
        };

        match choice.trim() {
            "1" => buffer_preparation_dialog(&session),
            "2" => strong_acid_base_dialog(&session),
            "3" => ph_adjustment_dialog(&session),
            "4" => species_distribution_dialog(&session),
            "5" => catalog_menu(&session),
            "6" => settings_menu(&mut session),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompts
Red (\x1b[31m) - input errors and CRITICAL warnings
*/
fn show_main_menu() {
    println!("\x1b[34m\n BufferLab: buffer recipes, pH and acid-base speciation \n\x1b[0m");
    println!("\x1b[33m1. Buffer preparation\x1b[0m");
    println!("\x1b[33m2. Strong acid / base pH\x1b[0m");
    println!("\x1b[33m3. pH adjustment\x1b[0m");
    println!("\x1b[33m4. Species distribution\x1b[0m");
    println!("\x1b[33m5. Buffer catalog\x1b[0m");
    println!("\x1b[33m6. Settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

pub fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    let _ = io::stdout().flush();
}

/// One line from `reader`, `None` at end of input or on a read error.
pub fn read_input_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(e) => {
            error!("failed to read input: {}", e);
            None
        }
    }
}

/// One line from stdin, `None` once stdin is closed.
pub fn get_user_input() -> Option<String> {
    read_input_line(&mut io::stdin().lock())
}

/// Number typed by the user; empty input takes `default` when there is one.
pub fn parse_number(input: &str, default: Option<f64>) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return default;
    }
    input.replace(',', ".").parse::<f64>().ok()
}

/// Comma or semicolon separated list of numbers, e.g. "3.13, 4.76, 6.40".
pub fn parse_number_list(input: &str) -> Option<Vec<f64>> {
    input
        .split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}

/// Comma separated names, blanks dropped.
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Asks until a number (or the default on empty input) is given.
/// `None` when the input ends first.
pub fn ask_number_from<R: BufRead>(reader: &mut R, text: &str, default: Option<f64>) -> Option<f64> {
    loop {
        match default {
            Some(d) => prompt(&format!("{} [{}]: ", text, d)),
            None => prompt(&format!("{}: ", text)),
        }
        let line = read_input_line(reader)?;
        if let Some(value) = parse_number(&line, default) {
            return Some(value);
        }
        println!("\x1b[31mNot a number, try again\x1b[0m");
    }
}

pub fn ask_number(text: &str, default: Option<f64>) -> Option<f64> {
    ask_number_from(&mut io::stdin().lock(), text, default)
}

pub fn ask_text(text: &str) -> Option<String> {
    prompt(&format!("{}: ", text));
    get_user_input().map(|line| line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn numbers_with_defaults() {
        assert_eq!(parse_number(" 7.4\n", None), Some(7.4));
        assert_eq!(parse_number("7,4", None), Some(7.4));
        assert_eq!(parse_number("", Some(25.0)), Some(25.0));
        assert_eq!(parse_number("\n", None), None);
        assert_eq!(parse_number("seven", Some(1.0)), None);
    }

    #[test]
    fn lists() {
        assert_eq!(parse_number_list("3.13, 4.76; 6.40"), Some(vec![3.13, 4.76, 6.40]));
        assert_eq!(parse_number_list("3.13, x"), None);
        assert_eq!(parse_number_list(""), Some(vec![]));
        assert_eq!(parse_name_list("Sodium azide, HCl ,"), vec!["Sodium azide", "HCl"]);
    }

    #[test]
    fn closed_input_ends_the_dialog() {
        let mut empty = Cursor::new("");
        assert_eq!(read_input_line(&mut empty), None);
        assert_eq!(ask_number_from(&mut empty, "Target pH", None), None);
        assert_eq!(ask_number_from(&mut Cursor::new(""), "Volume", Some(1000.0)), None);
        // retries stop at the end of input instead of spinning
        assert_eq!(ask_number_from(&mut Cursor::new("abc\nxyz"), "Target pH", None), None);
    }

    #[test]
    fn retries_until_a_number() {
        let mut input = Cursor::new("abc\n7\n");
        assert_eq!(ask_number_from(&mut input, "Target pH", None), Some(7.0));
        assert_eq!(read_input_line(&mut input), None);
        assert_eq!(ask_number_from(&mut Cursor::new("\n"), "Volume", Some(250.0)), Some(250.0));
        assert_eq!(read_input_line(&mut Cursor::new("7.4")), Some("7.4".to_string()));
    }
}
