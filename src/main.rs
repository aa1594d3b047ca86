use BufferLab::cli::cli_main::run_interactive_menu;
use BufferLab::settings::SettingsManager;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

pub fn main() {
    let manager = SettingsManager::new();
    let level = manager.settings().log_level_filter();
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("logger not initialised: {}", e);
    }
    run_interactive_menu(manager);
}
