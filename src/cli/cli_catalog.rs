use super::cli_main::{CliSession, ask_number, ask_text, get_user_input, parse_name_list, prompt};
use crate::AcidBase::advisory::{
    check_buffer_additives, check_incompatibilities, get_suggested_buffers, get_temperature_sensitivity,
};
use crate::AcidBase::calculation_result::CRITICAL_PREFIX;
use crate::Catalog::molmass::{calculate_molar_mass, parse_formula};
use crate::settings::CalcSettings;
use prettytable::{Table, row};

pub fn catalog_menu(session: &CliSession) {
    loop {
        println!("\n=== Buffer catalog ===");
        println!("\x1b[33m1. List buffer systems\x1b[0m");
        println!("\x1b[33m2. Suggest buffers for a pH\x1b[0m");
        println!("\x1b[33m3. Buffer details\x1b[0m");
        println!("\x1b[33m4. Check chemical incompatibilities\x1b[0m");
        println!("\x1b[33m5. Molar mass of a formula\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        prompt("Enter your choice: ");

        let Some(choice) = get_user_input() else {
            break;
        };
        match choice.trim() {
            "1" => session.catalog.pretty_print(),
            "2" => suggest_dialog(session),
            "3" => details_dialog(session),
            "4" => incompatibility_dialog(session),
            "5" => molar_mass_dialog(),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

#[allow(non_snake_case)]
fn suggest_dialog(session: &CliSession) {
    let Some(pH) = ask_number("Target pH", None) else {
        return;
    };
    let suggestions = get_suggested_buffers(pH, &session.catalog);
    if suggestions.is_empty() {
        println!("No catalog buffer covers pH {:.2}", pH);
        return;
    }
    let mut table = Table::new();
    table.add_row(row!["Buffer", "pKa", "Range", "dpKa/dT"]);
    for b in suggestions {
        let pKa: Vec<String> = b.pKa.iter().map(|p| format!("{:.2}", p)).collect();
        table.add_row(row![
            b.name,
            pKa.join(", "),
            format!("{:.1}-{:.1}", b.effective_range.low, b.effective_range.high),
            b.dpKadT
        ]);
    }
    table.printstd();
}

fn details_dialog(session: &CliSession) {
    let Some(name) = ask_text("Buffer (id or name)") else {
        return;
    };
    let buffer = match session.catalog.find(&name) {
        Ok(buffer) => buffer,
        Err(e) => {
            println!("\x1b[31m{}\x1b[0m", e);
            return;
        }
    };
    let mut table = Table::new();
    table.add_row(row!["Field", "Value"]);
    table.add_row(row!["id", buffer.id]);
    table.add_row(row!["name", buffer.name]);
    table.add_row(row!["pKa (25 °C)", format!("{:?}", buffer.pKa)]);
    table.add_row(row!["dpKa/dT", buffer.dpKadT]);
    table.add_row(row![
        "temperature sensitivity",
        get_temperature_sensitivity(buffer).to_string()
    ]);
    table.add_row(row![
        "effective range",
        format!("{:.1}-{:.1}", buffer.effective_range.low, buffer.effective_range.high)
    ]);
    for (form, mass) in &buffer.molar_mass {
        table.add_row(row![format!("{} form", form), format!("{} ({} g/mol)", buffer.form_name(form), mass)]);
    }
    table.add_row(row!["category", buffer.category]);
    table.add_row(row!["suitability", buffer.suitability]);
    table.printstd();
    for w in &buffer.warnings {
        println!("\x1b[33mWarning: {}\x1b[0m", w);
    }
}

fn print_hazards(hazards: &[String]) {
    if hazards.is_empty() {
        println!("No known incompatibilities");
    }
    for h in hazards {
        if h.starts_with(CRITICAL_PREFIX) {
            println!("\x1b[31m{}\x1b[0m", h);
        } else {
            println!("\x1b[33m{}\x1b[0m", h);
        }
    }
}

fn incompatibility_dialog(session: &CliSession) {
    let Some(buffer_name) = ask_text("Buffer (id or name; empty to check a list of chemicals only)") else {
        return;
    };
    prompt("Chemicals, comma separated: ");
    let Some(line) = get_user_input() else {
        return;
    };
    let chemicals = parse_name_list(&line);
    if buffer_name.is_empty() {
        print_hazards(&check_incompatibilities(&chemicals, &session.catalog));
        return;
    }
    match session.catalog.find(&buffer_name) {
        Ok(buffer) => print_hazards(&check_buffer_additives(buffer, &chemicals, &session.catalog)),
        Err(e) => println!("\x1b[31m{}\x1b[0m", e),
    }
}

fn molar_mass_dialog() {
    let Some(formula) = ask_text("Formula (e.g. Na2HPO4*7H2O)") else {
        return;
    };
    match (calculate_molar_mass(&formula), parse_formula(&formula)) {
        (Ok(mass), Ok(composition)) => {
            let mut table = Table::new();
            table.add_row(row!["Element", "Count"]);
            for (element, count) in composition {
                table.add_row(row![element, count]);
            }
            table.printstd();
            println!("M({}) = {:.3} g/mol", formula, mass);
        }
        (Err(e), _) | (_, Err(e)) => println!("\x1b[31m{}\x1b[0m", e),
    }
}

pub fn settings_menu(session: &mut CliSession) {
    loop {
        println!("\n=== Settings ({}) ===", session.manager.config_file());
        println!("\x1b[33m1. Show settings\x1b[0m");
        println!("\x1b[33m2. Use a catalog file\x1b[0m");
        println!("\x1b[33m3. Toggle dilution correction\x1b[0m");
        println!("\x1b[33m4. Set polyprotic pKa gap\x1b[0m");
        println!("\x1b[33m5. Reset to defaults\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        prompt("Enter your choice: ");

        let Some(choice) = get_user_input() else {
            break;
        };
        let outcome = match choice.trim() {
            "1" => {
                match serde_json::to_string_pretty(session.manager.settings()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("\x1b[31m{}\x1b[0m", e),
                }
                Ok(())
            }
            "2" => {
                let Some(path) = ask_text("Catalog file") else {
                    break;
                };
                session.manager.set_catalog_file(&path)
            }
            "3" => {
                let settings = CalcSettings {
                    dilution_correction: !session.manager.settings().dilution_correction,
                    ..session.manager.settings().clone()
                };
                session.manager.update(settings)
            }
            "4" => {
                let current = session.manager.settings().polyprotic_gap;
                let Some(polyprotic_gap) = ask_number("Polyprotic gap, pH units", Some(current)) else {
                    break;
                };
                let settings = CalcSettings {
                    polyprotic_gap,
                    ..session.manager.settings().clone()
                };
                session.manager.update(settings)
            }
            "5" => session.manager.reset_to_defaults(),
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        match outcome {
            Ok(()) => session.reload_catalog(),
            Err(e) => println!("\x1b[31m{}\x1b[0m", e),
        }
    }
}
