use super::cli_main::{CliSession, ask_number, ask_text, get_user_input, parse_number, parse_number_list, prompt};
use crate::AcidBase::buffer_preparation::{BufferRequest, calculate_buffer_preparation_with_settings};
use crate::AcidBase::calculation_result::CalculationResult;
use crate::AcidBase::ph_adjustment::{PhAdjustmentRequest, calculate_acid_needed_for_pH_adjustment_with_settings};
use crate::AcidBase::species_distribution::{calculate_labeled_species_distribution, species_labels};
use crate::AcidBase::strong_acid_base::{calculate_strong_acid_pH, calculate_strong_base_pH, calculate_strong_reagent_pH};
use crate::AcidBase::temperature::{REFERENCE_TEMPERATURE, corrected_pKa_values};
use crate::Catalog::buffer_system::BufferSystem;
use crate::Catalog::strong_acid_base::AcidBaseKind;
use std::fs;

fn ask_buffer<'a>(session: &'a CliSession) -> Option<&'a BufferSystem> {
    let name = ask_text("Buffer (id or name, e.g. HEPES)")?;
    match session.catalog.find(&name) {
        Ok(buffer) => Some(buffer),
        Err(e) => {
            println!("\x1b[31m{}\x1b[0m", e);
            let ids: Vec<&str> = session.catalog.iter().map(|b| b.id.as_str()).collect();
            println!("Known buffers: {}", ids.join(", "));
            None
        }
    }
}

fn show_and_offer_save(result: &CalculationResult) {
    result.pretty_print();
    if !result.success {
        return;
    }
    prompt("Save result as JSON (file name, empty to skip): ");
    let Some(file_name) = get_user_input() else {
        return;
    };
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return;
    }
    match result.to_json() {
        Ok(json) => match fs::write(file_name, json) {
            Ok(()) => println!("Saved to {}", file_name),
            Err(e) => println!("\x1b[31mCannot write {}: {}\x1b[0m", file_name, e),
        },
        Err(e) => println!("\x1b[31m{}\x1b[0m", e),
    }
}

#[allow(non_snake_case)]
pub fn buffer_preparation_dialog(session: &CliSession) {
    println!("\n=== Buffer preparation ===");
    let Some(buffer) = ask_buffer(session) else {
        return;
    };
    let Some(target_pH) = ask_number("Target pH", None) else {
        return;
    };
    let Some(concentration) = ask_number("Total buffer concentration, M", Some(0.05)) else {
        return;
    };
    let Some(volume) = ask_number("Final volume, mL", Some(1000.0)) else {
        return;
    };
    let Some(T) = ask_number("Temperature, °C", Some(REFERENCE_TEMPERATURE)) else {
        return;
    };
    prompt("Ionic strength, M (empty: no correction): ");
    let Some(line) = get_user_input() else {
        return;
    };
    let ionic_strength = parse_number(&line, None);

    let request = BufferRequest::new(buffer, target_pH, concentration, volume, T, ionic_strength);
    let result = calculate_buffer_preparation_with_settings(&request, session.manager.settings(), &session.catalog);
    show_and_offer_save(&result);
}

#[allow(non_snake_case)]
pub fn strong_acid_base_dialog(session: &CliSession) {
    println!("\n=== Strong acid / base pH ===");
    let Some(reagent) = ask_text("Reagent (HCl, H2SO4, NaOH, ...; empty for a generic acid/base)") else {
        return;
    };
    let Some(concentration) = ask_number("Concentration, M", None) else {
        return;
    };
    let Some(T) = ask_number("Temperature, °C", Some(REFERENCE_TEMPERATURE)) else {
        return;
    };
    let result = if reagent.is_empty() {
        let Some(kind) = ask_text("acid or base") else {
            return;
        };
        match kind.to_lowercase().as_str() {
            "base" | "b" => calculate_strong_base_pH(concentration, T),
            _ => calculate_strong_acid_pH(concentration, T),
        }
    } else {
        match session.catalog.reagent(&reagent) {
            Ok(reagent) => calculate_strong_reagent_pH(reagent, concentration, T),
            Err(e) => CalculationResult::failure(e.to_string()),
        }
    };
    show_and_offer_save(&result);
}

#[allow(non_snake_case)]
pub fn ph_adjustment_dialog(session: &CliSession) {
    println!("\n=== pH adjustment ===");
    let Some(current_pH) = ask_number("Current pH", None) else {
        return;
    };
    let Some(target_pH) = ask_number("Target pH", None) else {
        return;
    };
    let Some(T) = ask_number("Temperature, °C", Some(REFERENCE_TEMPERATURE)) else {
        return;
    };
    let Some(buffer_name) = ask_text("Buffer (id or name; empty to type the pKa)") else {
        return;
    };
    let buffer_pKa = if buffer_name.is_empty() {
        let Some(pKa) = ask_number("Buffer pKa at the working temperature", None) else {
            return;
        };
        pKa
    } else {
        match session.catalog.find(&buffer_name) {
            Ok(buffer) => {
                let nearest = corrected_pKa_values(buffer, T)
                    .into_iter()
                    .min_by(|a, b| (a - target_pH).abs().total_cmp(&(b - target_pH).abs()));
                match nearest {
                    Some(pKa) => {
                        println!("Using pKa {:.3} of {} at {:.1} °C", pKa, buffer.name, T);
                        pKa
                    }
                    None => return,
                }
            }
            Err(e) => {
                println!("\x1b[31m{}\x1b[0m", e);
                return;
            }
        }
    };
    let Some(buffer_concentration) = ask_number("Buffer concentration, M", Some(0.05)) else {
        return;
    };
    let Some(volume) = ask_number("Solution volume, mL", Some(1000.0)) else {
        return;
    };
    let Some(reagent_name) = ask_text("Reagent (HCl, NaOH, ...)") else {
        return;
    };
    let (kind, stock) = match session.catalog.reagent(&reagent_name) {
        Ok(reagent) => (reagent.kind, reagent.stock_concentration),
        Err(_) => match reagent_name.to_lowercase().as_str() {
            "base" | "b" => (AcidBaseKind::Base, None),
            _ => (AcidBaseKind::Acid, None),
        },
    };
    let Some(reagent_concentration) = ask_number("Reagent concentration, M", Some(stock.unwrap_or(1.0))) else {
        return;
    };

    let request = PhAdjustmentRequest {
        current_pH,
        target_pH,
        buffer_concentration_molar: buffer_concentration,
        buffer_pKa,
        volume_mL: volume,
        adjusting_with: kind,
        adjusting_concentration_molar: reagent_concentration,
    };
    let result = calculate_acid_needed_for_pH_adjustment_with_settings(&request, T, session.manager.settings());
    show_and_offer_save(&result);
}

#[allow(non_snake_case)]
pub fn species_distribution_dialog(session: &CliSession) {
    println!("\n=== Species distribution ===");
    let Some(buffer_name) = ask_text("Buffer (id or name; empty to type pKa values)") else {
        return;
    };
    let Some(T) = ask_number("Temperature, °C", Some(REFERENCE_TEMPERATURE)) else {
        return;
    };
    let (pKa, labels) = if buffer_name.is_empty() {
        prompt("pKa values (e.g. 3.13, 4.76, 6.40): ");
        let Some(line) = get_user_input() else {
            return;
        };
        match parse_number_list(&line) {
            Some(pKa) => {
                let labels = species_labels(pKa.len(), 0);
                (pKa, labels)
            }
            None => {
                println!("\x1b[31mNot a list of numbers\x1b[0m");
                return;
            }
        }
    } else {
        match session.catalog.find(&buffer_name) {
            Ok(buffer) => {
                let pKa = corrected_pKa_values(buffer, T);
                let labels = buffer
                    .species
                    .clone()
                    .unwrap_or_else(|| species_labels(pKa.len(), buffer.acid_charge));
                (pKa, labels)
            }
            Err(e) => {
                println!("\x1b[31m{}\x1b[0m", e);
                return;
            }
        }
    };
    let Some(pH) = ask_number("pH", None) else {
        return;
    };
    prompt("Total concentration, M (empty: fractions only): ");
    let Some(line) = get_user_input() else {
        return;
    };
    let total = parse_number(&line, None);

    let result = match calculate_labeled_species_distribution(&pKa, pH, total, Some(&labels)) {
        Ok(species) => {
            let mut result = CalculationResult::new();
            result.pH = Some(pH);
            result.species_distribution = Some(species);
            result
        }
        Err(e) => CalculationResult::failure(e.to_string()),
    };
    show_and_offer_save(&result);
}
