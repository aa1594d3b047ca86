/// Module to calculate the atomic composition and molar mass of a chemical formula
///
/// Formulas may contain nested brackets and hydrate water, e.g. `Ca(NO3)2`,
/// `Na2B4O7·10H2O` or `C6H5Na3O7*2H2O`.
use crate::error::{AcidBaseError, Result};
use std::collections::BTreeMap;

// Define a struct to hold element data
pub struct Element {
    name: &'static str,
    atomic_mass: f64,
}

const fn el(name: &'static str, atomic_mass: f64) -> Element {
    Element { name, atomic_mass }
}

// elements met in buffer salts, titrants and additives
const ELEMENTS: &[Element] = &[
    el("H", 1.008),
    el("He", 4.0026),
    el("Li", 6.94),
    el("B", 10.81),
    el("C", 12.011),
    el("N", 14.007),
    el("O", 15.999),
    el("F", 18.998),
    el("Na", 22.99),
    el("Mg", 24.305),
    el("Al", 26.982),
    el("Si", 28.085),
    el("P", 30.974),
    el("S", 32.06),
    el("Cl", 35.45),
    el("K", 39.098),
    el("Ca", 40.078),
    el("Mn", 54.938),
    el("Fe", 55.845),
    el("Co", 58.933),
    el("Ni", 58.693),
    el("Cu", 63.546),
    el("Zn", 65.38),
    el("Br", 79.904),
    el("Rb", 85.468),
    el("Sr", 87.62),
    el("I", 126.904),
    el("Cs", 132.905),
    el("Ba", 137.327),
];

pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|e| e.name == symbol)
        .map(|e| e.atomic_mass)
}

struct FormulaParser<'a> {
    formula: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(formula: &'a str) -> Self {
        Self {
            formula,
            chars: formula.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> AcidBaseError {
        AcidBaseError::FormulaParse {
            formula: self.formula.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            None
        } else {
            self.chars[start..self.pos].iter().collect::<String>().parse().ok()
        }
    }

    /// whole formula: parts separated by hydrate dots, each with an optional multiplier
    fn parse(mut self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        loop {
            let multiplier = self.number().unwrap_or(1);
            let part = self.group(0)?;
            for (element, n) in part {
                *counts.entry(element).or_insert(0) += n * multiplier;
            }
            match self.peek() {
                None => break,
                Some('·') | Some('*') | Some('.') => self.pos += 1,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            }
        }
        if counts.is_empty() {
            return Err(self.error("no elements found"));
        }
        Ok(counts)
    }

    fn group(&mut self, depth: usize) -> Result<BTreeMap<String, usize>> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        while let Some(c) = self.peek() {
            match c {
                '(' | '[' => {
                    self.pos += 1;
                    let inner = self.group(depth + 1)?;
                    match self.peek() {
                        Some(')') | Some(']') => self.pos += 1,
                        _ => return Err(self.error("unbalanced bracket")),
                    }
                    let n = self.number().unwrap_or(1);
                    for (element, k) in inner {
                        *counts.entry(element).or_insert(0) += k * n;
                    }
                }
                ')' | ']' => {
                    if depth == 0 {
                        return Err(self.error("unbalanced bracket"));
                    }
                    return Ok(counts);
                }
                c if c.is_ascii_uppercase() => {
                    self.pos += 1;
                    let mut symbol = c.to_string();
                    if let Some(l) = self.peek().filter(|l| l.is_ascii_lowercase()) {
                        symbol.push(l);
                        self.pos += 1;
                    }
                    if atomic_mass(&symbol).is_none() {
                        return Err(self.error(format!("unknown element '{}'", symbol)));
                    }
                    let n = self.number().unwrap_or(1);
                    *counts.entry(symbol).or_insert(0) += n;
                }
                _ => return Ok(counts),
            }
        }
        if depth > 0 {
            return Err(self.error("unbalanced bracket"));
        }
        Ok(counts)
    }
}

/// Element counts of a formula.
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, usize>> {
    FormulaParser::new(formula).parse()
}

/// Molar mass (g/mol) of a formula.
pub fn calculate_molar_mass(formula: &str) -> Result<f64> {
    let counts = parse_formula(formula)?;
    let mut molar_mass = 0.0;
    for (element, count) in counts {
        // parser only admits known elements
        molar_mass += atomic_mass(&element).unwrap_or(0.0) * count as f64;
    }
    Ok(molar_mass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formula() {
        let expected = BTreeMap::from([
            ("C".to_string(), 6),
            ("H".to_string(), 8),
            ("O".to_string(), 7),
        ]);
        assert_eq!(parse_formula("C6H8O7").unwrap(), expected);

        let expected = BTreeMap::from([
            ("Ca".to_string(), 1),
            ("N".to_string(), 2),
            ("O".to_string(), 6),
        ]);
        assert_eq!(parse_formula("Ca(NO3)2").unwrap(), expected);

        let expected = BTreeMap::from([
            ("B".to_string(), 4),
            ("H".to_string(), 20),
            ("Na".to_string(), 2),
            ("O".to_string(), 17),
        ]);
        assert_eq!(parse_formula("Na2B4O7·10H2O").unwrap(), expected);
    }

    #[test]
    fn test_calculate_molar_mass() {
        let cases = [
            ("H2O", 18.015),
            ("NaCl", 58.44),
            ("NaH2PO4", 119.98),
            ("Na2HPO4", 141.96),
            ("C4H11NO3", 121.14),
            ("(HOCH2)3CNH2", 121.14),
            ("C6H5Na3O7*2H2O", 294.10),
        ];
        for (formula, expected) in cases {
            let m = calculate_molar_mass(formula).unwrap();
            assert!((m - expected).abs() < 0.05, "{}: {} vs {}", formula, m, expected);
        }
    }

    #[test]
    fn test_bad_formulas() {
        assert!(parse_formula("Xx2").is_err());
        assert!(parse_formula("Ca(NO3").is_err());
        assert!(parse_formula("NO3)2").is_err());
        assert!(parse_formula("").is_err());
        assert!(parse_formula("H2O-").is_err());
    }
}
