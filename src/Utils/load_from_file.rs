use crate::error::{AcidBaseError, Result};
use log::{error, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Reads the whole file into a string.
pub fn read_file(file_name: &str) -> Result<String> {
    fs::read_to_string(Path::new(file_name)).map_err(|source| AcidBaseError::FileRead {
        path: file_name.to_string(),
        source,
    })
}

/// Parses JSON text; on failure logs the offending line with a pointer under the column.
pub fn parse_json_str<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T> {
    match serde_json::from_str::<T>(content) {
        Ok(data) => Ok(data),
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();
            error!(
                "Error parsing '{}' at line {}, column {}: {}",
                origin, error_line, error_column, e
            );
            // serde_json lines are 1-based, 0 when the position is unknown
            if let Some(problem_line) = error_line
                .checked_sub(1)
                .and_then(|i| content.lines().nth(i))
            {
                error!("Problematic line: {}", problem_line);
                if error_column >= 1 && error_column <= problem_line.len() + 1 {
                    let pointer = " ".repeat(error_column - 1) + "^";
                    error!("                   {}", pointer);
                }
            }
            Err(AcidBaseError::Json(e))
        }
    }
}

/// Loads and deserializes a JSON file.
pub fn load_json_from_file<T: DeserializeOwned>(file_name: &str) -> Result<T> {
    let content = read_file(file_name)?;
    let data = parse_json_str(&content, file_name)?;
    info!("Successfully parsed data from file '{}'", file_name);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_json_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"tris": 8.06, "hepes": 7.48}}"#).unwrap();

        let data: HashMap<String, f64> =
            load_json_from_file(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["tris"], 8.06);
    }

    #[test]
    fn test_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{{\n  \"tris\": 8.06,\n  \"hepes\" 7.48\n}}").unwrap();

        let result: Result<HashMap<String, f64>> =
            load_json_from_file(temp_file.path().to_str().unwrap());
        match result {
            Err(AcidBaseError::Json(e)) => assert_eq!(e.line(), 3),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result: Result<HashMap<String, f64>> = load_json_from_file("no_such_catalog.json");
        assert!(matches!(result, Err(AcidBaseError::FileRead { .. })));
    }
}
