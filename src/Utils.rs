/// JSON files with located parse errors
pub mod load_from_file;
