use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Load a request document from `--input` if given, otherwise from piped
/// stdin. `None` means the caller should fall back to flags.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let (source, contents) = match path {
        Some(path) => (path.to_string(), read_file(Path::new(path))?),
        None => match read_stdin()? {
            Some(contents) => ("stdin".to_string(), contents),
            None => return Ok(None),
        },
    };

    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{source}': {e}"))?;
    Ok(Some(value))
}

fn read_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into())
}

/// Piped stdin, or `None` when stdin is a terminal or blank.
fn read_stdin() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(buffer))
}
