use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a JSON or YAML document and deserialise it into a typed struct.
///
/// The format is chosen by extension; anything that is not `.yaml`/`.yml`
/// is treated as JSON.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let contents = read_contents(path)?;
    let value: T = if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse '{path}': {e}"))?
    } else {
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse '{path}': {e}"))?
    };
    Ok(value)
}

fn is_yaml(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn read_contents(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.is_file() {
        return Err(format!("Not a readable file: {path}").into());
    }
    let contents = fs::read_to_string(p).map_err(|e| format!("Failed to read '{path}': {e}"))?;
    Ok(contents)
}
