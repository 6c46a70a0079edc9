use serde_json::Value;
use std::io::{self, Read};

/// Read JSON from stdin when data is being piped in.
///
/// Returns `None` when stdin is an interactive terminal or the pipe is
/// empty, so flag-based invocation still works.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(trimmed)?))
}
