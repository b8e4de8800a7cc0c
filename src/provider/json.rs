//! JSON decoding for provider responses with readable failure messages.

use anyhow::Result;

/// Deserialize `body`, reporting the JSON path and a snippet around the
/// failure point when it does not match `T`.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());
        let message = inner.to_string();
        let message = message
            .strip_suffix(&format!(" at line {line} column {column}"))
            .unwrap_or(&message);

        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("at path '{path}': ")
        };

        anyhow::anyhow!(
            "{location}{message} (line {line} col {column}): {}",
            snippet(body, line, column, 24)
        )
    })
}

/// Up to `radius` characters either side of the error position on its line.
fn snippet(body: &str, line: usize, column: usize, radius: usize) -> String {
    let Some(text) = body.lines().nth(line.saturating_sub(1)) else {
        return "(empty body)".to_string();
    };
    if text.is_empty() {
        return "(empty line)".to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let at = column.saturating_sub(1).min(chars.len());
    let start = at.saturating_sub(radius);
    let end = (at + radius).min(chars.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}
