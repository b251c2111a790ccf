//! Program image loading: one hexadecimal word per line, `#` comments,
//! blank lines ignored

use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::error::SimulatorResult;

/// Parses a textual program image into machine words
pub fn parse_image(text: &str) -> Result<Vec<u32>, LoadError> {
    let mut words = Vec::new();

    for (number, line) in text.lines().enumerate() {
        // Strip a trailing comment, then surrounding whitespace
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let token = line.strip_prefix("0x").or_else(|| line.strip_prefix("0X")).unwrap_or(line);
        let word = (token.len() <= 8)
            .then_some(token)
            .and_then(|t| u32::from_str_radix(t, 16).ok())
            .ok_or_else(|| LoadError::MalformedWord {
                line: number + 1,
                token: line.to_string(),
            })?;
        words.push(word);
    }

    Ok(words)
}

/// Reads and parses a program image file
pub fn read_image_file(path: &Path) -> SimulatorResult<Vec<u32>> {
    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::FileReadError(path.to_path_buf(), e))?;
    Ok(parse_image(&text)?)
}
