//! Feed line-ending normalization.
//!
//! Feeds arrive with `\r\n`, `\n`, or a mix of both, and sometimes without a
//! final line terminator. The calendar parser wants plain `\n` lines, so every
//! fetched feed passes through [`normalize_feed`] before parsing.

/// Rewrites every line terminator as `\n` and guarantees a trailing `\n`.
///
/// Trailing carriage returns are stripped from each line. Empty input stays
/// empty.
pub fn normalize_line_endings(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + 1);
    for line in input.lines() {
        output.push_str(line.trim_end_matches('\r'));
        output.push('\n');
    }
    output
}

/// Decodes raw feed bytes (lossily, as UTF-8) and normalizes line endings.
pub fn normalize_feed(raw: &[u8]) -> String {
    normalize_line_endings(&String::from_utf8_lossy(raw))
}
