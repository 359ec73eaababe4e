//! Parser for serialized symptom lists.
//!
//! Source data stores lists either as JSON (`["fever", "cough"]`) or as
//! Python-style literals (`['fever', 'cough']`). The scanner rewrites the
//! literal into JSON, respecting quotes, then `serde_json` does the
//! structural parse.

use thiserror::Error;

/// Symptom list parse errors.
#[derive(Error, Debug)]
pub enum ListParseError {
    #[error("field is empty")]
    Empty,

    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    #[error("not a list of strings: {0}")]
    Structure(#[from] serde_json::Error),
}

/// Parse a serialized list of symptom strings.
pub fn parse_symptom_list(raw: &str) -> Result<Vec<String>, ListParseError> {
    if raw.trim().is_empty() {
        return Err(ListParseError::Empty);
    }
    let json = rewrite_as_json(raw)?;
    Ok(serde_json::from_str(&json)?)
}

/// Convert single-quoted strings to double-quoted ones and drop trailing
/// commas before `]`. Everything outside strings is copied verbatim.
fn rewrite_as_json(raw: &str) -> Result<String, ListParseError> {
    let mut out = String::with_capacity(raw.len() + 2);
    let mut chars = raw.char_indices();

    while let Some((start, c)) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                let mut closed = false;
                out.push('"');
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, '\'')) => out.push('\''),
                            Some((_, escaped)) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => break,
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        '"' => out.push_str("\\\""),
                        c => out.push(c),
                    }
                }
                if !closed {
                    return Err(ListParseError::UnterminatedString(start));
                }
                out.push('"');
            }
            ']' => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    out.truncate(kept - 1);
                }
                out.push(']');
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
