//! Decoding for the leaf expression kinds: quoted literals, character
//! classes, and extension payloads.

use ppeg_core::instr::CharRange;
use ppeg_core::{decode_escapes, GrammarError};

/// Split a captured `sq`/`dq` leaf's raw text (including delimiters and an
/// optional trailing `i`) into `(icase, inner)`.
fn split_quoted(text: &str, delim: char) -> (bool, &str) {
    debug_assert!(text.starts_with(delim));
    if text.ends_with('i') && text.len() >= 2 && text[..text.len() - 1].ends_with(delim) {
        (true, &text[1..text.len() - 2])
    } else {
        (false, &text[1..text.len() - 1])
    }
}

/// Decode a `sq` leaf's text into `(icase, literal)`, escapes resolved and
/// upper-cased when case-insensitive.
pub fn decode_literal(text: &str, delim: char) -> (bool, String) {
    let (icase, inner) = split_quoted(text, delim);
    let decoded = decode_escapes(inner);
    if icase {
        (true, decoded.to_uppercase())
    } else {
        (false, decoded)
    }
}

/// Unescape a char-class body. The bootstrap grammar's own `chs` rule
/// captures a `\]` pair verbatim as two raw characters (that's how a
/// literal `]` is written inside a class without terminating it, see
/// `bootstrap::quoted_body`), so every backslash pair collapses to its
/// escaped character here — `\t`/`\n`/`\r`/`\uHHHH` per the literal escape table, and
/// any other escaped character (notably `\]` and `\\`) literally.
fn unescape_class_body(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            't' => {
                out.push('\t');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            'u' => {
                if let Some(cp) = chars
                    .get(i + 2..i + 6)
                    .and_then(|hex| u32::from_str_radix(&hex.iter().collect::<String>(), 16).ok())
                    .and_then(char::from_u32)
                {
                    out.push(cp);
                    i += 6;
                } else {
                    out.push(chars[i + 1]);
                    i += 2;
                }
            }
            other => {
                out.push(other);
                i += 2;
            }
        }
    }
    out
}

/// Decode a `chs` leaf's text (`[...]`, brackets included) into its ranges.
pub fn decode_char_class(text: &str) -> Result<Vec<CharRange>, GrammarError> {
    if !text.starts_with('[') || !text.ends_with(']') {
        return Err(GrammarError::MalformedPtree(format!(
            "char class missing brackets: {text}"
        )));
    }
    let body: Vec<char> = unescape_class_body(&text[1..text.len() - 1]).chars().collect();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let lo = body[i];
        i += 1;
        if i + 1 < body.len() && body[i] == '-' {
            let hi = body[i + 1];
            i += 2;
            ranges.push(CharRange::Range(lo, hi));
        } else {
            ranges.push(CharRange::Single(lo));
        }
    }
    Ok(ranges)
}

/// Decode an `extn` leaf's text (`<...>`, brackets included) into its payload.
pub fn decode_extension(text: &str) -> String {
    text.trim_start_matches('<').trim_end_matches('>').trim().to_string()
}
