//! Human-facing color naming (§6, "Color naming").
//!
//! Internally the engine only ever sees a `u16` color id, identical to a
//! row index. This module is the one place that translates a declared,
//! possibly multi-word color name into a normalized, abbreviated display
//! form — mirroring the teacher's `PIECES_ORDER`-style const lookup table
//! kept separate from the hot-path search types.

/// A small table of common multi-word color names to their documented
/// three-letter abbreviation, matched case-insensitively. Anything not in
/// the table falls back to its first three letters.
const KNOWN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("LIGHT BLUE", "LBL"),
    ("DARK BLUE", "DBL"),
    ("LIGHT GREEN", "LGR"),
    ("DARK GREEN", "DGR"),
    ("BURNT ORANGE", "BOR"),
];

/// Normalizes a declared color name to uppercase and collapses internal
/// whitespace, as required for comparison/lookup (§6).
#[must_use]
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Produces the documented abbreviation for a (already normalized) color
/// name, used only for compact human-facing rendering (progress lines,
/// solution files).
#[must_use]
pub fn abbreviate(normalized_name: &str) -> String {
    for (name, abbrev) in KNOWN_ABBREVIATIONS {
        if *name == normalized_name {
            return (*abbrev).to_string();
        }
    }
    let letters: String = normalized_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect();
    if letters.is_empty() {
        normalized_name.to_string()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_upcases_and_collapses_whitespace() {
        assert_eq!(normalize("  light   blue "), "LIGHT BLUE");
    }

    #[test]
    fn abbreviate_prefers_documented_table() {
        assert_eq!(abbreviate("LIGHT BLUE"), "LBL");
    }

    #[test]
    fn abbreviate_falls_back_to_first_three_letters() {
        assert_eq!(abbreviate("RED"), "RED");
        assert_eq!(abbreviate("MAGENTA"), "MAG");
    }
}
