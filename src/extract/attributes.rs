//! Size, quantity and brand extraction from free product text.
//!
//! All functions are pure and deterministic. Sizes are returned exactly as
//! printed (no unit conversion).

use std::sync::OnceLock;

use regex::Regex;

/// Brand candidates must be shorter than this many characters
const MAX_BRAND_CHARS: usize = 30;

/// Unit patterns in scan order: volume, weight, count
const SIZE_PATTERNS: &[&str] = &[
    r"fl\.? ?oz|fluid ounces?|ounces?|oz",
    r"ml|milliliters?",
    r"liters?|litres?|l",
    r"gal|gallons?",
    r"pt|pints?",
    r"qt|quarts?",
    r"lbs?|pounds?",
    r"kg|kilograms?",
    r"g|grams?",
    r"mg|milligrams?",
    r"ct|count|pack|pk",
];

/// Quantity phrases in scan order; group 1 captures the number
const QUANTITY_PATTERNS: &[&str] = &[
    r"(\d+)\s*(?:packs?|pk)\b",
    r"\bpack\s*of\s*(\d+)",
    r"(\d+)\s*(?:count|ct|pieces?)\b",
    r"(\d+)\s*items?\b",
    r"\bcase\s*of\s*(\d+)",
    r"(\d+)\s*cases?\b",
    r"\bbox\s*of\s*(\d+)",
    r"(\d+)\s*box(?:es)?\b",
    r"(\d+)\s*(?:×|x\b|/|per\b)",
];

fn size_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SIZE_PATTERNS
            .iter()
            .map(|units| {
                Regex::new(&format!(r"(?i)\d+(?:\.\d+)?\s*(?:{})\b", units))
                    .expect("valid size regex")
            })
            .collect()
    })
}

fn quantity_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        QUANTITY_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid quantity regex"))
            .collect()
    })
}

/// First size expression (numeral + unit) found in the text, verbatim
///
/// Unit groups are scanned in order, so a volume anywhere in the text wins
/// over a weight that appears earlier.
pub fn extract_size(text: &str) -> Option<String> {
    size_patterns()
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// Pack count from the first quantity phrase that matches
///
/// Scanning stops at the first matching phrase; a zero or unparseable
/// count there yields `None`.
pub fn extract_quantity(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }

    quantity_patterns()
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&n| n > 0)
}

/// Brand from a detected logo, else the first short non-empty line of text
pub fn extract_brand(text: &str, detected_logo: Option<&str>) -> Option<String> {
    if let Some(logo) = detected_logo.map(str::trim).filter(|l| !l.is_empty()) {
        return Some(logo.to_string());
    }

    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| line.chars().count() < MAX_BRAND_CHARS)
        .map(str::to_string)
}
