//! Ratio notation parsing
//!
//! Market text comes out of an OCR / vision extraction step, so ratios look
//! like `"274:1"`, `">274:1"`, `"1:3"`, `"3.5"` or `"1,200:1"`. Everything that
//! cannot be read degrades to `0.0`, which callers treat as "unusable".

/// Parse a ratio notation into a rate. Total: never panics, always returns a
/// finite value `>= 0.0`.
pub fn parse_ratio(text: &str) -> f64 {
    let text = text.trim();

    // "at least" / "at most" collapse to a point estimate
    if let Some(rest) = text.strip_prefix('<').or_else(|| text.strip_prefix('>')) {
        return parse_ratio(rest);
    }

    let rate = match text.split_once(':') {
        Some((numerator, denominator)) => {
            let numerator = numeric_part(numerator);
            let denominator = numeric_part(denominator);
            if numerator.is_empty() || denominator.is_empty() {
                return 0.0;
            }
            match (numerator.parse::<f64>(), denominator.parse::<f64>()) {
                (Ok(_), Ok(d)) if d == 0.0 => 0.0,
                (Ok(n), Ok(d)) => n / d,
                _ => 0.0,
            }
        }
        None => text.parse::<f64>().unwrap_or(0.0),
    };

    if rate.is_finite() && rate >= 0.0 {
        rate
    } else {
        0.0
    }
}

/// Render a rate in the `"<rate>:1"` notation used for derived quotes
pub fn format_ratio(rate: f64) -> String {
    format!("{rate}:1")
}

fn numeric_part(side: &str) -> String {
    side.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}
