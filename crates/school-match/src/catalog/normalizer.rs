/// Lookup key for institution names and search queries.
pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_lowercase()
}

/// Header cells are matched the same way names are.
pub(crate) fn normalize_header(value: &str) -> String {
    normalize_name(value)
}

/// Lenient numeric cell parsing: percent signs and thousands separators are ignored,
/// anything else unparsable or non-finite becomes `None`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '%' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
