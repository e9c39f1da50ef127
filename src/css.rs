/// Formats a CSS length or percentage with at most `places` decimals and no
/// trailing zeros, e.g. `42.5` rather than `42.50`.
pub(crate) fn number(value: f64, places: usize) -> String {
    let formatted = format!("{value:.places$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
