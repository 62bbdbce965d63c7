//! Month field normalization.

/// Accepted month spellings and the integer each maps to
static MONTHS: [(&str, &str); 24] = [
    ("january", "1"),
    ("february", "2"),
    ("march", "3"),
    ("april", "4"),
    ("may", "5"),
    ("june", "6"),
    ("july", "7"),
    ("august", "8"),
    ("september", "9"),
    ("october", "10"),
    ("november", "11"),
    ("december", "12"),
    ("1", "1"),
    ("2", "2"),
    ("3", "3"),
    ("4", "4"),
    ("5", "5"),
    ("6", "6"),
    ("7", "7"),
    ("8", "8"),
    ("9", "9"),
    ("10", "10"),
    ("11", "11"),
    ("12", "12"),
];

/// Map a month field to its integer string (`"March"`, `" march"`, `"3"` all give `"3"`).
///
/// Returns `None` for anything outside the table.
pub fn normalize_month(value: &str) -> Option<&'static str> {
    let needle = value.trim().to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, number)| *number)
}
