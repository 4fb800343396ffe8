/// Standard policy term in days, the denominator of the pro-rata factor
pub const STANDARD_COVER_DAYS: i64 = 365;

/// Decimal places for final monetary figures
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Controlled vocabulary of section names. Free-text names outside this
/// catalogue are accepted as long as they are non-empty.
pub const SECTION_NAME_CATALOGUE: &[&str] = &[
    "Building",
    "Contents",
    "Stock",
    "Machinery",
    "Electronic Equipment",
    "Loss of Profit",
    "Goods in Transit",
    "Money",
    "Glass",
];

/// Returns true when `name` is one of the catalogue section names.
pub fn is_catalogue_section_name(name: &str) -> bool {
    SECTION_NAME_CATALOGUE
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name.trim()))
}
