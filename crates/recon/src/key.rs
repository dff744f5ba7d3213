use crate::model::CellValue;

/// Normalize a raw key string: trim surrounding whitespace, then strip
/// trailing commas.
///
/// `"Rent, "` and `" Rent,,"` both become `"Rent"`. Whitespace exposed by the
/// comma strip is kept: `"Rent ,"` is `"Rent "`, a different key. Matching
/// after this is exact and case-sensitive.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().trim_end_matches(',').to_string()
}

/// Normalized key for a cell. Numbers use their display form, `Absent` is
/// the empty key.
pub fn normalize_cell(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => normalize_key(s),
        CellValue::Number(_) => normalize_key(&value.to_string()),
        CellValue::Absent => String::new(),
    }
}
