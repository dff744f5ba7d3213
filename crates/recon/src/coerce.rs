use serde::{Deserialize, Serialize};

use crate::model::{format_number, CellValue, Comparable};

/// How a compare column's cells are interpreted before equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Numeric,
    Text,
}

/// Coerce a cell for comparison.
///
/// `None` (column missing from the table), `Absent` and whitespace-only text
/// all coerce to zero, so a missing field compares exactly like an explicit zero.
///
/// - `Numeric`: numbers stay numbers, numeric-looking text is parsed, other
///   text is kept (trimmed) and never equals a number.
/// - `Text`: everything is compared as trimmed text; numbers use their
///   display form.
pub fn coerce(value: Option<&CellValue>, kind: ColumnKind) -> Comparable {
    let value = match value {
        None | Some(CellValue::Absent) => return zero(kind),
        Some(CellValue::Text(s)) if s.trim().is_empty() => return zero(kind),
        Some(v) => v,
    };

    match (kind, value) {
        (ColumnKind::Numeric, CellValue::Number(n)) => Comparable::Number(*n),
        (ColumnKind::Numeric, CellValue::Text(s)) => match parse_financial_number(s) {
            Some(n) => Comparable::Number(n),
            None => Comparable::Text(s.trim().to_string()),
        },
        (ColumnKind::Text, CellValue::Number(n)) => Comparable::Text(format_number(*n)),
        (ColumnKind::Text, CellValue::Text(s)) => Comparable::Text(s.trim().to_string()),
        (_, CellValue::Absent) => zero(kind),
    }
}

fn zero(kind: ColumnKind) -> Comparable {
    match kind {
        ColumnKind::Numeric => Comparable::Number(0.0),
        ColumnKind::Text => Comparable::Text("0".to_string()),
    }
}

/// Numeric reading of a text cell in a `Numeric` compare column.
///
/// Accepts what bank and ledger exports put in amount cells: a `$`, thousands
/// separators, inner or surrounding whitespace, a leading sign, and
/// accounting negatives in parentheses. `None` leaves the cell as text.
pub fn parse_financial_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negate, body) = match s.strip_prefix('(') {
        Some(rest) => (true, rest.strip_suffix(')')?),
        None => (false, s),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let digits = cleaned.strip_prefix(&['-', '+'][..]).unwrap_or(cleaned.as_str());

    // No sign inside parentheses: "(-5)" is not an amount
    if negate && digits.len() != cleaned.len() {
        return None;
    }
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if negate { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_missing_are_zero() {
        assert_eq!(coerce(None, ColumnKind::Numeric), Comparable::Number(0.0));
        assert_eq!(coerce(Some(&CellValue::Absent), ColumnKind::Numeric), Comparable::Number(0.0));
        assert_eq!(
            coerce(None, ColumnKind::Numeric),
            coerce(Some(&CellValue::Number(0.0)), ColumnKind::Numeric)
        );
        assert_eq!(
            coerce(None, ColumnKind::Text),
            coerce(Some(&CellValue::Number(0.0)), ColumnKind::Text)
        );
        assert_eq!(coerce(Some(&CellValue::Text("   ".into())), ColumnKind::Numeric), Comparable::Number(0.0));
    }

    #[test]
    fn numeric_compares_by_value() {
        let a = coerce(Some(&CellValue::Number(100.0)), ColumnKind::Numeric);
        let b = coerce(Some(&CellValue::Text("100.00".into())), ColumnKind::Numeric);
        let c = coerce(Some(&CellValue::Text(" $100 ".into())), ColumnKind::Numeric);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn numeric_keeps_non_numeric_text() {
        let v = coerce(Some(&CellValue::Text(" n/a ".into())), ColumnKind::Numeric);
        assert_eq!(v, Comparable::Text("n/a".into()));
        assert_ne!(v, Comparable::Number(0.0));
    }

    #[test]
    fn text_kind_uses_display_form() {
        assert_eq!(
            coerce(Some(&CellValue::Number(42.0)), ColumnKind::Text),
            Comparable::Text("42".into())
        );
        assert_eq!(
            coerce(Some(&CellValue::Text(" CR ".into())), ColumnKind::Text),
            Comparable::Text("CR".into())
        );
        // No numeric interpretation for text columns
        assert_ne!(
            coerce(Some(&CellValue::Text("1.0".into())), ColumnKind::Text),
            coerce(Some(&CellValue::Number(1.0)), ColumnKind::Text)
        );
    }

    #[test]
    fn amounts_plain_and_signed() {
        assert_eq!(parse_financial_number("123.45"), Some(123.45));
        assert_eq!(parse_financial_number("-50"), Some(-50.0));
        assert_eq!(parse_financial_number("+7.25"), Some(7.25));
        assert_eq!(parse_financial_number("0"), Some(0.0));
    }

    #[test]
    fn amounts_with_currency_and_separators() {
        assert_eq!(parse_financial_number("$685.00"), Some(685.0));
        assert_eq!(parse_financial_number("1,234.56"), Some(1234.56));
    }

    #[test]
    fn accounting_negatives() {
        assert_eq!(parse_financial_number("(500.00)"), Some(-500.0));
        assert_eq!(parse_financial_number("(-5)"), None);
    }

    #[test]
    fn non_amounts_stay_text() {
        assert_eq!(parse_financial_number(""), None);
        assert_eq!(parse_financial_number("abc"), None);
        assert_eq!(parse_financial_number("12abc34"), None);
        assert_eq!(parse_financial_number("$"), None);
        assert_eq!(parse_financial_number("(12"), None);
        assert_eq!(parse_financial_number("1.2.3"), None);
    }
}
