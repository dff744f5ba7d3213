// CSV/TSV import/export

use ledgermatch_recon::error::ReconError;
use ledgermatch_recon::model::{format_number, CellValue, MismatchReport};

use crate::report::{OutputCell, ReportLayout};

/// Read delimited text into raw rows (header row included).
///
/// `delimiter = None` sniffs the delimiter from the first lines.
pub fn read_rows(label: &str, bytes: &[u8], delimiter: Option<u8>) -> Result<Vec<Vec<CellValue>>, ReconError> {
    let content = decode_utf8(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ReconError::parse(label, e.to_string()))?;
        rows.push(record.iter().map(CellValue::text).collect());
    }
    Ok(rows)
}

/// Pick the delimiter of a statement export that may use `;`, tabs or pipes.
///
/// Each candidate splits the first ten lines. A candidate that leaves the
/// first line whole is out; the rest score the number of lines agreeing with
/// the first line's field count, times that count. Earlier candidates win
/// ties; nothing viable falls back to a comma.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    let mut best = (b',', 0usize);
    for delimiter in CANDIDATES {
        let counts: Vec<usize> = sample.iter().map(|line| field_count(line, delimiter)).collect();
        let Some(&width) = counts.first() else {
            break;
        };
        if width <= 1 {
            continue;
        }
        let score = counts.iter().filter(|&&c| c == width).count() * width;
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs).
///
/// A leading UTF-8 BOM is dropped before either decode.
pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::debug!("input is not UTF-8, decoding as Windows-1252");
            // BOM already stripped; no sniffing on the fallback path
            let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            decoded.into_owned()
        }
    }
}

/// Export mismatch reports as CSV in the flat report layout.
pub fn export_reports(layout: &ReportLayout, reports: &[MismatchReport]) -> Result<Vec<u8>, ReconError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(layout.headers())
        .map_err(|e| ReconError::Output(e.to_string()))?;

    for report in reports {
        let record: Vec<String> = layout
            .row(report)
            .into_iter()
            .map(|cell| match cell {
                OutputCell::Text(s) => s,
                OutputCell::Number(n) => format_number(n),
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| ReconError::Output(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ReconError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermatch_recon::model::{Comparable, FieldComparison};
    use ledgermatch_recon::ReconConfig;

    #[test]
    fn sniff_picks_consistent_delimiter() {
        assert_eq!(sniff_delimiter("Narration;Credit;Debit\nRent;100;\nFee;;15\n"), b';');
        assert_eq!(sniff_delimiter("Narration,Credit,Debit\nRent,100,\nFee,,15\n"), b',');
        assert_eq!(sniff_delimiter("Narration\tCredit\tDebit\nRent\t100\t\n"), b'\t');
        assert_eq!(sniff_delimiter("Narration|Credit\nRent|100\n"), b'|');
    }

    #[test]
    fn sniff_ignores_commas_inside_quoted_narration() {
        let content = "Narration;Credit;Debit\n\"Rent, \";100;\n\"NEFT, ACME\";;50\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("Narration\nRent\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn read_rows_keeps_blanks_absent() {
        let rows = read_rows("bank.csv", b"Narration,Credit\nRent,100\nFee,\n", None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![CellValue::text("Narration"), CellValue::text("Credit")]);
        assert_eq!(rows[2][1], CellValue::Absent);
    }

    #[test]
    fn read_rows_strips_bom_and_decodes_latin1() {
        let mut bytes = b"\xef\xbb\xbfKey,Amt\n".to_vec();
        bytes.extend_from_slice(b"Caf\xe9,1\n");
        // BOM-prefixed but not valid UTF-8: BOM dropped, rest decoded as Windows-1252
        let rows = read_rows("x.csv", &bytes, Some(b',')).unwrap();
        assert_eq!(rows[0][0], CellValue::text("Key"));
        assert_eq!(rows[1][0], CellValue::text("Caf\u{e9}"));

        let rows = read_rows("y.csv", "\u{feff}Key,Amt\nA,1\n".as_bytes(), None).unwrap();
        assert_eq!(rows[0][0], CellValue::text("Key"));
    }

    #[test]
    fn latin1_without_bom() {
        assert_eq!(decode_utf8(b"Na\xefve \x80"), "Na\u{ef}ve \u{20ac}");
        assert_eq!(decode_utf8("plain ascii".as_bytes()), "plain ascii");
    }

    #[test]
    fn export_writes_flat_layout() {
        let layout = ReportLayout::from_config(&ReconConfig::default());
        let report = MismatchReport {
            key: "Rent".into(),
            fields: vec![
                FieldComparison {
                    column: "Credit".into(),
                    left: Comparable::Number(100.0),
                    right: Comparable::Number(200.0),
                },
                FieldComparison {
                    column: "Debit".into(),
                    left: Comparable::Number(0.0),
                    right: Comparable::Number(0.0),
                },
                FieldComparison {
                    column: "Balance".into(),
                    left: Comparable::Number(10.5),
                    right: Comparable::Number(10.5),
                },
            ],
            mismatched: vec!["Credit".into()],
        };

        let bytes = export_reports(&layout, &[report]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Description,File1_Credit,File2_Credit,File1_Debit,File2_Debit,File1_Balance,File2_Balance,Mismatch In"
        );
        assert_eq!(lines.next().unwrap(), "Rent,100,200,0,0,10.5,10.5,Credit");
        assert!(lines.next().is_none());
    }
}
