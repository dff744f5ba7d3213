use crate::coerce::coerce;
use crate::config::{CompareColumn, ReconConfig};
use crate::error::ReconError;
use crate::index::{KeyIndex, Resolution};
use crate::model::{
    DuplicateKey, FieldComparison, MismatchReport, ReconDiagnostics, ReconMeta, ReconOutcome,
    ReconResult, SourceInfo, Table,
};

/// Run reconciliation per config and wrap the outcome with run metadata.
pub fn run(config: &ReconConfig, left: &Table, right: &Table) -> Result<ReconResult, ReconError> {
    let outcome = reconcile(left, right, config)?;

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            left: source_info(left, &config.left.key),
            right: source_info(right, &config.right.key),
            compare_columns: config.compare_names(),
        },
        summary: outcome.diagnostics,
        reports: outcome.reports,
    })
}

fn source_info(table: &Table, key_column: &str) -> SourceInfo {
    SourceInfo {
        label: table.label().to_string(),
        sha256: table.fingerprint().map(str::to_string),
        key_column: key_column.to_string(),
    }
}

/// Reconcile two tables using the key and compare columns from `config`.
pub fn reconcile(left: &Table, right: &Table, config: &ReconConfig) -> Result<ReconOutcome, ReconError> {
    reconcile_tables(left, &config.left.key, right, &config.right.key, &config.compare)
}

/// Match `left` and `right` on their normalized key columns and report every
/// uniquely-matched key whose compare columns disagree.
///
/// Reports follow the left table's first-occurrence key order. Keys with more
/// than one record on either side are skipped and listed in the diagnostics.
/// Fails only if a key column is missing, before any matching happens.
pub fn reconcile_tables(
    left: &Table,
    left_key: &str,
    right: &Table,
    right_key: &str,
    compare: &[CompareColumn],
) -> Result<ReconOutcome, ReconError> {
    left.require_column(left_key)?;
    right.require_column(right_key)?;

    let left_index = KeyIndex::build(left, left_key)?;
    let right_index = KeyIndex::build(right, right_key)?;

    let mut diagnostics = ReconDiagnostics {
        left_rows: left.len(),
        right_rows: right.len(),
        left_keys: left_index.len(),
        right_keys: right_index.len(),
        ..Default::default()
    };
    let mut reports = Vec::new();

    for key in left_index.intersection(&right_index) {
        diagnostics.common_keys += 1;

        let (left_row, right_row) = match (left_index.resolve(key), right_index.resolve(key)) {
            (Resolution::One(l), Resolution::One(r)) => (l, r),
            (l, r) => {
                let dup = DuplicateKey {
                    key: key.to_string(),
                    left_count: bucket_size(l),
                    right_count: bucket_size(r),
                };
                log::debug!(
                    "skipping ambiguous key {:?} ({} left, {} right)",
                    dup.key,
                    dup.left_count,
                    dup.right_count
                );
                diagnostics.duplicate_keys.push(dup);
                continue;
            }
        };

        diagnostics.compared += 1;
        match compare_records(key, left, left_row, right, right_row, compare) {
            Some(report) => {
                diagnostics.mismatched += 1;
                reports.push(report);
            }
            None => diagnostics.matched += 1,
        }
    }

    diagnostics.skipped_duplicates = diagnostics.duplicate_keys.len();
    diagnostics.left_only = diagnostics.left_keys - diagnostics.common_keys;
    diagnostics.right_only = diagnostics.right_keys - diagnostics.common_keys;

    log::info!(
        "reconciled '{}' against '{}': {} common keys, {} mismatched, {} skipped as duplicates",
        left.label(),
        right.label(),
        diagnostics.common_keys,
        diagnostics.mismatched,
        diagnostics.skipped_duplicates
    );

    Ok(ReconOutcome { reports, diagnostics })
}

fn bucket_size(resolution: Resolution<'_>) -> usize {
    match resolution {
        Resolution::None => 0,
        Resolution::One(_) => 1,
        Resolution::Many(rows) => rows.len(),
    }
}

/// Compare one matched pair of records. `None` when every column agrees.
fn compare_records(
    key: &str,
    left: &Table,
    left_row: usize,
    right: &Table,
    right_row: usize,
    compare: &[CompareColumn],
) -> Option<MismatchReport> {
    let fields: Vec<FieldComparison> = compare
        .iter()
        .map(|c| FieldComparison {
            column: c.column.clone(),
            left: coerce(left.value(left_row, &c.column), c.kind),
            right: coerce(right.value(right_row, &c.column), c.kind),
        })
        .collect();

    let mismatched: Vec<String> = fields
        .iter()
        .filter(|f| !f.is_match())
        .map(|f| f.column.clone())
        .collect();

    if mismatched.is_empty() {
        return None;
    }

    Some(MismatchReport {
        key: key.to_string(),
        fields,
        mismatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Comparable};

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn left_table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(
            "left",
            vec!["Narration".into(), "Credit".into(), "Debit".into(), "Balance".into()],
            rows,
        )
        .unwrap()
    }

    fn right_table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(
            "right",
            vec!["Description".into(), "Credit".into(), "Debit".into(), "Balance".into()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn reports_every_field_and_ordered_mismatches() {
        let left = left_table(vec![vec![CellValue::text("Rent"), num(100.0), num(5.0), num(900.0)]]);
        let right = right_table(vec![vec![CellValue::text("Rent"), num(100.0), num(6.0), num(901.0)]]);

        let out = reconcile(&left, &right, &ReconConfig::default()).unwrap();
        assert_eq!(out.reports.len(), 1);
        let report = &out.reports[0];
        assert_eq!(report.fields.len(), 3);
        assert_eq!(report.mismatched, vec!["Debit", "Balance"]);
        assert_eq!(report.field("Credit").unwrap().left, Comparable::Number(100.0));
        assert_eq!(report.field("Debit").unwrap().right, Comparable::Number(6.0));
    }

    #[test]
    fn duplicate_on_right_is_skipped_and_counted() {
        let left = left_table(vec![vec![CellValue::text("Fee"), num(1.0), num(0.0), num(0.0)]]);
        let right = right_table(vec![
            vec![CellValue::text("Fee"), num(2.0), num(0.0), num(0.0)],
            vec![CellValue::text("Fee,"), num(3.0), num(0.0), num(0.0)],
        ]);

        let out = reconcile(&left, &right, &ReconConfig::default()).unwrap();
        assert!(out.reports.is_empty());
        assert_eq!(out.diagnostics.skipped_duplicates, 1);
        assert_eq!(
            out.diagnostics.duplicate_keys,
            vec![DuplicateKey {
                key: "Fee".into(),
                left_count: 1,
                right_count: 2
            }]
        );
        assert_eq!(out.diagnostics.compared, 0);
    }

    #[test]
    fn diagnostics_counts() {
        let left = left_table(vec![
            vec![CellValue::text("a"), num(1.0), num(0.0), num(0.0)],
            vec![CellValue::text("b"), num(1.0), num(0.0), num(0.0)],
            vec![CellValue::text("c"), num(1.0), num(0.0), num(0.0)],
        ]);
        let right = right_table(vec![
            vec![CellValue::text("b"), num(1.0), num(0.0), num(0.0)],
            vec![CellValue::text("c"), num(2.0), num(0.0), num(0.0)],
            vec![CellValue::text("d"), num(1.0), num(0.0), num(0.0)],
        ]);

        let d = reconcile(&left, &right, &ReconConfig::default()).unwrap().diagnostics;
        assert_eq!(d.left_rows, 3);
        assert_eq!(d.right_rows, 3);
        assert_eq!(d.common_keys, 2);
        assert_eq!(d.compared, 2);
        assert_eq!(d.matched, 1);
        assert_eq!(d.mismatched, 1);
        assert_eq!(d.left_only, 1);
        assert_eq!(d.right_only, 1);
    }

    #[test]
    fn missing_right_key_column_fails_before_matching() {
        let left = left_table(vec![]);
        let right = Table::new("bank.csv", vec!["Memo".into()], vec![]).unwrap();
        let err = reconcile(&left, &right, &ReconConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ReconError::MissingColumn {
                table: "bank.csv".into(),
                column: "Description".into()
            }
        );
    }

    #[test]
    fn compare_column_missing_from_both_tables_matches() {
        let left = Table::new("l", vec!["Narration".into()], vec![vec![CellValue::text("x")]]).unwrap();
        let right = Table::new("r", vec!["Description".into()], vec![vec![CellValue::text("x")]]).unwrap();
        let out = reconcile(&left, &right, &ReconConfig::default()).unwrap();
        assert!(out.reports.is_empty());
        assert_eq!(out.diagnostics.matched, 1);
    }

    #[test]
    fn run_fills_meta() {
        let left = left_table(vec![]).with_fingerprint("abc123");
        let right = right_table(vec![]);
        let result = run(&ReconConfig::default(), &left, &right).unwrap();
        assert_eq!(result.meta.config_name, "default");
        assert_eq!(result.meta.left.sha256.as_deref(), Some("abc123"));
        assert_eq!(result.meta.right.key_column, "Description");
        assert_eq!(result.meta.compare_columns, vec!["Credit", "Debit", "Balance"]);
        assert!(result.reports.is_empty());
    }
}
