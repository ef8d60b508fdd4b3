//! Required-columns schema enforcement.
//!
//! Two generations of the ledger template circulated in the clinic: the
//! older one misspelled two headers (`BENEFICIERO` for `BENEFICIARIO`).
//! Instead of carrying both lists, the canonical set lives in
//! [`Column`](crate::table::Column) and the old spellings are aliases
//! resolved here during normalization.

use crate::error::{LedgerError, LedgerResult};
use crate::table::{Column, Row, Table};
use registro_types::CellValue;

/// A decoded table before schema enforcement: raw headers and untyped cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Renders a canonical [`Table`] back into raw form (used when writing
    /// and when re-normalizing a loaded file).
    pub fn from_table(table: &Table) -> Self {
        Self {
            headers: Column::ALL.iter().map(|c| c.header().to_owned()).collect(),
            rows: table.rows().iter().map(|r| r.cells().to_vec()).collect(),
        }
    }
}

/// How strictly an incoming table is held to the required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// The file must have exactly [`Column::COUNT`] columns; headers are
    /// then taken positionally. This is the older generation's behaviour
    /// and the upload contract of the web API.
    Strict,
    /// Columns are matched by (whitespace-normalized) header name; missing
    /// ones are filled with empties, unknown ones dropped. Never fails.
    Lenient,
}

impl std::str::FromStr for SchemaMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SchemaMode::Strict),
            "lenient" => Ok(SchemaMode::Lenient),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown schema mode {:?} (expected \"strict\" or \"lenient\")",
                other
            ))),
        }
    }
}

/// Header spellings from the older template generation, mapped to their
/// canonical column.
const HEADER_ALIASES: [(&str, Column); 2] = [
    ("FECHA DE NACIMIENTO BENEFICIERO", Column::PatientBirthDate),
    ("EDAD BENEFICIERO", Column::PatientAge),
];

/// Collapses whitespace runs (including embedded newlines) to single spaces
/// and trims, so `"OBSERVACIONES\n"` and `"OBSERVACIONES"` compare equal
/// and template headers survive hand-editing in a spreadsheet program.
fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a raw header names this canonical column, honouring
/// old-generation aliases. The two observation columns normalize to the
/// same name; the caller disambiguates by consuming input columns left to
/// right, so the first occurrence feeds the first canonical occurrence.
fn header_matches(column: Column, header: &str) -> bool {
    let normalized = normalize_header(header);
    if normalize_header(column.header()) == normalized {
        return true;
    }
    HEADER_ALIASES
        .iter()
        .any(|(alias, c)| *c == column && normalize_header(alias) == normalized)
}

/// Enforces the required-columns contract on a raw table.
///
/// Strict mode reproduces the count-based check of the original intake
/// path: any file with the right number of columns is accepted and its
/// columns are read positionally. Lenient mode matches by header name in
/// any order: each canonical column consumes the first unused input column
/// that resolves to it (so the two stripped-identical `OBSERVACIONES`
/// headers land on the mid-sheet and trailing columns respectively),
/// missing columns are filled with empty cells, and unrecognized columns
/// are discarded.
pub fn normalize(raw: RawTable, mode: SchemaMode) -> LedgerResult<Table> {
    match mode {
        SchemaMode::Strict => {
            if raw.headers.len() != Column::COUNT {
                return Err(LedgerError::SchemaMismatch {
                    expected: Column::COUNT,
                    got: raw.headers.len(),
                });
            }
            let rows = raw.rows.into_iter().map(Row::from_cells).collect();
            Ok(Table::from_rows(rows))
        }
        SchemaMode::Lenient => {
            // source[i] = input column feeding canonical column i, if any.
            let mut source: [Option<usize>; Column::COUNT] = [None; Column::COUNT];
            let mut used = vec![false; raw.headers.len()];
            for column in Column::ALL {
                for (j, header) in raw.headers.iter().enumerate() {
                    if used[j] {
                        continue;
                    }
                    if header_matches(column, header) {
                        source[column.index()] = Some(j);
                        used[j] = true;
                        break;
                    }
                }
            }

            let rows = raw
                .rows
                .into_iter()
                .map(|cells| {
                    let mut row = Row::empty();
                    for column in Column::ALL {
                        if let Some(j) = source[column.index()] {
                            if let Some(cell) = cells.get(j) {
                                row.set(column, cell.clone());
                            }
                        }
                    }
                    row
                })
                .collect();
            Ok(Table::from_rows(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_headers() -> Vec<String> {
        Column::ALL.iter().map(|c| c.header().to_owned()).collect()
    }

    #[test]
    fn test_strict_accepts_exact_count() {
        let raw = RawTable {
            headers: canonical_headers(),
            rows: vec![vec![CellValue::from("X"); Column::COUNT]],
        };
        let table = normalize(raw, SchemaMode::Strict).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].text(Column::DependencyCode), "X");
    }

    #[test]
    fn test_strict_rejects_wrong_count() {
        let raw = RawTable {
            headers: vec!["A".into(), "B".into()],
            rows: vec![],
        };
        let err = normalize(raw, SchemaMode::Strict).unwrap_err();
        match err {
            LedgerError::SchemaMismatch { expected, got } => {
                assert_eq!(expected, Column::COUNT);
                assert_eq!(got, 2);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_fills_missing_column_with_empty() {
        // Only two of the required columns are present.
        let raw = RawTable {
            headers: vec![
                Column::PatientName.header().to_owned(),
                Column::Quantity.header().to_owned(),
            ],
            rows: vec![vec![CellValue::from("Ana Li"), CellValue::Number(2.0)]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.text(Column::PatientName), "Ana Li");
        assert_eq!(row.text(Column::Quantity), "2");
        for column in Column::ALL {
            if column != Column::PatientName && column != Column::Quantity {
                assert!(row.get(column).is_empty(), "{:?} should be empty", column);
            }
        }
    }

    #[test]
    fn test_lenient_reorders_permuted_columns() {
        // Rotate the columns; rotation keeps the relative order of the two
        // identically-stripped OBSERVACIONES headers, which is the only
        // ordering constraint name-matching cannot recover on its own.
        let mut headers = canonical_headers();
        headers.rotate_left(7);
        let mut cells: Vec<CellValue> = (0..Column::COUNT)
            .map(|i| CellValue::from(format!("v{}", i)))
            .collect();
        cells.rotate_left(7);
        let raw = RawTable {
            headers,
            rows: vec![cells],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        for (i, column) in Column::ALL.into_iter().enumerate() {
            assert_eq!(row.text(column), format!("v{}", i));
        }
    }

    #[test]
    fn test_lenient_drops_unknown_columns() {
        let raw = RawTable {
            headers: vec![
                "TOTALLY UNRELATED".to_owned(),
                Column::PatientName.header().to_owned(),
            ],
            rows: vec![vec![CellValue::from("junk"), CellValue::from("Ana Li")]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.text(Column::PatientName), "Ana Li");
        assert!(!row.cells().iter().any(|c| c.as_text() == "junk"));
    }

    #[test]
    fn test_lenient_duplicate_observations_resolve_positionally() {
        // Both observation headers strip to the same name; the first feeds
        // the mid-sheet column, the second the trailing one.
        let raw = RawTable {
            headers: vec!["OBSERVACIONES".into(), "OBSERVACIONES\n".into()],
            rows: vec![vec![CellValue::from("first"), CellValue::from("second")]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.text(Column::Observations), "first");
        assert_eq!(row.text(Column::FinalObservations), "second");
    }

    #[test]
    fn test_lenient_resolves_old_generation_spellings() {
        let raw = RawTable {
            headers: vec![
                "FECHA DE NACIMIENTO BENEFICIERO".into(),
                "EDAD BENEFICIERO".into(),
            ],
            rows: vec![vec![CellValue::from("1990-01-01"), CellValue::Number(35.0)]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.text(Column::PatientBirthDate), "1990-01-01");
        assert_eq!(row.text(Column::PatientAge), "35");
    }

    #[test]
    fn test_lenient_tolerates_whitespace_drift_in_headers() {
        let raw = RawTable {
            headers: vec!["CÓDIGO DEPENDENCIA (ESPECIALIDAD)".into()],
            rows: vec![vec![CellValue::from("027")]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        assert_eq!(table.rows()[0].text(Column::DependencyCode), "027");
    }

    #[test]
    fn test_lenient_pads_short_rows() {
        let raw = RawTable {
            headers: canonical_headers(),
            rows: vec![vec![CellValue::from("only-first")]],
        };
        let table = normalize(raw, SchemaMode::Lenient).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.text(Column::DependencyCode), "only-first");
        assert!(row.get(Column::FinalMark).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_tables() {
        let raw = RawTable {
            headers: canonical_headers(),
            rows: vec![vec![CellValue::from("X"); Column::COUNT]],
        };
        let once = normalize(raw, SchemaMode::Lenient).unwrap();
        let again = normalize(RawTable::from_table(&once), SchemaMode::Lenient).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn test_schema_mode_from_str() {
        assert_eq!("strict".parse::<SchemaMode>().unwrap(), SchemaMode::Strict);
        assert_eq!(
            " Lenient ".parse::<SchemaMode>().unwrap(),
            SchemaMode::Lenient
        );
        assert!("loose".parse::<SchemaMode>().is_err());
    }
}
