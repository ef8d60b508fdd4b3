//! Visit color banding.
//!
//! Every contiguous block of rows belonging to one visit, grouped by the
//! composite key (patient name, visit date), gets one background fill,
//! cycling through a fixed palette. The banding is a visual aid for the
//! clerk only; it carries no identity and is never read back, so a save
//! that cannot be coloured still succeeds.

use std::path::Path;

use crate::error::LedgerResult;
use crate::schema::RawTable;
use crate::table::{Column, Table};
use crate::workbook;

/// The banding palette. The first two entries are the fills the clinic has
/// used since the first generation of the tool; the rest extend the cycle
/// so long sheets don't alternate between only two colours.
pub const DEFAULT_PALETTE: [u32; 10] = [
    0x92D050, // green
    0x00B0F0, // blue
    0xFFC000, // amber
    0xFF7C80, // salmon
    0xB1A0C7, // lavender
    0xFABF8F, // tan
    0xA9D08E, // sage
    0x8DB4E2, // sky
    0xD9D2E9, // lilac
    0xE6B8AF, // rose
];

/// Palette index per row: advance on every grouping-key transition,
/// including the transition from "no prior key" to the first row, wrapping
/// modulo the palette length.
fn color_indices<K: PartialEq>(keys: impl Iterator<Item = K>, palette_len: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut prev: Option<K> = None;
    let mut index = 0usize;
    for key in keys {
        match &prev {
            None => index = 0,
            Some(p) if *p != key => index = (index + 1) % palette_len,
            _ => {}
        }
        prev = Some(key);
        out.push(index);
    }
    out
}

/// Fill colors for a canonical ledger table, one RGB value per row.
pub fn row_fills(table: &Table, palette: &[u32]) -> Vec<u32> {
    let indices = color_indices(
        table
            .rows()
            .iter()
            .map(|r| (r.text(Column::PatientName), r.text(Column::VisitDate))),
        palette.len(),
    );
    indices.into_iter().map(|i| palette[i]).collect()
}

/// Fill colors for a raw (not yet normalized) table.
///
/// Returns `None` when either grouping-key header is absent, in which case
/// the caller saves the file uncoloured. The header match uses the same
/// whitespace-collapsed comparison as the schema normalizer.
pub fn raw_row_fills(raw: &RawTable, palette: &[u32]) -> Option<Vec<u32>> {
    fn locate(raw: &RawTable, wanted: &str) -> Option<usize> {
        let wanted: String = wanted.split_whitespace().collect::<Vec<_>>().join(" ");
        raw.headers
            .iter()
            .position(|h| h.split_whitespace().collect::<Vec<_>>().join(" ") == wanted)
    }

    let patient_idx = locate(raw, Column::PatientName.header())?;
    let date_idx = locate(raw, Column::VisitDate.header())?;

    let indices = color_indices(
        raw.rows.iter().map(|cells| {
            (
                cells.get(patient_idx).map(|c| c.as_text()).unwrap_or_default(),
                cells.get(date_idx).map(|c| c.as_text()).unwrap_or_default(),
            )
        }),
        palette.len(),
    );
    Some(indices.into_iter().map(|i| palette[i]).collect())
}

/// Recolors a saved spreadsheet in place.
///
/// Reads the file back, derives the grouping key from its own header row,
/// and rewrites it with fresh bands. Returns `Ok(false)`, leaving the
/// file untouched, when coloring is not possible (CSV, or the key
/// headers are missing); the ledger's integrity never depends on this
/// succeeding.
pub fn apply_to_file(path: &Path, palette: &[u32]) -> LedgerResult<bool> {
    if workbook::is_csv(path) {
        tracing::warn!(file = %path.display(), "CSV files carry no fills, coloring skipped");
        return Ok(false);
    }
    let raw = workbook::read_table(path)?;
    match raw_row_fills(&raw, palette) {
        Some(fills) => {
            workbook::write_raw_xlsx(path, &raw, Some(&fills))?;
            Ok(true)
        }
        None => {
            tracing::warn!(
                file = %path.display(),
                "grouping-key columns missing, coloring skipped"
            );
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;
    use registro_types::CellValue;

    fn visit_row(patient: &str, date: &str) -> Row {
        let mut row = Row::empty();
        row.set(Column::PatientName, CellValue::from(patient));
        row.set(Column::VisitDate, CellValue::from(date));
        row
    }

    #[test]
    fn test_banding_groups_by_composite_key() {
        // Keys: K1 K1 K2 K2 K2 K1 -> palette indices 0 0 1 1 1 2.
        let table = Table::from_rows(vec![
            visit_row("Ana Li", "2025-01-02"),
            visit_row("Ana Li", "2025-01-02"),
            visit_row("Bo Chen", "2025-01-02"),
            visit_row("Bo Chen", "2025-01-02"),
            visit_row("Bo Chen", "2025-01-02"),
            visit_row("Ana Li", "2025-01-02"),
        ]);
        let fills = row_fills(&table, &DEFAULT_PALETTE);
        assert_eq!(
            fills,
            vec![
                DEFAULT_PALETTE[0],
                DEFAULT_PALETTE[0],
                DEFAULT_PALETTE[1],
                DEFAULT_PALETTE[1],
                DEFAULT_PALETTE[1],
                DEFAULT_PALETTE[2],
            ]
        );
    }

    #[test]
    fn test_banding_same_patient_different_dates_are_distinct_visits() {
        let table = Table::from_rows(vec![
            visit_row("Ana Li", "2025-01-02"),
            visit_row("Ana Li", "2025-01-09"),
        ]);
        let fills = row_fills(&table, &DEFAULT_PALETTE);
        assert_ne!(fills[0], fills[1]);
    }

    #[test]
    fn test_banding_wraps_palette() {
        let palette = [0xAAAAAA, 0xBBBBBB];
        let table = Table::from_rows(vec![
            visit_row("p1", "d"),
            visit_row("p2", "d"),
            visit_row("p3", "d"),
        ]);
        let fills = row_fills(&table, &palette);
        assert_eq!(fills, vec![palette[0], palette[1], palette[0]]);
    }

    #[test]
    fn test_banding_empty_table() {
        assert!(row_fills(&Table::new(), &DEFAULT_PALETTE).is_empty());
    }

    #[test]
    fn test_raw_banding_missing_key_column_skips() {
        let raw = RawTable {
            headers: vec!["SOMETHING ELSE".into()],
            rows: vec![vec![CellValue::from("x")]],
        };
        assert!(raw_row_fills(&raw, &DEFAULT_PALETTE).is_none());
    }

    #[test]
    fn test_apply_to_file_recolors_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.xlsx");
        let table = Table::from_rows(vec![
            visit_row("Ana Li", "2025-01-02"),
            visit_row("Bo Chen", "2025-01-03"),
        ]);
        workbook::write_xlsx(&path, &table, None).unwrap();

        assert!(apply_to_file(&path, &DEFAULT_PALETTE).unwrap());

        // Values survive the rewrite.
        let raw = workbook::read_table(&path).unwrap();
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(
            raw.rows[1][Column::PatientName.index()],
            CellValue::Text("Bo Chen".into())
        );
    }

    #[test]
    fn test_apply_to_file_skips_when_key_headers_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.xlsx");
        let raw = RawTable {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec![CellValue::from("1"), CellValue::from("2")]],
        };
        workbook::write_raw_xlsx(&path, &raw, None).unwrap();

        assert!(!apply_to_file(&path, &DEFAULT_PALETTE).unwrap());
        // File left as it was.
        let reread = workbook::read_table(&path).unwrap();
        assert_eq!(reread.headers, raw.headers);
    }

    #[test]
    fn test_raw_banding_matches_canonical_banding() {
        let table = Table::from_rows(vec![
            visit_row("Ana Li", "2025-01-02"),
            visit_row("Bo Chen", "2025-01-02"),
        ]);
        let raw = RawTable::from_table(&table);
        assert_eq!(
            raw_row_fills(&raw, &DEFAULT_PALETTE).unwrap(),
            row_fills(&table, &DEFAULT_PALETTE)
        );
    }
}
