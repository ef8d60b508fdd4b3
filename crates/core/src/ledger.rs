//! The ledger store: the in-memory table and its file mirror.
//!
//! The backing file is the durable record; the in-memory table is a cache
//! of it, rewritten in full on every mutating operation. The store itself
//! does no locking: the REST layer serializes mutations behind one lock,
//! and the CLI is single-threaded by nature.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::banding;
use crate::catalog::CatalogSet;
use crate::config::CoreConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::insert::{self, AddOutcome, LineItem, PatientPolicy, VisitContext};
use crate::schema::{self, RawTable, SchemaMode};
use crate::table::{Row, Table};
use crate::workbook;

#[derive(Debug)]
pub struct LedgerStore {
    table: Table,
    path: PathBuf,
    mode: SchemaMode,
}

impl LedgerStore {
    /// Opens the store configured in `cfg` (see [`LedgerStore::open`]).
    pub fn load(cfg: &CoreConfig) -> LedgerResult<Self> {
        Self::open(cfg.data_file(), cfg.schema_mode())
    }

    /// Opens the ledger at `path`, decoding and normalizing it under the
    /// given schema mode. A missing file starts an empty ledger; it will
    /// be created on the first persist.
    pub fn open(path: &Path, mode: SchemaMode) -> LedgerResult<Self> {
        let table = if path.exists() {
            let raw = workbook::read_table(path)?;
            schema::normalize(raw, mode)?
        } else {
            tracing::info!(file = %path.display(), "no ledger file yet, starting empty");
            Table::new()
        };
        Ok(Self {
            table,
            path: path.to_path_buf(),
            mode,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn rows(&self) -> &[Row] {
        self.table.rows()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }

    /// Whether the backing file currently exists on disk.
    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Replaces the whole ledger with an uploaded table, normalized under
    /// the store's schema mode. In-memory only; callers persist when they
    /// mean to overwrite the backing file.
    pub fn replace(&mut self, raw: RawTable) -> LedgerResult<()> {
        self.table = schema::normalize(raw, self.mode)?;
        Ok(())
    }

    /// Runs the insertion engine for one visit and mirrors the result to
    /// the backing file. Validation failures leave both the table and the
    /// file untouched.
    pub fn add_entry(
        &mut self,
        catalogs: &CatalogSet,
        ctx: &VisitContext,
        items: &[LineItem],
        policy: PatientPolicy,
    ) -> LedgerResult<AddOutcome> {
        let outcome = insert::add_entry(&mut self.table, catalogs, ctx, items, policy)?;
        self.persist()?;
        Ok(outcome)
    }

    /// Removes rows by their 0-based positions in the current ordering and
    /// rewrites the backing file. Positions are not stable identities:
    /// callers must list rows again before deleting.
    pub fn remove(&mut self, positions: &BTreeSet<usize>) -> LedgerResult<usize> {
        let removed = self.table.remove_positions(positions);
        self.persist()?;
        Ok(removed)
    }

    /// Rewrites the backing file from the in-memory table, painting visit
    /// color bands. CSV ledgers are written without fills.
    pub fn persist(&self) -> LedgerResult<()> {
        if workbook::is_csv(&self.path) {
            workbook::write_csv(&self.path, &self.table)
        } else {
            let fills = banding::row_fills(&self.table, &banding::DEFAULT_PALETTE);
            workbook::write_xlsx(&self.path, &self.table, Some(&fills))
        }
    }

    /// Reads the persisted file back as raw bytes (for download).
    pub fn read_file(&self) -> LedgerResult<Vec<u8>> {
        if !self.file_exists() {
            return Err(LedgerError::ResourceNotFound(self.path.clone()));
        }
        std::fs::read(&self.path).map_err(LedgerError::FileRead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use registro_types::CellValue;

    fn store_in(dir: &Path) -> LedgerStore {
        LedgerStore::open(&dir.join("data.xlsx"), SchemaMode::Lenient).unwrap()
    }

    fn named_row(patient: &str) -> Row {
        let mut row = Row::empty();
        row.set(Column::PatientName, CellValue::from(patient));
        row
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.is_empty());
        assert!(!store.file_exists());
    }

    #[test]
    fn test_persist_then_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store
            .replace(RawTable::from_table(&Table::from_rows(vec![
                named_row("Ana Li"),
                named_row("Bo Chen"),
            ])))
            .unwrap();
        store.persist().unwrap();

        let reopened = store_in(dir.path());
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.rows()[1].text(Column::PatientName), "Bo Chen");
    }

    #[test]
    fn test_replace_respects_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            LedgerStore::open(&dir.path().join("data.xlsx"), SchemaMode::Strict).unwrap();
        let bad = RawTable {
            headers: vec!["ONLY".into()],
            rows: vec![],
        };
        assert!(matches!(
            store.replace(bad),
            Err(LedgerError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_persists_survivors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store
            .replace(RawTable::from_table(&Table::from_rows(vec![
                named_row("r0"),
                named_row("r1"),
                named_row("r2"),
                named_row("r3"),
                named_row("r4"),
            ])))
            .unwrap();

        let removed = store.remove(&[1, 3].into_iter().collect()).unwrap();
        assert_eq!(removed, 2);

        let reopened = store_in(dir.path());
        let names: Vec<_> = reopened
            .rows()
            .iter()
            .map(|r| r.text(Column::PatientName))
            .collect();
        assert_eq!(names, vec!["r0", "r2", "r4"]);
    }

    #[test]
    fn test_read_file_before_first_persist_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(
            store.read_file(),
            Err(LedgerError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_csv_ledger_persists_without_fills() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut store = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
        store
            .replace(RawTable::from_table(&Table::from_rows(vec![named_row(
                "Ana Li",
            )])))
            .unwrap();
        store.persist().unwrap();

        let reopened = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
        assert_eq!(reopened.len(), 1);
    }
}
