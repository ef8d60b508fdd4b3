//! End-to-end persistence checks over a real temporary ledger file:
//! normalize → persist → load → normalize must be lossless for schema and
//! cell values (fills are cosmetic and ignored), and a full add/delete
//! cycle must survive a reload.

use std::collections::BTreeSet;

use registro_core::{
    Catalog, CatalogEntry, CatalogSet, CellValue, Column, ItemKind, LedgerStore, LineItem,
    NonEmptyText, PatientPolicy, RawTable, Row, SchemaMode, Table, VisitContext,
};

fn catalogs() -> CatalogSet {
    CatalogSet {
        procedures: Catalog::from_entries(vec![CatalogEntry {
            code: "P100".into(),
            name: "SUTURA SIMPLE".into(),
        }]),
        medications: Catalog::from_entries(vec![CatalogEntry {
            code: "M500".into(),
            name: "IBUPROFENO 400 MG TABLETA".into(),
        }]),
        diagnoses: Catalog::from_entries(vec![CatalogEntry {
            code: "A00".into(),
            name: "Cholera".into(),
        }]),
    }
}

fn visit_row(patient: &str, date: &str, description: &str) -> Row {
    let mut row = Row::empty();
    row.set(Column::PatientName, CellValue::from(patient));
    row.set(Column::VisitDate, CellValue::from(date));
    row.set(Column::ItemDescription, CellValue::from(description));
    row.set(Column::Quantity, CellValue::Number(1.0));
    row
}

#[test]
fn test_normalize_persist_load_roundtrip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");

    let table = Table::from_rows(vec![
        visit_row("Ana Li", "2025-01-02", "SUTURA SIMPLE"),
        visit_row("Ana Li", "2025-01-02", "GASA ESTERIL"),
        visit_row("Bo Chen", "2025-01-03", "CURACION"),
    ]);

    let mut store = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
    store.replace(RawTable::from_table(&table)).unwrap();
    store.persist().unwrap();

    // Loading re-decodes the colored file and normalizes it again.
    let reloaded = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
    assert_eq!(reloaded.table(), &table);

    // A second persist/load cycle is also stable.
    reloaded.persist().unwrap();
    let again = LedgerStore::open(&path, SchemaMode::Strict).unwrap();
    assert_eq!(again.table(), &table);
}

#[test]
fn test_add_entry_mirrors_to_file_and_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");

    let mut store = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
    store
        .replace(RawTable::from_table(&Table::from_rows(vec![
            visit_row("Ana Li", "2025-01-02", "CONSULTA"),
            visit_row("Bo Chen", "2025-01-03", "CONSULTA"),
        ])))
        .unwrap();
    store.persist().unwrap();

    let mut ctx = VisitContext::new(NonEmptyText::new("Ana Li").unwrap());
    ctx.diagnosis_name = "Cholera".into();
    let items = [
        LineItem {
            kind: ItemKind::Procedure,
            name: "SUTURA SIMPLE".into(),
            quantity: CellValue::Number(1.0),
        },
        LineItem {
            kind: ItemKind::Supply,
            name: "GASA ESTERIL".into(),
            quantity: CellValue::Text("2".into()),
        },
    ];
    let outcome = store
        .add_entry(&catalogs(), &ctx, &items, PatientPolicy::AllowNew)
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.position, 1);

    let reloaded = LedgerStore::open(&path, SchemaMode::Strict).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded.rows()[1].text(Column::ItemDescription), "SUTURA SIMPLE");
    assert_eq!(reloaded.rows()[1].text(Column::ItemCode), "P100");
    assert_eq!(reloaded.rows()[1].text(Column::PrimaryDiagnosis), "A00");
    // The new rows inherited the visit date from Ana Li's anchor row.
    assert_eq!(reloaded.rows()[2].text(Column::VisitDate), "2025-01-02");
    assert_eq!(reloaded.rows()[3].text(Column::PatientName), "Bo Chen");
}

#[test]
fn test_delete_positions_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");

    let mut store = LedgerStore::open(&path, SchemaMode::Lenient).unwrap();
    store
        .replace(RawTable::from_table(&Table::from_rows(vec![
            visit_row("p0", "d", "i0"),
            visit_row("p1", "d", "i1"),
            visit_row("p2", "d", "i2"),
            visit_row("p3", "d", "i3"),
            visit_row("p4", "d", "i4"),
        ])))
        .unwrap();
    store.persist().unwrap();

    let removed = store
        .remove(&BTreeSet::from([1usize, 3usize]))
        .unwrap();
    assert_eq!(removed, 2);

    let reloaded = LedgerStore::open(&path, SchemaMode::Strict).unwrap();
    let names: Vec<_> = reloaded
        .rows()
        .iter()
        .map(|r| r.text(Column::PatientName))
        .collect();
    assert_eq!(names, vec!["p0", "p2", "p4"]);
}
