//! Read-only reference catalogs: procedures, medications, diagnoses.
//!
//! The three maestro workbooks are loaded once at startup and never change
//! for the process lifetime, so lookups need no synchronization. A failure
//! to load any of them is fatal: the service cannot validate entries
//! without its reference data.

use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::schema::RawTable;
use crate::workbook;

/// Maestro workbook filenames, as shipped with the clinic install.
pub const PROCEDURES_FILE: &str = "maestro_procedimientos.xlsx";
pub const MEDICATIONS_FILE: &str = "maestro_medicamentos.xlsx";
pub const DIAGNOSES_FILE: &str = "maestro_diagnosticos.xlsx";

/// One catalog entry: a billing code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
}

/// An immutable lookup table keyed by exact code and searchable by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact name match, trimmed and case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.trim().to_lowercase() == wanted)
    }

    /// Exact code match on the code rendered as text.
    pub fn find_by_code(&self, code: &str) -> Option<&CatalogEntry> {
        let wanted = code.trim();
        self.entries.iter().find(|e| e.code == wanted)
    }

    /// Case-insensitive substring search over names, capped at `limit`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }
}

/// The three clinic catalogs, loaded together at startup.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub procedures: Catalog,
    pub medications: Catalog,
    pub diagnoses: Catalog,
}

impl CatalogSet {
    /// Loads all three maestro workbooks from `dir`.
    pub fn load(dir: &Path) -> LedgerResult<Self> {
        let procedures = load_catalog(
            &dir.join(PROCEDURES_FILE),
            &["DESCRIPCIÓN", "DESCRIPCION"],
            None,
        )?;
        let medications = load_catalog(
            &dir.join(MEDICATIONS_FILE),
            &["DESCRIPCIÓN", "DESCRIPCION"],
            Some(&["PRESENTACION", "PRESENTACIÓN"]),
        )?;
        let diagnoses = load_catalog(&dir.join(DIAGNOSES_FILE), &["NOMBRE"], None)?;

        tracing::info!(
            procedures = procedures.len(),
            medications = medications.len(),
            diagnoses = diagnoses.len(),
            "reference catalogs loaded"
        );

        Ok(Self {
            procedures,
            medications,
            diagnoses,
        })
    }
}

/// Accent drift exists across maestro generations (`CODIGO`/`CÓDIGO`), so
/// every header lookup goes through a candidate list.
const CODE_HEADERS: [&str; 2] = ["CÓDIGO", "CODIGO"];

fn find_header(raw: &RawTable, candidates: &[&str]) -> Option<usize> {
    raw.headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.trim() == *c))
}

/// Reads one maestro workbook into a [`Catalog`].
///
/// When `presentation_headers` is given (medications), the entry name is
/// the description concatenated with the presentation, which is the string
/// both generations of the front end search and match against.
fn load_catalog(
    path: &Path,
    name_headers: &[&str],
    presentation_headers: Option<&[&str]>,
) -> LedgerResult<Catalog> {
    let raw = workbook::read_table(path)?;
    let file = path.display().to_string();

    let code_idx = find_header(&raw, &CODE_HEADERS).ok_or_else(|| LedgerError::MissingColumn {
        file: file.clone(),
        header: CODE_HEADERS[0].to_owned(),
    })?;
    let name_idx = find_header(&raw, name_headers).ok_or_else(|| LedgerError::MissingColumn {
        file: file.clone(),
        header: name_headers[0].to_owned(),
    })?;
    let presentation_idx = presentation_headers.and_then(|hs| find_header(&raw, hs));

    let mut entries = Vec::with_capacity(raw.rows.len());
    for cells in &raw.rows {
        let name = cells.get(name_idx).map(|c| c.as_text()).unwrap_or_default();
        if name.trim().is_empty() {
            continue;
        }
        let code = cells.get(code_idx).map(|c| c.as_text()).unwrap_or_default();
        let name = match presentation_idx {
            Some(p) => {
                let presentation = cells.get(p).map(|c| c.as_text()).unwrap_or_default();
                if presentation.trim().is_empty() {
                    name
                } else {
                    format!("{} {}", name, presentation)
                }
            }
            None => name,
        };
        entries.push(CatalogEntry { code, name });
    }

    Ok(Catalog::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use registro_types::CellValue;

    fn diagnoses() -> Catalog {
        Catalog::from_entries(vec![
            CatalogEntry {
                code: "A00".into(),
                name: "Cholera".into(),
            },
            CatalogEntry {
                code: "J03.9".into(),
                name: "Acute tonsillitis, unspecified".into(),
            },
        ])
    }

    #[test]
    fn test_find_by_code() {
        let cat = diagnoses();
        assert_eq!(cat.find_by_code("A00").unwrap().name, "Cholera");
        assert_eq!(cat.find_by_code(" A00 ").unwrap().name, "Cholera");
        assert!(cat.find_by_code("Z99").is_none());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let cat = diagnoses();
        assert_eq!(cat.find_by_name("cholera").unwrap().code, "A00");
        assert_eq!(cat.find_by_name("  CHOLERA ").unwrap().code, "A00");
        assert!(cat.find_by_name("cholerae").is_none());
    }

    #[test]
    fn test_search_substring_capped() {
        let cat = Catalog::from_entries(
            (0..80)
                .map(|i| CatalogEntry {
                    code: format!("{:03}", i),
                    name: format!("PARACETAMOL {} MG", i),
                })
                .collect(),
        );
        let hits = cat.search("paracetamol", 50);
        assert_eq!(hits.len(), 50);
        let hits = cat.search("PARACETAMOL 7", 50);
        assert!(hits.iter().all(|e| e.name.contains("PARACETAMOL 7")));
    }

    #[test]
    fn test_load_catalog_accent_tolerant_code_header() {
        // Maestro with the unaccented CODIGO spelling and numeric codes.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maestro_diagnosticos.xlsx");
        let raw = RawTable {
            headers: vec!["CODIGO".into(), "NOMBRE".into()],
            rows: vec![
                vec![CellValue::Number(100.0), CellValue::from("Cholera")],
                vec![CellValue::Empty, CellValue::Empty],
            ],
        };
        workbook::write_raw_xlsx(&path, &raw, None).unwrap();

        let cat = load_catalog(&path, &["NOMBRE"], None).unwrap();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.find_by_code("100").unwrap().name, "Cholera");
    }

    #[test]
    fn test_load_catalog_missing_name_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maestro_procedimientos.xlsx");
        let raw = RawTable {
            headers: vec!["CÓDIGO".into(), "WRONG".into()],
            rows: vec![],
        };
        workbook::write_raw_xlsx(&path, &raw, None).unwrap();

        let err = load_catalog(&path, &["DESCRIPCIÓN", "DESCRIPCION"], None).unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumn { .. }));
    }

    #[test]
    fn test_medication_name_concatenates_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maestro_medicamentos.xlsx");
        let raw = RawTable {
            headers: vec![
                "CÓDIGO".into(),
                "DESCRIPCIÓN".into(),
                "PRESENTACION".into(),
            ],
            rows: vec![vec![
                CellValue::from("M01"),
                CellValue::from("IBUPROFENO 400 MG"),
                CellValue::from("TABLETA"),
            ]],
        };
        workbook::write_raw_xlsx(&path, &raw, None).unwrap();

        let cat = load_catalog(
            &path,
            &["DESCRIPCIÓN", "DESCRIPCION"],
            Some(&["PRESENTACION", "PRESENTACIÓN"]),
        )
        .unwrap();
        assert_eq!(
            cat.find_by_code("M01").unwrap().name,
            "IBUPROFENO 400 MG TABLETA"
        );
    }
}
