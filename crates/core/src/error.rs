use registro_types::ItemKind;

/// Error taxonomy for ledger operations.
///
/// Startup failures (catalog and schema loading) are fatal to the process;
/// per-request failures carry a description for the caller. Color-banding
/// problems are deliberately absent here: a save that cannot be coloured
/// still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("expected {expected} columns but the file has {got}")]
    SchemaMismatch { expected: usize, got: usize },
    #[error("patient not found in the ledger: {0}")]
    PatientNotFound(String),
    #[error("no matching diagnosis for: {0}")]
    DiagnosisNotFound(String),
    #[error("no {kind} code found for: {name}")]
    ItemCodeNotFound { kind: ItemKind, name: String },
    #[error("no procedures, medications or supplies were provided")]
    NoItemsProvided,
    #[error("column {header:?} missing from {file}")]
    MissingColumn { file: String, header: String },
    #[error("ledger file not found: {0}")]
    ResourceNotFound(std::path::PathBuf),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to decode spreadsheet: {0}")]
    SpreadsheetDecode(calamine::Error),
    #[error("failed to decode CSV: {0}")]
    CsvDecode(csv::Error),
    #[error("failed to encode spreadsheet: {0}")]
    SpreadsheetEncode(rust_xlsxwriter::XlsxError),
    #[error("failed to encode CSV: {0}")]
    CsvEncode(csv::Error),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
