//! # API REST
//!
//! REST API implementation for the registro billing ledger.
//!
//! Handles:
//! - HTTP endpoints with axum (paths and body shapes preserved from the
//!   browser front end's contract)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! All mutating endpoints serialize on one lock around the
//! [`LedgerStore`]: the store itself is single-writer by design, and
//! concurrent add/delete requests racing on positional indices was a known
//! defect of the previous generation.

#![warn(rust_2018_idioms)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Router,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use registro_core::{
    CatalogSet, Column, CoreConfig, LedgerError, LedgerStore, LineItem, PatientPolicy,
    VisitContext, workbook,
};
use registro_types::{CellValue, ItemKind, NonEmptyText};

/// Result cap for the `/search/...` endpoints.
const SEARCH_LIMIT: usize = 50;

/// Upload size cap. Ledger workbooks run to a few megabytes; this leaves
/// generous headroom while still bounding memory per request.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across REST API handlers.
///
/// The catalogs are immutable after startup; the store is the single
/// mutable resource and is guarded by one mutex.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<LedgerStore>>,
    catalogs: Arc<CatalogSet>,
    policy: PatientPolicy,
}

impl AppState {
    pub fn new(store: LedgerStore, catalogs: CatalogSet, policy: PatientPolicy) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            catalogs: Arc::new(catalogs),
            policy,
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, LedgerStore>, ApiError> {
        self.store.lock().map_err(|_| {
            tracing::error!("ledger store mutex poisoned");
            ApiError(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_owned(),
            )
        })
    }
}

/// Resolves the core configuration from environment variables.
///
/// Called once from the binaries before any request handling:
/// - `REGISTRO_DATA_FILE`: ledger file path (default: `data.xlsx`)
/// - `REGISTRO_CATALOG_DIR`: maestro workbook directory (default: `.`)
/// - `REGISTRO_SCHEMA_MODE`: `strict` (default) or `lenient`
/// - `REGISTRO_PATIENT_POLICY`: `allow-new` (default) or `require-existing`
pub fn config_from_env() -> anyhow::Result<CoreConfig> {
    let data_file = std::env::var("REGISTRO_DATA_FILE")
        .unwrap_or_else(|_| registro_core::config::DEFAULT_DATA_FILE.into());
    let catalog_dir = std::env::var("REGISTRO_CATALOG_DIR").unwrap_or_else(|_| ".".into());
    let schema_mode =
        registro_core::config::schema_mode_from_env_value(std::env::var("REGISTRO_SCHEMA_MODE").ok())?;
    let patient_policy = registro_core::config::patient_policy_from_env_value(
        std::env::var("REGISTRO_PATIENT_POLICY").ok(),
    )?;

    Ok(CoreConfig::new(
        data_file.into(),
        catalog_dir.into(),
        schema_mode,
        patient_policy,
    ))
}

/// Loads catalogs and the ledger per `cfg` and assembles the app state.
/// Failing to load either is fatal at startup.
pub fn build_state(cfg: &CoreConfig) -> anyhow::Result<AppState> {
    let catalogs = CatalogSet::load(cfg.catalog_dir())?;
    let store = LedgerStore::load(cfg)?;
    tracing::info!(
        file = %store.path().display(),
        rows = store.len(),
        "ledger loaded"
    );
    Ok(AppState::new(store, catalogs, cfg.patient_policy()))
}

// --------------------------
// Wire types
// --------------------------

/// One line item as submitted by the form.
#[derive(Debug, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct EntryItem {
    #[serde(default)]
    pub name: String,
    /// Code as displayed by the front end; the server re-resolves codes
    /// from the catalogs and ignores this field.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub quantity: i64,
}

/// Body of `POST /add/`. Field names are the front end's contract.
#[derive(Debug, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct NewEntry {
    #[serde(default)]
    pub paciente: String,
    #[serde(default)]
    pub diagnostico_name: String,
    #[serde(default)]
    pub diagnostico_code: String,
    #[serde(default)]
    pub observaciones: String,
    #[serde(default)]
    pub procedimientos: Vec<EntryItem>,
    #[serde(default)]
    pub medicamentos: Vec<EntryItem>,
    #[serde(default)]
    pub insumos: Vec<EntryItem>,
}

/// Body of `POST /delete/`: 0-based row positions in the current listing.
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct DeleteRows {
    pub ids: Vec<usize>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// A line item the insertion engine dropped, with the reason.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct SkippedItemRes {
    pub kind: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct AddRes {
    pub message: String,
    pub inserted: usize,
    pub skipped: Vec<SkippedItemRes>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct DiagnosticRes {
    pub name: String,
    pub code: String,
}

/// One catalog entry in a `/full/` dump.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct CatalogItemRes {
    pub name: String,
    pub code: String,
}

/// Error body, shaped like the previous backend's (`{"detail": ...}`) so
/// the front end's error handling keeps working.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct SyncDiagnosticQuery {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub query: String,
}

// --------------------------
// Error mapping
// --------------------------

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorRes { detail: self.1 })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::SchemaMismatch { .. }
            | LedgerError::NoItemsProvided
            | LedgerError::ItemCodeNotFound { .. }
            | LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LedgerError::PatientNotFound(_)
            | LedgerError::DiagnosisNotFound(_)
            | LedgerError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::MissingColumn { .. }
            | LedgerError::FileRead(_)
            | LedgerError::FileWrite(_)
            | LedgerError::SpreadsheetDecode(_)
            | LedgerError::CsvDecode(_)
            | LedgerError::SpreadsheetEncode(_)
            | LedgerError::CsvEncode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", err);
        }
        ApiError(status, err.to_string())
    }
}

fn bad_request(detail: impl Into<String>) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, detail.into())
}

// --------------------------
// Router
// --------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_file,
        get_data,
        sync_diagnostic,
        search_patients,
        search_diagnostics,
        search_procedures,
        search_medications,
        medications_full,
        procedures_full,
        patients_full,
        diagnostics_full,
        download_file,
        add_entry,
        delete_rows,
        save_file,
    ),
    components(schemas(
        EntryItem,
        NewEntry,
        DeleteRows,
        MessageRes,
        AddRes,
        SkippedItemRes,
        DiagnosticRes,
        CatalogItemRes,
        ErrorRes,
    ))
)]
struct ApiDoc;

/// Builds the application router with every endpoint, Swagger UI, and
/// permissive CORS (the front end is served from a different origin).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload/", post(upload_file))
        .route("/data/", get(get_data))
        .route("/sync/diagnostic/", get(sync_diagnostic))
        .route("/search/patients/", get(search_patients))
        .route("/search/diagnostics/", get(search_diagnostics))
        .route("/search/procedures/", get(search_procedures))
        .route("/search/medications/", get(search_medications))
        .route("/medications/full/", get(medications_full))
        .route("/procedures/full/", get(procedures_full))
        .route("/patients/full/", get(patients_full))
        .route("/diagnostics/full/", get(diagnostics_full))
        .route("/download/", get(download_file))
        .route("/add/", post(add_entry))
        .route("/delete/", post(delete_rows))
        .route("/save/", post(save_file))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Binds `addr` and serves the router until the process ends.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Registro REST API listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// --------------------------
// Handlers
// --------------------------

#[utoipa::path(
    post,
    path = "/upload/",
    responses(
        (status = 200, description = "Ledger replaced from the uploaded file", body = MessageRes),
        (status = 400, description = "Missing file field or wrong column count", body = ErrorRes),
        (status = 500, description = "Undecodable file", body = ErrorRes)
    )
)]
/// Replace the in-memory ledger from an uploaded spreadsheet or CSV.
///
/// The upload is decoded and normalized under the configured schema mode;
/// nothing is written to the backing file until the next mutating
/// operation or an explicit `/save/`.
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageRes>, ApiError> {
    let mut uploaded: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.xlsx").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;
            uploaded = Some((filename, bytes.to_vec()));
            break;
        }
    }
    let (filename, bytes) = uploaded.ok_or_else(|| bad_request("no \"file\" field in upload"))?;

    let raw = workbook::read_table_bytes(&filename, &bytes)?;
    let mut store = state.lock_store()?;
    store.replace(raw)?;
    tracing::info!(file = %filename, rows = store.len(), "ledger replaced from upload");

    Ok(Json(MessageRes {
        message: "File uploaded and loaded successfully.".to_owned(),
    }))
}

#[utoipa::path(
    get,
    path = "/data/",
    responses(
        (status = 200, description = "Every ledger row keyed by column header, plus a positional id")
    )
)]
/// Dump the current ledger as one JSON object per row.
///
/// Keys are the canonical column headers (newlines included, as in the
/// file); empty cells and non-finite numbers are `null`. The `id` field is
/// the row's position at the time of the call and is what `/delete/`
/// consumes; it is not a stable identity.
async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let store = state.lock_store()?;
    let records = store
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut record = serde_json::Map::new();
            for column in Column::ALL {
                let value = serde_json::to_value(row.get(column))
                    .unwrap_or(serde_json::Value::Null);
                record.insert(column.header().to_owned(), value);
            }
            record.insert("id".to_owned(), serde_json::Value::from(idx));
            serde_json::Value::Object(record)
        })
        .collect();
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/sync/diagnostic/",
    params(SyncDiagnosticQuery),
    responses(
        (status = 200, description = "Resolved diagnosis", body = DiagnosticRes),
        (status = 400, description = "Neither name nor code given", body = ErrorRes),
        (status = 404, description = "No matching diagnosis", body = ErrorRes)
    )
)]
/// Resolve a diagnosis catalog entry by exact name or code.
async fn sync_diagnostic(
    State(state): State<AppState>,
    Query(params): Query<SyncDiagnosticQuery>,
) -> Result<Json<DiagnosticRes>, ApiError> {
    let entry = match (
        params.name.as_deref().filter(|s| !s.trim().is_empty()),
        params.code.as_deref().filter(|s| !s.trim().is_empty()),
    ) {
        (Some(name), _) => state.catalogs.diagnoses.find_by_name(name),
        (None, Some(code)) => state.catalogs.diagnoses.find_by_code(code),
        (None, None) => return Err(bad_request("Provide either name or code")),
    };
    let entry = entry.ok_or(ApiError(
        StatusCode::NOT_FOUND,
        "Diagnostic not found".to_owned(),
    ))?;
    Ok(Json(DiagnosticRes {
        name: entry.name.clone(),
        code: entry.code.clone(),
    }))
}

#[utoipa::path(
    get,
    path = "/search/patients/",
    params(SearchQuery),
    responses(
        (status = 200, description = "Distinct patient names matching the query")
    )
)]
/// Substring search over the distinct patient names in the ledger.
async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let needle = params.query.to_lowercase();
    let store = state.lock_store()?;
    let hits = store
        .table()
        .distinct_patients()
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(SEARCH_LIMIT)
        .collect();
    Ok(Json(hits))
}

#[utoipa::path(
    get,
    path = "/search/diagnostics/",
    params(SearchQuery),
    responses((status = 200, description = "Diagnosis names matching the query"))
)]
/// Substring search over diagnosis names.
async fn search_diagnostics(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    Json(search_catalog(&state.catalogs.diagnoses, &params.query))
}

#[utoipa::path(
    get,
    path = "/search/procedures/",
    params(SearchQuery),
    responses((status = 200, description = "Procedure descriptions matching the query"))
)]
/// Substring search over procedure descriptions.
async fn search_procedures(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    Json(search_catalog(&state.catalogs.procedures, &params.query))
}

#[utoipa::path(
    get,
    path = "/search/medications/",
    params(SearchQuery),
    responses((status = 200, description = "Medication descriptions matching the query"))
)]
/// Substring search over medication descriptions (with presentation).
async fn search_medications(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    Json(search_catalog(&state.catalogs.medications, &params.query))
}

fn search_catalog(catalog: &registro_core::Catalog, query: &str) -> Vec<String> {
    catalog
        .search(query, SEARCH_LIMIT)
        .into_iter()
        .map(|e| e.name.clone())
        .collect()
}

#[utoipa::path(
    get,
    path = "/medications/full/",
    responses((status = 200, description = "Full medication catalog", body = [CatalogItemRes]))
)]
/// Full medication catalog dump (static for the process lifetime).
async fn medications_full(State(state): State<AppState>) -> Json<Vec<CatalogItemRes>> {
    Json(dump_catalog(&state.catalogs.medications))
}

#[utoipa::path(
    get,
    path = "/procedures/full/",
    responses((status = 200, description = "Full procedure catalog", body = [CatalogItemRes]))
)]
/// Full procedure catalog dump (static for the process lifetime).
async fn procedures_full(State(state): State<AppState>) -> Json<Vec<CatalogItemRes>> {
    Json(dump_catalog(&state.catalogs.procedures))
}

#[utoipa::path(
    get,
    path = "/diagnostics/full/",
    responses((status = 200, description = "Full diagnosis catalog", body = [CatalogItemRes]))
)]
/// Full diagnosis catalog dump (static for the process lifetime).
async fn diagnostics_full(State(state): State<AppState>) -> Json<Vec<CatalogItemRes>> {
    Json(dump_catalog(&state.catalogs.diagnoses))
}

fn dump_catalog(catalog: &registro_core::Catalog) -> Vec<CatalogItemRes> {
    catalog
        .entries()
        .iter()
        .map(|e| CatalogItemRes {
            name: e.name.clone(),
            code: e.code.clone(),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/patients/full/",
    responses((status = 200, description = "Sorted distinct patient names"))
)]
/// Sorted distinct patient names, computed live from the current ledger.
///
/// Unlike the catalog dumps this is never cached: the ledger mutates, and
/// the stale-cache behaviour of the previous generation was a defect.
async fn patients_full(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let store = state.lock_store()?;
    let mut names = store.table().distinct_patients();
    names.sort();
    Ok(Json(names))
}

#[utoipa::path(
    get,
    path = "/download/",
    responses(
        (status = 200, description = "The persisted ledger file"),
        (status = 404, description = "No file has been saved yet", body = ErrorRes)
    )
)]
/// Download the persisted ledger file.
async fn download_file(State(state): State<AppState>) -> Result<Response, ApiError> {
    let store = state.lock_store()?;
    let bytes = store.read_file()?;
    let filename = store
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("data.xlsx")
        .to_owned();
    drop(store);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_owned(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/add/",
    request_body = NewEntry,
    responses(
        (status = 200, description = "Rows inserted and file rewritten", body = AddRes),
        (status = 400, description = "No valid items, or bad input", body = ErrorRes),
        (status = 404, description = "Unknown patient or diagnosis", body = ErrorRes),
        (status = 500, description = "Persist failure", body = ErrorRes)
    )
)]
/// Run the row-insertion engine for one visit.
///
/// Builds a visit context from the body, validates the diagnosis against
/// the catalog, resolves procedure and medication codes, splices the new
/// rows after the patient's last existing row, persists the file, and
/// re-applies the visit color banding. Items failing catalog lookup are
/// skipped and reported in the response rather than failing the batch.
async fn add_entry(
    State(state): State<AppState>,
    Json(entry): Json<NewEntry>,
) -> Result<Json<AddRes>, ApiError> {
    let patient = NonEmptyText::new(&entry.paciente)
        .map_err(|_| bad_request("a patient name is required"))?;

    let mut ctx = VisitContext::new(patient);
    ctx.diagnosis_name = entry.diagnostico_name;
    ctx.diagnosis_code = entry.diagnostico_code;
    ctx.observations = entry.observaciones;

    let items: Vec<LineItem> = collect_items(ItemKind::Procedure, entry.procedimientos)
        .chain(collect_items(ItemKind::Medication, entry.medicamentos))
        .chain(collect_items(ItemKind::Supply, entry.insumos))
        .collect();

    let mut store = state.lock_store()?;
    let outcome = store.add_entry(&state.catalogs, &ctx, &items, state.policy)?;

    Ok(Json(AddRes {
        message: "Entry added successfully!".to_owned(),
        inserted: outcome.inserted,
        skipped: outcome
            .skipped
            .into_iter()
            .map(|s| SkippedItemRes {
                kind: s.kind.to_string(),
                name: s.name,
                reason: s.reason,
            })
            .collect(),
    }))
}

fn collect_items(kind: ItemKind, items: Vec<EntryItem>) -> impl Iterator<Item = LineItem> {
    items.into_iter().map(move |item| LineItem {
        kind,
        name: item.name,
        quantity: CellValue::Number(item.quantity as f64),
    })
}

#[utoipa::path(
    post,
    path = "/delete/",
    request_body = DeleteRows,
    responses(
        (status = 200, description = "Rows removed and file rewritten", body = MessageRes),
        (status = 500, description = "Persist failure", body = ErrorRes)
    )
)]
/// Remove rows by the positional ids from the most recent `/data/` call.
async fn delete_rows(
    State(state): State<AppState>,
    Json(req): Json<DeleteRows>,
) -> Result<Json<MessageRes>, ApiError> {
    let positions: BTreeSet<usize> = req.ids.into_iter().collect();
    let mut store = state.lock_store()?;
    let removed = store.remove(&positions)?;
    tracing::info!(removed, remaining = store.len(), "rows deleted");
    Ok(Json(MessageRes {
        message: "Filas eliminadas exitosamente.".to_owned(),
    }))
}

#[utoipa::path(
    post,
    path = "/save/",
    responses(
        (status = 200, description = "Ledger persisted", body = MessageRes),
        (status = 500, description = "Persist failure", body = ErrorRes)
    )
)]
/// Force-persist the in-memory ledger to the backing file.
async fn save_file(State(state): State<AppState>) -> Result<Json<MessageRes>, ApiError> {
    let store = state.lock_store()?;
    store.persist()?;
    Ok(Json(MessageRes {
        message: "File saved successfully.".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_decodes_front_end_body() {
        let body = r#"{
            "paciente": "Ana Li",
            "diagnostico_name": "Cholera",
            "diagnostico_code": "A00",
            "procedimientos": [{"name": "SUTURA SIMPLE", "code": "P100", "quantity": 1}],
            "medicamentos": [],
            "insumos": [{"name": "GASA ESTERIL", "quantity": 2}]
        }"#;
        let entry: NewEntry = serde_json::from_str(body).unwrap();
        assert_eq!(entry.paciente, "Ana Li");
        assert_eq!(entry.procedimientos.len(), 1);
        assert_eq!(entry.procedimientos[0].quantity, 1);
        assert_eq!(entry.insumos[0].name, "GASA ESTERIL");
        // Omitted fields default.
        assert!(entry.observaciones.is_empty());
    }

    #[test]
    fn test_item_kinds_map_to_line_items() {
        let items: Vec<LineItem> = collect_items(
            ItemKind::Supply,
            vec![EntryItem {
                name: "GASA".into(),
                code: String::new(),
                quantity: 2,
            }],
        )
        .collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ItemKind::Supply);
        assert_eq!(items[0].quantity, CellValue::Number(2.0));
    }

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = LedgerError::NoItemsProvided.into();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        let err: ApiError = LedgerError::DiagnosisNotFound("x".into()).into();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        let err: ApiError =
            LedgerError::ResourceNotFound(std::path::PathBuf::from("data.xlsx")).into();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        let err: ApiError = LedgerError::SchemaMismatch {
            expected: 45,
            got: 2,
        }
        .into();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
