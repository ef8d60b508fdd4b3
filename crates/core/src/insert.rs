//! The row-insertion engine.
//!
//! One "add entry" action turns a visit context plus a batch of line items
//! into ledger rows and splices them in next to the patient's existing
//! rows. Validation (patient, diagnosis, item codes) happens entirely
//! before the table is touched; a failed call never leaves a partial
//! mutation behind.

use registro_types::{CellValue, ItemKind, NonEmptyText};

use crate::catalog::{Catalog, CatalogSet};
use crate::error::{LedgerError, LedgerResult};
use crate::table::{Column, Row, Table};

/// Whether an entry may be added for a patient with no prior ledger rows.
///
/// The clinic's desktop workflow requires the patient to exist in the
/// file; the web workflow accepts new patients and appends their first
/// visit at the end of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientPolicy {
    RequireExisting,
    AllowNew,
}

/// One billed line item as captured by the form.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub kind: ItemKind,
    /// Display name; for procedures and medications this must match a
    /// catalog description exactly (case-insensitive).
    pub name: String,
    /// Stored as given, no numeric validation.
    pub quantity: CellValue,
}

/// Fields shared by every row generated for one visit.
///
/// Fields left empty are inherited from the patient's most recent ledger
/// row where that makes sense (dependency code, visit date, cedula);
/// everything else lands in the new rows verbatim.
#[derive(Debug, Clone)]
pub struct VisitContext {
    pub patient: NonEmptyText,
    pub diagnosis_name: String,
    /// The code the clerk typed, kept verbatim in the presumptive
    /// diagnosis column. Distinct from the resolved primary code.
    pub diagnosis_code: String,
    pub dependency_code: String,
    pub visit_date: String,
    pub cedula: String,
    pub service_type: String,
    pub observations: String,
    pub admission_date: String,
    pub discharge_date: String,
    /// Up to five secondary diagnosis codes; extras are ignored.
    pub secondary_diagnoses: Vec<String>,
}

impl VisitContext {
    /// A context with only the patient set.
    pub fn new(patient: NonEmptyText) -> Self {
        Self {
            patient,
            diagnosis_name: String::new(),
            diagnosis_code: String::new(),
            dependency_code: String::new(),
            visit_date: String::new(),
            cedula: String::new(),
            service_type: String::new(),
            observations: String::new(),
            admission_date: String::new(),
            discharge_date: String::new(),
            secondary_diagnoses: Vec::new(),
        }
    }
}

/// A line item dropped during an add because its catalog lookup failed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkippedItem {
    pub kind: ItemKind,
    pub name: String,
    pub reason: String,
}

/// Result of a successful add: how many rows landed, where, and which
/// items were skipped.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub inserted: usize,
    pub position: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Adds one visit's line items to the ledger.
///
/// Follows the established insertion rule: new rows land immediately
/// after the **last** existing row whose patient name matches
/// (case-insensitive, trimmed), preserving their own order; a patient
/// with no rows appends at the end (policy permitting). Items whose
/// catalog lookup fails are skipped and reported rather than aborting
/// the batch. If no valid row results, the call fails with
/// [`LedgerError::NoItemsProvided`] and the table is untouched.
pub fn add_entry(
    table: &mut Table,
    catalogs: &CatalogSet,
    ctx: &VisitContext,
    items: &[LineItem],
    policy: PatientPolicy,
) -> LedgerResult<AddOutcome> {
    let anchor = table
        .rows()
        .iter()
        .rposition(|row| ctx.patient.matches(&row.text(Column::PatientName)));

    if anchor.is_none() && policy == PatientPolicy::RequireExisting {
        return Err(LedgerError::PatientNotFound(ctx.patient.to_string()));
    }

    let primary_code = resolve_diagnosis(
        &catalogs.diagnoses,
        &ctx.diagnosis_name,
        &ctx.diagnosis_code,
    )?;

    let base = build_base_row(table, ctx, anchor, &primary_code);

    let mut new_rows = Vec::new();
    let mut skipped = Vec::new();
    for item in items {
        let name = item.name.trim();
        if name.is_empty() {
            continue;
        }
        match resolve_item_code(catalogs, item.kind, name) {
            Ok(code) => {
                let mut row = base.clone();
                row.set(Column::ItemDescription, CellValue::from(name));
                row.set(
                    Column::ItemCode,
                    code.map(CellValue::from).unwrap_or(CellValue::Empty),
                );
                row.set(Column::Quantity, item.quantity.clone());
                new_rows.push(row);
            }
            Err(err @ LedgerError::ItemCodeNotFound { .. }) => {
                tracing::warn!(kind = %item.kind, name, "skipping line item: {}", err);
                skipped.push(SkippedItem {
                    kind: item.kind,
                    name: name.to_owned(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    if new_rows.is_empty() {
        return Err(LedgerError::NoItemsProvided);
    }

    let position = anchor.map(|a| a + 1).unwrap_or(table.len());
    let inserted = new_rows.len();
    table.insert_rows(position, new_rows);

    Ok(AddOutcome {
        inserted,
        position,
        skipped,
    })
}

/// Resolves the primary diagnosis code: the name wins when it matches the
/// catalog; a typed code is the fallback; neither resolving is an error.
fn resolve_diagnosis(diagnoses: &Catalog, name: &str, code: &str) -> LedgerResult<String> {
    let name = name.trim();
    let code = code.trim();

    if !name.is_empty() {
        if let Some(entry) = diagnoses.find_by_name(name) {
            return Ok(entry.code.clone());
        }
        if !code.is_empty() {
            if let Some(entry) = diagnoses.find_by_code(code) {
                return Ok(entry.code.clone());
            }
        }
        return Err(LedgerError::DiagnosisNotFound(name.to_owned()));
    }
    if !code.is_empty() {
        return diagnoses
            .find_by_code(code)
            .map(|entry| entry.code.clone())
            .ok_or_else(|| LedgerError::DiagnosisNotFound(code.to_owned()));
    }
    Err(LedgerError::DiagnosisNotFound("(none provided)".to_owned()))
}

/// Looks up the catalog code for one item, or `None` for supplies.
fn resolve_item_code(
    catalogs: &CatalogSet,
    kind: ItemKind,
    name: &str,
) -> LedgerResult<Option<String>> {
    let catalog = match kind {
        ItemKind::Procedure => &catalogs.procedures,
        ItemKind::Medication => &catalogs.medications,
        ItemKind::Supply => return Ok(None),
    };
    catalog
        .find_by_name(name)
        .map(|entry| Some(entry.code.clone()))
        .ok_or_else(|| LedgerError::ItemCodeNotFound {
            kind,
            name: name.to_owned(),
        })
}

/// Builds the shared row every line item starts from: visit-context
/// fields, the resolved primary diagnosis, and, for fields the clerk
/// left blank, values inherited from the patient's last ledger row.
fn build_base_row(
    table: &Table,
    ctx: &VisitContext,
    anchor: Option<usize>,
    primary_code: &str,
) -> Row {
    let mut base = Row::empty();
    base.set(Column::PatientName, CellValue::from(ctx.patient.as_str()));
    base.set(Column::DependencyCode, CellValue::from(ctx.dependency_code.as_str()));
    base.set(Column::VisitDate, CellValue::from(ctx.visit_date.as_str()));
    base.set(Column::Cedula, CellValue::from(ctx.cedula.as_str()));
    base.set(Column::ServiceType, CellValue::from(ctx.service_type.as_str()));
    base.set(Column::Observations, CellValue::from(ctx.observations.as_str()));
    base.set(Column::AdmissionDate, CellValue::from(ctx.admission_date.as_str()));
    base.set(Column::DischargeDate, CellValue::from(ctx.discharge_date.as_str()));
    base.set(Column::PrimaryDiagnosis, CellValue::from(primary_code));
    base.set(
        Column::PresumptiveDiagnosis,
        CellValue::from(ctx.diagnosis_code.trim()),
    );
    for (column, code) in Column::secondary_diagnoses()
        .into_iter()
        .zip(ctx.secondary_diagnoses.iter())
    {
        base.set(column, CellValue::from(code.as_str()));
    }

    if let Some(a) = anchor {
        let anchor_row = &table.rows()[a];
        for column in [Column::DependencyCode, Column::VisitDate, Column::Cedula] {
            if base.get(column).is_empty() {
                base.set(column, anchor_row.get(column).clone());
            }
        }
    }

    base
}
