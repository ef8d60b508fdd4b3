//! Terminal interface to the registro ledger.
//!
//! Covers the clerk operations without the browser front end: inspect the
//! ledger, add a visit's line items, delete rows, query the catalogs, and
//! rewrite foreign files into the canonical schema. Unlike the web API,
//! `add` requires the patient to already exist in the file, matching the
//! desk workflow where entries are only appended to known patients.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use registro_core::{
    banding, schema, workbook, CatalogSet, Column, LedgerStore, LineItem, PatientPolicy,
    SchemaMode, VisitContext,
};
use registro_types::{CellValue, ItemKind, NonEmptyText};

#[derive(Parser)]
#[command(name = "registro")]
#[command(about = "Clinic billing ledger CLI")]
struct Cli {
    /// Ledger data file
    #[arg(long, default_value = "data.xlsx", global = true)]
    file: PathBuf,

    /// Directory holding the maestro catalog workbooks
    #[arg(long, default_value = ".", global = true)]
    catalog_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the ledger: row count and patients
    Show,
    /// Add one visit's line items for an existing patient
    Add {
        /// Patient name (must already appear in the ledger)
        #[arg(long)]
        patient: String,
        /// Diagnosis name, matched exactly against the catalog
        #[arg(long, default_value = "")]
        diagnosis: String,
        /// Diagnosis code, used when the name does not resolve
        #[arg(long, default_value = "")]
        diagnosis_code: String,
        /// Observations copied into every new row
        #[arg(long, default_value = "")]
        observations: String,
        /// Visit date; inherited from the patient's last row when omitted
        #[arg(long, default_value = "")]
        date: String,
        /// Service type column value (e.g. EMERGENCIA)
        #[arg(long, default_value = "")]
        service_type: String,
        /// Procedure as NAME or NAME:QTY (repeatable)
        #[arg(long = "procedure")]
        procedures: Vec<String>,
        /// Medication as NAME or NAME:QTY (repeatable)
        #[arg(long = "medication")]
        medications: Vec<String>,
        /// Supply as NAME or NAME:QTY (repeatable)
        #[arg(long = "supply")]
        supplies: Vec<String>,
    },
    /// Delete rows by their 0-based positions in the current ordering
    Delete {
        positions: Vec<usize>,
    },
    /// Search a catalog (procedures, medications, diagnostics) or the
    /// ledger's patients by substring
    Search {
        catalog: String,
        query: String,
    },
    /// Rewrite any spreadsheet into the canonical column schema
    Normalize {
        input: PathBuf,
        /// Destination; defaults to rewriting the input in place
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Re-apply visit color banding to a saved file
    Band {
        target: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show => {
            let store = LedgerStore::open(&cli.file, SchemaMode::Lenient)?;
            println!("{}: {} rows", cli.file.display(), store.len());
            for patient in store.table().distinct_patients() {
                let count = store
                    .rows()
                    .iter()
                    .filter(|r| r.text(Column::PatientName) == patient)
                    .count();
                println!("  {} ({} rows)", patient, count);
            }
        }
        Commands::Add {
            patient,
            diagnosis,
            diagnosis_code,
            observations,
            date,
            service_type,
            procedures,
            medications,
            supplies,
        } => {
            let catalogs = CatalogSet::load(&cli.catalog_dir)?;
            let mut store = LedgerStore::open(&cli.file, SchemaMode::Lenient)?;

            let mut ctx = VisitContext::new(NonEmptyText::new(&patient)?);
            ctx.diagnosis_name = diagnosis;
            ctx.diagnosis_code = diagnosis_code;
            ctx.observations = observations;
            ctx.visit_date = date;
            ctx.service_type = service_type;

            let mut items = Vec::new();
            collect_items(&mut items, ItemKind::Procedure, &procedures);
            collect_items(&mut items, ItemKind::Medication, &medications);
            collect_items(&mut items, ItemKind::Supply, &supplies);

            let outcome =
                store.add_entry(&catalogs, &ctx, &items, PatientPolicy::RequireExisting)?;
            println!(
                "Inserted {} row(s) at position {}.",
                outcome.inserted, outcome.position
            );
            for skipped in outcome.skipped {
                eprintln!("Skipped {}: {}", skipped.name, skipped.reason);
            }
        }
        Commands::Delete { positions } => {
            let mut store = LedgerStore::open(&cli.file, SchemaMode::Lenient)?;
            let positions: BTreeSet<usize> = positions.into_iter().collect();
            let removed = store.remove(&positions)?;
            println!("Removed {} row(s), {} remain.", removed, store.len());
        }
        Commands::Search { catalog, query } => {
            let results: Vec<String> = match catalog.as_str() {
                "patients" => {
                    let store = LedgerStore::open(&cli.file, SchemaMode::Lenient)?;
                    let needle = query.to_lowercase();
                    store
                        .table()
                        .distinct_patients()
                        .into_iter()
                        .filter(|n| n.to_lowercase().contains(&needle))
                        .collect()
                }
                "procedures" | "medications" | "diagnostics" => {
                    let catalogs = CatalogSet::load(&cli.catalog_dir)?;
                    let cat = match catalog.as_str() {
                        "procedures" => &catalogs.procedures,
                        "medications" => &catalogs.medications,
                        _ => &catalogs.diagnoses,
                    };
                    cat.search(&query, 50)
                        .into_iter()
                        .map(|e| format!("{}  [{}]", e.name, e.code))
                        .collect()
                }
                other => anyhow::bail!(
                    "unknown catalog {:?} (expected patients, procedures, medications or diagnostics)",
                    other
                ),
            };
            if results.is_empty() {
                println!("No matches.");
            } else {
                for line in results {
                    println!("{}", line);
                }
            }
        }
        Commands::Normalize { input, output } => {
            let raw = workbook::read_table(&input)?;
            let table = schema::normalize(raw, SchemaMode::Lenient)?;
            let destination = output.unwrap_or_else(|| input.clone());
            let fills = banding::row_fills(&table, &banding::DEFAULT_PALETTE);
            workbook::write_xlsx(&destination, &table, Some(&fills))?;
            println!(
                "Wrote {} row(s) in canonical schema to {}.",
                table.len(),
                destination.display()
            );
        }
        Commands::Band { target } => {
            if banding::apply_to_file(&target, &banding::DEFAULT_PALETTE)? {
                println!("Recolored {}.", target.display());
            } else {
                println!("Coloring skipped for {}.", target.display());
            }
        }
    }

    Ok(())
}

/// Parses `NAME` or `NAME:QTY` item specs; a missing or non-numeric
/// suffix means quantity 1.
fn collect_items(items: &mut Vec<LineItem>, kind: ItemKind, specs: &[String]) {
    for spec in specs {
        let (name, quantity) = match spec.rsplit_once(':') {
            Some((name, qty)) => match qty.trim().parse::<f64>() {
                Ok(q) => (name.to_owned(), CellValue::Number(q)),
                Err(_) => (spec.clone(), CellValue::Number(1.0)),
            },
            None => (spec.clone(), CellValue::Number(1.0)),
        };
        items.push(LineItem {
            kind,
            name,
            quantity,
        });
    }
}
