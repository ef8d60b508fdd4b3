//! Spreadsheet and CSV decode/encode for the ledger and catalogs.
//!
//! Reading goes through calamine (any Excel flavour); writing produces
//! `.xlsx` via rust_xlsxwriter, which is also where the visit color bands
//! are painted, since the whole file is rewritten on every save. CSV
//! ledgers are supported for load and save; they simply cannot carry
//! fills. CSV cells are kept as text on decode; parsing them numerically
//! would strip leading zeros from cedulas and billing codes.

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Color, Format, Workbook};

use crate::error::{LedgerError, LedgerResult};
use crate::schema::RawTable;
use crate::table::{Column, Table};
use registro_types::CellValue;

pub(crate) fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Decodes the first worksheet (or a CSV file) into a raw table.
pub fn read_table(path: &Path) -> LedgerResult<RawTable> {
    if is_csv(path) {
        let file = std::fs::File::open(path).map_err(LedgerError::FileRead)?;
        return read_csv(file);
    }
    let mut workbook = open_workbook_auto(path).map_err(LedgerError::SpreadsheetDecode)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(result) => result.map_err(LedgerError::SpreadsheetDecode)?,
        None => return Ok(RawTable::default()),
    };
    Ok(range_to_raw(&range))
}

/// Decodes an uploaded file from memory; `filename` picks the codec.
pub fn read_table_bytes(filename: &str, bytes: &[u8]) -> LedgerResult<RawTable> {
    if is_csv(Path::new(filename)) {
        return read_csv(Cursor::new(bytes));
    }
    let mut workbook = calamine::Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| LedgerError::SpreadsheetDecode(calamine::Error::Xlsx(e)))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(result) => {
            result.map_err(|e| LedgerError::SpreadsheetDecode(calamine::Error::Xlsx(e)))?
        }
        None => return Ok(RawTable::default()),
    };
    Ok(range_to_raw(&range))
}

fn range_to_raw(range: &calamine::Range<Data>) -> RawTable {
    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => return RawTable::default(),
    };
    let rows = rows_iter
        .map(|row| row.iter().map(decode_cell).collect())
        .collect();
    RawTable { headers, rows }
}

fn cell_text(data: &Data) -> String {
    decode_cell(data).as_text()
}

fn decode_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_owned()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => {
                let formatted = if naive.time() == chrono::NaiveTime::MIN {
                    naive.format("%Y-%m-%d").to_string()
                } else {
                    naive.format("%Y-%m-%d %H:%M:%S").to_string()
                };
                CellValue::Text(formatted)
            }
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::from(s.as_str()),
        Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

fn read_csv<R: Read>(reader: R) -> LedgerResult<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let headers = match records.next() {
        Some(record) => record
            .map_err(LedgerError::CsvDecode)?
            .iter()
            .map(str::to_owned)
            .collect(),
        None => return Ok(RawTable::default()),
    };
    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(LedgerError::CsvDecode)?;
        rows.push(record.iter().map(CellValue::from).collect());
    }
    Ok(RawTable { headers, rows })
}

/// Writes a canonical ledger table to `path`, painting each row with its
/// banding fill when `row_fills` is given (one RGB value per data row).
pub fn write_xlsx(path: &Path, table: &Table, row_fills: Option<&[u32]>) -> LedgerResult<()> {
    let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    let rows: Vec<&[CellValue]> = table.rows().iter().map(|r| r.cells()).collect();
    write_grid(path, &headers, &rows, row_fills)
}

/// Writes an arbitrary raw table. Used for fixtures and for recoloring a
/// saved file in place without touching its schema.
pub fn write_raw_xlsx(path: &Path, raw: &RawTable, row_fills: Option<&[u32]>) -> LedgerResult<()> {
    let headers: Vec<&str> = raw.headers.iter().map(String::as_str).collect();
    let rows: Vec<&[CellValue]> = raw.rows.iter().map(Vec::as_slice).collect();
    write_grid(path, &headers, &rows, row_fills)
}

fn write_grid(
    path: &Path,
    headers: &[&str],
    rows: &[&[CellValue]],
    row_fills: Option<&[u32]>,
) -> LedgerResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(LedgerError::SpreadsheetEncode)?;
    }

    // One reusable Format per distinct fill.
    let mut formats: Vec<(u32, Format)> = Vec::new();
    if let Some(fills) = row_fills {
        for rgb in fills {
            if !formats.iter().any(|(c, _)| c == rgb) {
                let format = Format::new().set_background_color(Color::RGB(*rgb));
                formats.push((*rgb, format));
            }
        }
    }

    for (i, cells) in rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        let format = row_fills
            .and_then(|fills| fills.get(i))
            .and_then(|rgb| formats.iter().find(|(c, _)| c == rgb))
            .map(|(_, f)| f);
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match (cell, format) {
                (CellValue::Empty, Some(f)) => {
                    worksheet
                        .write_blank(excel_row, col, f)
                        .map_err(LedgerError::SpreadsheetEncode)?;
                }
                (CellValue::Empty, None) => {}
                (CellValue::Text(s), Some(f)) => {
                    worksheet
                        .write_string_with_format(excel_row, col, s, f)
                        .map_err(LedgerError::SpreadsheetEncode)?;
                }
                (CellValue::Text(s), None) => {
                    worksheet
                        .write_string(excel_row, col, s)
                        .map_err(LedgerError::SpreadsheetEncode)?;
                }
                (CellValue::Number(n), Some(f)) => {
                    worksheet
                        .write_number_with_format(excel_row, col, *n, f)
                        .map_err(LedgerError::SpreadsheetEncode)?;
                }
                (CellValue::Number(n), None) => {
                    worksheet
                        .write_number(excel_row, col, *n)
                        .map_err(LedgerError::SpreadsheetEncode)?;
                }
            }
        }
    }

    workbook.save(path).map_err(LedgerError::SpreadsheetEncode)
}

/// Writes a canonical ledger table as CSV (no fills).
pub fn write_csv(path: &Path, table: &Table) -> LedgerResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(LedgerError::CsvEncode)?;
    writer
        .write_record(Column::ALL.iter().map(|c| c.header()))
        .map_err(LedgerError::CsvEncode)?;
    for row in table.rows() {
        writer
            .write_record(row.cells().iter().map(|c| c.as_text()))
            .map_err(LedgerError::CsvEncode)?;
    }
    writer.flush().map_err(LedgerError::FileWrite)
}
