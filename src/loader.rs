use crate::address::CellAddress;
use crate::workbook::{CellValue, Sheet, Temporal, Workbook};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no file data received")]
    Empty,
    #[error("{0}")]
    Parse(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for LoadError {
    fn from(e: calamine::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Parse a spreadsheet from an in-memory buffer
///
/// The container format (xlsx, xlsm, xlsb, xls, ods) is detected from the
/// bytes. Every sheet is read in file order; cell values keep their type,
/// dates become their serial number and error cells their error text.
/// Formula text and the date or duration kind of serial cells are kept on
/// the sheet next to the values.
///
/// # Arguments
/// * `bytes` - The raw file contents
///
/// # Returns
/// * `Result<Workbook, LoadError>` - The loaded workbook or the parser's error
///
/// # Examples
/// ```no_run
/// use sheetjump::loader::load_workbook;
///
/// let bytes = std::fs::read("data.xlsx").unwrap();
/// match load_workbook(&bytes) {
///     Ok(book) => println!("Loaded {} sheets", book.sheets.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn load_workbook(bytes: &[u8]) -> Result<Workbook, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let names = source.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = source.worksheet_range(&name)?;
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start_row as usize, start_col as usize);

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
        for source_row in range.rows() {
            let mut row = vec![CellValue::Empty; start_col];
            row.extend(source_row.iter().map(convert_value));
            trim_trailing_empty(&mut row);
            rows.push(row);
        }
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        let mut sheet = Sheet::new(name, rows);
        for (r, c, value) in range.used_cells() {
            if let Data::DateTime(dt) = value {
                let kind = if dt.is_duration() {
                    Temporal::Duration
                } else {
                    Temporal::for_serial(dt.as_f64())
                };
                let addr = CellAddress::new(start_col + c, start_row + r);
                sheet.temporal.insert(addr, kind);
            }
        }

        match source.worksheet_formula(&sheet.name) {
            Ok(formulas) => {
                let (f_row, f_col) = formulas.start().unwrap_or((0, 0));
                for (r, c, formula) in formulas.used_cells() {
                    let formula = formula.trim_start_matches('=');
                    if formula.is_empty() {
                        continue;
                    }
                    let addr = CellAddress::new(f_col as usize + c, f_row as usize + r);
                    sheet.formulas.insert(addr, formula.to_string());
                }
            }
            // values are still usable; the copy will hold constants
            Err(e) => log::warn!("could not read formulas of `{}`: {}", sheet.name, e),
        }

        log::debug!(
            "read sheet `{}` ({} rows, {} formulas)",
            sheet.name,
            sheet.rows.len(),
            sheet.formulas.len()
        );
        sheets.push(sheet);
    }

    Ok(Workbook::new(sheets))
}

/// Read a spreadsheet file from disk and parse it with [`load_workbook`].
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook, LoadError> {
    let bytes = std::fs::read(path)?;
    load_workbook(&bytes)
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn trim_trailing_empty(row: &mut Vec<CellValue>) {
    while row.last().is_some_and(CellValue::is_empty) {
        row.pop();
    }
}
