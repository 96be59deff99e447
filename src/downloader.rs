use crate::address::CellAddress;
use crate::jump::JumpConfigStore;
use crate::workbook::{CellValue, Sheet, Workbook};
use rust_xlsxwriter::{
    ColNum, Format, Formula, Note, RowNum, Workbook as XlsxWorkbook, Worksheet, XlsxError,
};
use thiserror::Error;

/// File name offered for the annotated download.
pub const EXPORT_FILENAME: &str = "带跳转配置的Excel.xlsx";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cell {0} is outside the writable sheet area")]
    OutOfRange(CellAddress),
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
}

/// Annotations to embed into one sheet
///
/// Every stored configuration whose target sheet is `sheet_name` yields one
/// note, placed on the configuration's *source* address within that sheet.
/// The result is sorted by address so exports are reproducible.
///
/// # Arguments
/// * `store` - The session's jump configurations
/// * `sheet_name` - Name of the sheet being written
///
/// # Returns
/// * `Vec<(CellAddress, String)>` - Cell and note text pairs
pub fn sheet_annotations(store: &JumpConfigStore, sheet_name: &str) -> Vec<(CellAddress, String)> {
    let mut notes: Vec<(CellAddress, String)> = store
        .targeting_sheet(sheet_name)
        .map(|(source, target)| (*source, target.annotation()))
        .collect();
    notes.sort_by(|a, b| a.0.cmp(&b.0));
    notes
}

/// Convert a workbook plus its jump configurations to XLSX
///
/// All sheets are written in their original order and under their original
/// names, cell values untouched. Formula cells are written as formulas with
/// their last computed value as the cached result, and date or time serials
/// get a matching number format. Jump configurations become cell notes (see
/// [`sheet_annotations`]) holding exactly the annotation text; a note on a
/// cell that was empty in the source is still written.
///
/// # Arguments
/// * `book` - The loaded workbook
/// * `store` - Jump configurations to embed
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use sheetjump::downloader::to_xlsx;
/// use sheetjump::jump::JumpConfigStore;
/// use sheetjump::workbook::{Sheet, Workbook};
///
/// let book = Workbook::new(vec![Sheet::new("Sheet1", vec![vec![1.0.into()]])]);
/// let bytes = to_xlsx(&book, &JumpConfigStore::new()).unwrap();
/// assert!(!bytes.is_empty());
/// ```
pub fn to_xlsx(book: &Workbook, store: &JumpConfigStore) -> Result<Vec<u8>, ExportError> {
    let mut workbook = XlsxWorkbook::new();

    for sheet in &book.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_values(worksheet, sheet)?;

        for (addr, text) in sheet_annotations(store, &sheet.name) {
            let (row, col) = position(&addr)?;
            let note = Note::new(text).add_author_prefix(false);
            worksheet.insert_note(row, col, &note)?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    log::info!(
        "exported {} sheets with {} jump configs ({} bytes)",
        book.sheets.len(),
        store.len(),
        buffer.len()
    );

    Ok(buffer)
}

fn write_values(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), ExportError> {
    for (addr, value) in sheet.used_cells() {
        if sheet.formulas.contains_key(&addr) {
            continue;
        }
        let (row, col) = position(&addr)?;
        match (value, sheet.temporal.get(&addr)) {
            (CellValue::Number(n), Some(kind)) => {
                let format = Format::new().set_num_format(kind.num_format());
                worksheet.write_number_with_format(row, col, *n, &format)?
            }
            (CellValue::Text(s), _) => worksheet.write_string(row, col, s)?,
            (CellValue::Number(n), None) => worksheet.write_number(row, col, *n)?,
            (CellValue::Boolean(b), _) => worksheet.write_boolean(row, col, *b)?,
            (CellValue::Empty, _) => continue,
        };
    }

    for (addr, text) in &sheet.formulas {
        let (row, col) = position(addr)?;
        let formula = Formula::new(text).set_result(sheet.value(addr).to_string());
        match sheet.temporal.get(addr) {
            Some(kind) => {
                let format = Format::new().set_num_format(kind.num_format());
                worksheet.write_formula_with_format(row, col, formula, &format)?
            }
            None => worksheet.write_formula(row, col, formula)?,
        };
    }
    Ok(())
}

fn position(addr: &CellAddress) -> Result<(RowNum, ColNum), ExportError> {
    let row = RowNum::try_from(addr.row).map_err(|_| ExportError::OutOfRange(*addr))?;
    let col = ColNum::try_from(addr.col).map_err(|_| ExportError::OutOfRange(*addr))?;
    Ok((row, col))
}
