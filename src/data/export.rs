use rust_xlsxwriter::{Workbook, Worksheet};

use super::error::Result;
use super::model::{CellValue, Table};
use crate::config::GROWTH_EXPORT_SHEET;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Serialize a table as CSV: UTF-8 BOM (so spreadsheet apps detect the
/// encoding of Hangul text), a header row, then one line per row. Nulls
/// are written as empty fields.
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(CellValue::to_string))?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}

/// Serialize a table as a single-sheet `.xlsx` workbook.
///
/// Numbers and booleans keep their cell types, timestamps are written as
/// text in [`DATETIME_FORMAT`](super::model::DATETIME_FORMAT), and nulls
/// are left blank.
pub fn table_to_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    tables_to_xlsx(&[(sheet_name, table)])
}

/// Serialize several tables into one workbook, one sheet each, in order.
pub fn tables_to_xlsx(sheets: &[(&str, &Table)]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_sheet(sheet, table)?;
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Null => {}
                CellValue::Float(v) if v.is_nan() => {}
                CellValue::Float(v) => {
                    sheet.write_number(r, c, *v)?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                CellValue::String(_) | CellValue::DateTime(_) => {
                    sheet.write_string(r, c, cell.to_string())?;
                }
            }
        }
    }
    Ok(())
}

/// CSV export of the (filtered) environment table.
pub fn environment_csv(table: &Table) -> Result<Vec<u8>> {
    table_to_csv(table)
}

/// Spreadsheet export of the (filtered) growth table.
pub fn growth_xlsx(table: &Table) -> Result<Vec<u8>> {
    table_to_xlsx(table, GROWTH_EXPORT_SHEET)
}
