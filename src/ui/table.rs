use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::error::Result;
use crate::data::model::{CellValue, Table};

/// Display text for one cell. Floats are rounded to two decimals; nulls
/// become arrow nulls.
fn display_cell(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Null => None,
        CellValue::Float(v) if v.is_nan() => None,
        CellValue::Float(v) => Some(format!("{v:.2}")),
        other => Some(other.to_string()),
    }
}

/// Convert a table to a single all-`Utf8` record batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();

    let arrays: Vec<ArrayRef> = (0..table.columns().len())
        .map(|col| {
            let values: Vec<Option<String>> = table
                .rows()
                .iter()
                .map(|row| display_cell(&row[col]))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Render a table as a boxed text grid, showing at most `max_rows` rows.
pub fn pretty(table: &Table, max_rows: usize) -> Result<String> {
    if table.columns().is_empty() {
        return Ok("(no columns)".to_string());
    }
    let shown = table.select_rows(&(0..table.len().min(max_rows)).collect::<Vec<_>>());
    let batch = to_record_batch(&shown)?;
    let mut out = pretty_format_batches(&[batch])?.to_string();
    if table.len() > max_rows {
        out.push_str(&format!("\n… {} more rows", table.len() - max_rows));
    }
    Ok(out)
}
