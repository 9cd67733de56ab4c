//! Tabular layout and `.xlsx` output.

use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::report::{Cell, MergedRow};

/// Largest column count an `.xlsx` worksheet accepts.
const MAX_COLUMNS: usize = 16_384;

/// Largest data row count, leaving room for the header row.
const MAX_DATA_ROWS: usize = 1_048_575;

/// A single worksheet: one header row and positionally aligned data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Lay out `rows` under a header made of `seed` followed by every other
    /// column name in the order it is first seen.
    ///
    /// Rows missing a column get [`Cell::Empty`] in that position.
    pub fn from_rows(name: impl Into<String>, seed: &[&str], rows: &[MergedRow]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut add = |column: &str, headers: &mut Vec<String>| {
            if !index.contains_key(column) {
                index.insert(column.to_string(), headers.len());
                headers.push(column.to_string());
            }
        };

        for column in seed {
            add(column, &mut headers);
        }
        for row in rows {
            for (column, _) in row.columns() {
                add(column, &mut headers);
            }
        }

        let aligned = rows
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::Empty; headers.len()];
                for (column, cell) in row.columns() {
                    cells[index[column.as_str()]] = cell.clone();
                }
                cells
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows: aligned,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Write the sheet as a single-worksheet workbook, replacing `path`.
    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        if self.headers.len() > MAX_COLUMNS {
            return Err(ReportError::Sheet {
                message: format!("{} columns exceeds the limit of {}", self.headers.len(), MAX_COLUMNS),
            });
        }
        if self.rows.len() > MAX_DATA_ROWS {
            return Err(ReportError::Sheet {
                message: format!("{} rows exceeds the limit of {}", self.rows.len(), MAX_DATA_ROWS),
            });
        }

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.name)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &bold)?;
        }

        for (i, cells) in self.rows.iter().enumerate() {
            let row = (i + 1) as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row, col, text)?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row, col, *number)?;
                    }
                    Cell::Bool(flag) => {
                        worksheet.write_boolean(row, col, *flag)?;
                    }
                }
            }
        }
        worksheet.autofit();

        workbook.save(path)?;
        info!(
            path = %path.display(),
            rows = self.rows.len(),
            columns = self.headers.len(),
            "report written"
        );
        Ok(())
    }
}
