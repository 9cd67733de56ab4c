//! Report rows and spreadsheet output.

mod merge;
mod sheet;

pub use merge::{
    Cell, METADATA_COLUMNS, MergedRow, RECORD_COLUMNS, RepositoryRecord, merge_row, merge_rows,
};
pub use sheet::Sheet;
