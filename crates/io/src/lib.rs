// Spreadsheet loading: workbook sheets and CSV exports into recon cell tables

pub mod csv;
pub mod xlsx;

pub use csv::{load_csv_sheet, load_csv_sheets};
pub use xlsx::{inspect, load_workbook, SheetStats, WorkbookImport};
