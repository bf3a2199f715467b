// Excel/ODS import (xlsx, xls, xlsb, ods) into recon cell tables

use std::path::Path;

use billgrid_recon::{BillInput, Cell, ReconError, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

/// Per-sheet import statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetStats {
    pub name: String,
    /// Rows/cols counted from A1, including any leading blank area.
    pub rows: usize,
    pub cols: usize,
    pub cells_imported: usize,
    /// Error cells (`#N/A`, `#REF!`, ...) read as blank.
    pub errors_blanked: usize,
}

#[derive(Debug, Default)]
pub struct WorkbookImport {
    pub input: BillInput,
    pub sheets: Vec<SheetStats>,
}

impl WorkbookImport {
    pub fn summary(&self) -> String {
        let names: Vec<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();
        format!("Imported {} sheet(s): {}", self.sheets.len(), names.join(", "))
    }
}

/// Load the named sheets from a workbook. Sheets the workbook doesn't have are
/// left out of the input; the engine decides whether that's fatal.
pub fn load_workbook(path: &Path, wanted: &[&str]) -> Result<WorkbookImport, ReconError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconError::Io(format!("Failed to open workbook {}: {e}", path.display())))?;

    let available: Vec<String> = workbook.sheet_names().to_vec();
    let mut import = WorkbookImport::default();

    for name in wanted {
        if !available.iter().any(|s| s.as_str() == *name) {
            debug!(sheet = %name, "sheet not present in workbook");
            continue;
        }
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ReconError::Io(format!("Failed to read sheet '{name}': {e}")))?;
        let (table, stats) = range_to_table(name, &range);
        import.input.sheets.insert(name.to_string(), table);
        import.sheets.push(stats);
    }

    Ok(import)
}

/// Sheet names and dimensions for every sheet in the workbook.
pub fn inspect(path: &Path) -> Result<Vec<SheetStats>, ReconError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconError::Io(format!("Failed to open workbook {}: {e}", path.display())))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut out = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ReconError::Io(format!("Failed to read sheet '{name}': {e}")))?;
        out.push(range_to_table(name, &range).1);
    }
    Ok(out)
}

/// Convert a calamine range to a table anchored at A1, so row offsets in the
/// layout config count from the top of the sheet even when the used range
/// starts lower.
fn range_to_table(name: &str, range: &Range<Data>) -> (Table, SheetStats) {
    let mut stats = SheetStats {
        name: name.to_string(),
        ..Default::default()
    };

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return (Vec::new(), stats);
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut table: Table = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(|data| {
            let cell = to_cell(data);
            match data {
                Data::Error(_) => stats.errors_blanked += 1,
                Data::Empty => {}
                _ => stats.cells_imported += 1,
            }
            cell
        }));
        table.push(cells);
    }

    stats.rows = start_row + height;
    stats.cols = start_col + width;
    (table, stats)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Missing-value markers, same as a blank cell
        Data::Error(_) => Cell::Empty,
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}
