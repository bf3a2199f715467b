//! Schedule parsing: raw sheet tables into validated line items.

use tracing::warn;

use crate::config::SheetLayout;
use crate::error::ReconError;
use crate::model::{cell_at, Cell, LineItem, ParsedSchedule, RowWarning, Table};
use crate::normalize::normalize;

/// Parse a Work Order or Bill Quantity sheet.
///
/// Rows before `layout.header_rows` are skipped. A row whose serial,
/// description and unit are all blank ends up nowhere, silently. A row with a
/// numeric cell that doesn't normalize is dropped with a [`RowWarning`].
pub fn parse_schedule(table: &Table, layout: &SheetLayout) -> Result<ParsedSchedule, ReconError> {
    check_shape(table, layout)?;

    let mut parsed = ParsedSchedule::default();
    for (idx, row) in table.iter().enumerate().skip(layout.header_rows) {
        let fields = read_text_fields(row, layout);
        if fields.serial_no.is_empty() && fields.description.is_empty() && fields.unit.is_empty() {
            continue;
        }
        push_validated(&mut parsed, row, idx, fields, layout);
    }

    Ok(parsed)
}

/// Parse the Extra Items sheet. Rows without an identifier are skipped
/// outright; there is no work order key to carry.
pub fn parse_extra_items(table: &Table, layout: &SheetLayout) -> Result<ParsedSchedule, ReconError> {
    check_shape(table, layout)?;

    let mut parsed = ParsedSchedule::default();
    for (idx, row) in table.iter().enumerate().skip(layout.header_rows) {
        if cell_at(row, layout.columns.serial).is_blank() {
            continue;
        }
        let fields = read_text_fields(row, layout);
        push_validated(&mut parsed, row, idx, fields, layout);
    }

    Ok(parsed)
}

struct TextFields {
    serial_no: String,
    description: String,
    unit: String,
    match_key: String,
}

fn read_text_fields(row: &[Cell], layout: &SheetLayout) -> TextFields {
    let cols = &layout.columns;
    TextFields {
        serial_no: cell_at(row, cols.serial).text(),
        description: cell_at(row, cols.description).text(),
        unit: cell_at(row, cols.unit).text(),
        match_key: cols
            .match_key
            .map(|c| cell_at(row, c).text())
            .unwrap_or_default(),
    }
}

fn push_validated(
    parsed: &mut ParsedSchedule,
    row: &[Cell],
    idx: usize,
    fields: TextFields,
    layout: &SheetLayout,
) {
    let cols = &layout.columns;
    let qty_cell = cell_at(row, cols.quantity);
    let rate_cell = cell_at(row, cols.rate);
    let amount_cell = cell_at(row, cols.amount);
    let display_row = idx + 1;

    match (normalize(qty_cell), normalize(rate_cell), normalize(amount_cell)) {
        (Some(quantity), Some(rate), Some(amount)) => parsed.items.push(LineItem {
            serial_no: fields.serial_no,
            description: fields.description,
            unit: fields.unit,
            quantity,
            rate,
            amount,
            match_key: fields.match_key,
            source_row: display_row,
        }),
        _ => {
            let warning = RowWarning {
                sheet: layout.sheet.clone(),
                row: display_row,
                quantity: qty_cell.raw(),
                rate: rate_cell.raw(),
                amount: amount_cell.raw(),
                message: format!(
                    "Skipping {} row {display_row}: Invalid numeric value (qty={}, rate={}, amount={})",
                    layout.sheet,
                    qty_cell.raw(),
                    rate_cell.raw(),
                    amount_cell.raw(),
                ),
            };
            warn!(sheet = %layout.sheet, row = display_row, "{}", warning.message);
            parsed.warnings.push(warning);
        }
    }
}

/// A sheet with data rows must have at least one row wide enough to hold the
/// mapped columns; otherwise the column map doesn't describe this sheet.
fn check_shape(table: &Table, layout: &SheetLayout) -> Result<(), ReconError> {
    let data_rows = table.iter().skip(layout.header_rows);
    let found = data_rows.map(|r| r.len()).max();
    let needed = layout.columns.width();

    match found {
        Some(found) if found > 0 && found < needed => Err(ReconError::SheetShape {
            sheet: layout.sheet.clone(),
            needed,
            found,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(header_rows: usize) -> SheetLayout {
        SheetLayout {
            header_rows,
            ..SheetLayout::work_order()
        }
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn skips_header_block() {
        let table = vec![
            row(&["S.No", "Description", "Unit", "Qty", "Rate", "Amount", "BSR"]),
            row(&["1", "Excavation", "cum", "100", "50", "5000", "BSR1"]),
        ];
        let parsed = parse_schedule(&table, &layout(1)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert!(parsed.warnings.is_empty());
        let item = &parsed.items[0];
        assert_eq!(item.serial_no, "1");
        assert_eq!(item.quantity, 100.0);
        assert_eq!(item.amount, 5000.0);
        assert_eq!(item.match_key, "BSR1");
        assert_eq!(item.source_row, 2);
    }

    #[test]
    fn blank_rows_dropped_silently() {
        let table = vec![
            row(&["", "", "", "12", "x", "", "BSR9"]),
            row(&["2", "Filling", "cum", "10", "20", "200", "BSR2"]),
        ];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn header_leak_in_rate_is_warned_not_zeroed() {
        let table = vec![
            row(&["1", "Excavation", "cum", "100", "Rate", "5000", "BSR1"]),
            row(&["2", "Filling", "cum", "10", "20", "200", "BSR2"]),
        ];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].serial_no, "2");

        assert_eq!(parsed.warnings.len(), 1);
        let w = &parsed.warnings[0];
        assert_eq!(w.row, 1);
        assert_eq!(w.rate, "Rate");
        assert_eq!(w.sheet, "Work Order");
        assert!(w.message.contains("qty=100, rate=Rate, amount=5000"));
    }

    #[test]
    fn blank_numerics_default_to_zero() {
        let table = vec![row(&["3", "Sub-head: Earthwork", "", "", "", "", ""])];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].quantity, 0.0);
        assert_eq!(parsed.items[0].match_key, "");
    }

    #[test]
    fn missing_marker_quantity_kept_as_zero() {
        let table = vec![
            row(&["1", "Excavation", "cum", "N/A", "50", "0", "BSR1"]),
            vec![
                Cell::Text("2".into()),
                Cell::Text("Filling".into()),
                Cell::Text("NULL".into()),
                Cell::Text("#N/A".into()),
                Cell::Number(20.0),
                Cell::Text("nan".into()),
                Cell::Text("BSR2".into()),
            ],
        ];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].quantity, 0.0);
        assert_eq!(parsed.items[0].rate, 50.0);
        assert_eq!(parsed.items[1].unit, "");
        assert_eq!(parsed.items[1].quantity, 0.0);
        assert_eq!(parsed.items[1].amount, 0.0);
    }

    #[test]
    fn text_fields_trimmed_and_numbers_formatted() {
        let table = vec![vec![
            Cell::Number(4.0),
            Cell::Text("  Plastering ".into()),
            Cell::Text(" sqm".into()),
            Cell::Number(12.5),
            Cell::Number(300.0),
            Cell::Number(3750.0),
            Cell::Text(" BSR 4.1 ".into()),
        ]];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        let item = &parsed.items[0];
        assert_eq!(item.serial_no, "4");
        assert_eq!(item.description, "Plastering");
        assert_eq!(item.unit, "sqm");
        assert_eq!(item.match_key, "BSR 4.1");
    }

    #[test]
    fn ragged_rows_read_missing_cells_as_empty() {
        let table = vec![
            row(&["1", "Excavation", "cum", "100", "50", "5000", "BSR1"]),
            row(&["2", "Dressing"]),
        ];
        let parsed = parse_schedule(&table, &layout(0)).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[1].rate, 0.0);
        assert_eq!(parsed.items[1].match_key, "");
    }

    #[test]
    fn narrow_sheet_is_shape_error() {
        let table = vec![row(&["1", "Excavation", "cum"])];
        let err = parse_schedule(&table, &layout(0)).unwrap_err();
        assert!(matches!(err, ReconError::SheetShape { needed: 7, found: 3, .. }));
    }

    #[test]
    fn header_only_sheet_is_empty_not_error() {
        let table = vec![row(&["Title"]), row(&["Subtitle"])];
        let parsed = parse_schedule(&table, &layout(2)).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn extra_items_columns_and_identifier_skip() {
        let table = vec![
            row(&["", "", "Orphan text", "no", "1", "2", "3"]),
            row(&["E1", "", "Extra railing", "m", "15", "400", "6000"]),
            row(&["E2", "", "Bad row", "m", "Qty", "400", "6000"]),
        ];
        let parsed = parse_extra_items(&table, &SheetLayout::extra_items()).unwrap();
        assert_eq!(parsed.items.len(), 1);
        let item = &parsed.items[0];
        assert_eq!(item.serial_no, "E1");
        assert_eq!(item.description, "Extra railing");
        assert_eq!(item.unit, "m");
        assert_eq!(item.quantity, 15.0);
        assert_eq!(item.amount, 6000.0);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].sheet, "Extra Items");
        assert_eq!(parsed.warnings[0].row, 3);
    }
}
