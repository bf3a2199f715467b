use tracing::{info, warn};

use crate::config::{ReconConfig, SheetLayout};
use crate::error::ReconError;
use crate::matcher::{match_first_key, MatchedLine};
use crate::model::{
    BillContext, BillInput, Cell, CurrentBillRow, CurrentBillTable, CurrentBillTotals,
    DeviationEntry, DeviationStatement, EntrySource, HeaderData, LineItem, ParsedSchedule,
    PremiumLine, ReconMeta, ReconResult, Table,
};
use crate::notes::generate_notes;
use crate::schedule::{parse_extra_items, parse_schedule};
use crate::summary::{compute_summary, deviation_entry};

/// Run one bill reconciliation. Returns the current bill, deviation statement,
/// notes and collected row warnings.
///
/// A missing Work Order or Bill Quantity sheet fails the run; Extra Items is
/// optional. Malformed rows never fail the run.
pub fn run(config: &ReconConfig, input: &BillInput) -> Result<ReconResult, ReconError> {
    let layout = &config.layout;
    let context = &config.context;

    let work_order = parse_schedule(required_sheet(input, &layout.work_order)?, &layout.work_order)?;
    let bill = parse_schedule(required_sheet(input, &layout.bill_quantity)?, &layout.bill_quantity)?;
    let extras = match input.sheets.get(&layout.extra_items.sheet) {
        Some(table) => parse_extra_items(table, &layout.extra_items)?,
        None => ParsedSchedule::default(),
    };

    let matched = match_first_key(&work_order.items, &bill.items);
    let current_bill = build_current_bill(&matched, context);

    let mut entries: Vec<DeviationEntry> = matched
        .iter()
        .map(|m| {
            let wo = m.work_order;
            deviation_entry(
                &wo.serial_no,
                &wo.description,
                &wo.unit,
                wo.rate,
                (wo.quantity, wo.amount),
                (m.bill_quantity(), m.bill_amount()),
            )
        })
        .collect();
    entries.extend(extras.items.iter().map(extra_item_entry));

    let summary = compute_summary(&entries, context);

    let extra_item_amount: f64 = extras.items.iter().map(|e| e.amount).sum();
    let work_order_amount = context.work_order_amount.unwrap_or(summary.grand_total_f);
    let notes = generate_notes(
        summary.grand_total_h,
        work_order_amount,
        extra_item_amount,
        &config.notes,
    );

    let mut warnings = work_order.warnings;
    warnings.extend(bill.warnings);
    warnings.extend(extras.warnings);

    info!(
        work_order_items = work_order.items.len(),
        bill_items = bill.items.len(),
        extra_items = extras.items.len(),
        skipped_rows = warnings.len(),
        "reconciliation complete"
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            is_first_bill: context.is_first_bill,
        },
        header: header_data(context),
        current_bill,
        deviation: DeviationStatement { items: entries, summary },
        extra_items: extras.items,
        notes,
        warnings,
    })
}

fn required_sheet<'a>(input: &'a BillInput, layout: &SheetLayout) -> Result<&'a Table, ReconError> {
    input.sheets.get(&layout.sheet).ok_or_else(|| ReconError::MissingSheet {
        sheet: layout.sheet.clone(),
    })
}

/// First Page rows: one per Work Order item, quantities from the joined bill row.
fn build_current_bill(matched: &[MatchedLine<'_>], context: &BillContext) -> CurrentBillTable {
    if !context.is_first_bill {
        warn!("not a first bill: quantities since last certificate need the prior bill and are left blank");
    }

    let items: Vec<CurrentBillRow> = matched
        .iter()
        .map(|m| {
            let qty = m.bill_quantity();
            let amount = m.bill_amount();
            let (qty_since_last, amount_since_prev) = if context.is_first_bill {
                (Some(qty), Some(amount))
            } else {
                (None, None)
            };
            CurrentBillRow {
                serial_no: m.work_order.serial_no.clone(),
                description: m.work_order.description.clone(),
                unit: m.work_order.unit.clone(),
                rate: m.work_order.rate,
                qty_since_last,
                qty_upto_date: qty,
                amount_upto_date: amount,
                amount_since_prev,
                remarks: String::new(),
            }
        })
        .collect();

    let grand_total: f64 = items.iter().map(|r| r.amount_upto_date).sum();
    let premium_amount = context.premium_on(grand_total);

    CurrentBillTable {
        items,
        totals: CurrentBillTotals {
            grand_total,
            premium: PremiumLine {
                percent: context.premium_percent,
                premium_type: context.premium_type,
                amount: premium_amount,
            },
            payable: grand_total + premium_amount,
        },
    }
}

/// Extra items have no ordered quantity: everything executed is excess.
fn extra_item_entry(item: &LineItem) -> DeviationEntry {
    DeviationEntry {
        serial_no: item.serial_no.clone(),
        description: item.description.clone(),
        unit: item.unit.clone(),
        qty_wo: 0.0,
        rate: item.rate,
        amt_wo: 0.0,
        qty_bill: item.quantity,
        amt_bill: item.amount,
        excess_qty: item.quantity,
        excess_amt: item.amount,
        saving_qty: 0.0,
        saving_amt: 0.0,
        remark: String::new(),
        source: EntrySource::ExtraItem,
    }
}

fn header_data(context: &BillContext) -> HeaderData {
    HeaderData {
        deviation_headers: vec![
            "DEVIATION STATEMENT".to_string(),
            format!("Name of work: {}", context.work_name),
            format!("Name of Contractor: {}", context.contractor_name),
            format!("Agreement No.: {}", context.agreement_no),
        ],
    }
}

/// Load a headerless CSV export of one sheet into a cell table.
///
/// Every field is kept as text; blank fields become [`Cell::Empty`]. Rows may
/// differ in length. Fully empty lines are dropped by the reader, so header
/// offsets only hold for exports that write blank rows as runs of commas.
pub fn load_csv_table(csv_data: &str) -> Result<Table, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        table.push(record.iter().map(Cell::from).collect());
    }

    Ok(table)
}
