use crate::model::{BillContext, DeviationEntry, DeviationSummary, EntrySource, PremiumSpec};

/// Build a deviation entry from ordered vs executed figures. Excess and saving
/// are clamped at zero, so at most one of them is ever positive.
pub fn deviation_entry(
    serial_no: &str,
    description: &str,
    unit: &str,
    rate: f64,
    (qty_wo, amt_wo): (f64, f64),
    (qty_bill, amt_bill): (f64, f64),
) -> DeviationEntry {
    let excess_qty = (qty_bill - qty_wo).max(0.0);
    let saving_qty = (qty_wo - qty_bill).max(0.0);
    DeviationEntry {
        serial_no: serial_no.to_string(),
        description: description.to_string(),
        unit: unit.to_string(),
        qty_wo,
        rate,
        amt_wo,
        qty_bill,
        amt_bill,
        excess_qty,
        excess_amt: excess_qty * rate,
        saving_qty,
        saving_amt: saving_qty * rate,
        remark: String::new(),
        source: EntrySource::WorkOrder,
    }
}

/// Aggregate the statement columns and apply the tender premium to each.
pub fn compute_summary(entries: &[DeviationEntry], context: &BillContext) -> DeviationSummary {
    let mut work_order_total = 0.0;
    let mut executed_total = 0.0;
    let mut overall_excess = 0.0;
    let mut overall_saving = 0.0;

    for e in entries {
        if e.source == EntrySource::WorkOrder {
            work_order_total += e.amt_wo;
        }
        executed_total += e.amt_bill;
        overall_excess += e.excess_amt;
        overall_saving += e.saving_amt;
    }

    let tender_premium_f = context.premium_on(work_order_total);
    let tender_premium_h = context.premium_on(executed_total);
    let tender_premium_j = context.premium_on(overall_excess);
    let tender_premium_l = context.premium_on(overall_saving);

    let grand_total_f = work_order_total + tender_premium_f;
    let grand_total_h = executed_total + tender_premium_h;

    DeviationSummary {
        work_order_total,
        executed_total,
        overall_excess,
        overall_saving,
        premium: PremiumSpec {
            percent: context.premium_percent,
            premium_type: context.premium_type,
        },
        tender_premium_f,
        tender_premium_h,
        tender_premium_j,
        tender_premium_l,
        grand_total_f,
        grand_total_h,
        grand_total_j: overall_excess + tender_premium_j,
        grand_total_l: overall_saving + tender_premium_l,
        net_difference: grand_total_h - grand_total_f,
    }
}
