//! Render contract: per-sheet JSON payloads for the PDF/Word renderers.
//!
//! Renderer templates are written against the field names below. Every payload
//! is checked with [`validate`] before it leaves the crate.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ReconError;
use crate::model::{BillContext, ReconResult};
use crate::words::amount_in_words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    FirstPage,
    LastPage,
    DeviationStatement,
    ExtraItems,
    NoteSheet,
    CertificateIii,
}

impl SheetKind {
    pub const ALL: [SheetKind; 6] = [
        Self::FirstPage,
        Self::LastPage,
        Self::DeviationStatement,
        Self::ExtraItems,
        Self::NoteSheet,
        Self::CertificateIii,
    ];

    /// Display name, as printed on the sheet tab.
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstPage => "First Page",
            Self::LastPage => "Last Page",
            Self::DeviationStatement => "Deviation Statement",
            Self::ExtraItems => "Extra Items",
            Self::NoteSheet => "Note Sheet",
            Self::CertificateIii => "Certificate III",
        }
    }

    /// Lowercase, underscore-joined name; used for template and file names.
    pub fn slug(self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|k| k.slug() == wanted)
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::FirstPage => &["header", "items", "totals"],
            Self::LastPage => &["payable_amount", "amount_words"],
            Self::DeviationStatement => &["items", "summary", "header"],
            Self::ExtraItems => &["items"],
            Self::NoteSheet => &[
                "agreement_no",
                "name_of_work",
                "name_of_firm",
                "date_commencement",
                "date_completion",
                "actual_completion",
                "work_order_amount",
                "extra_item_amount",
                "notes",
                "totals",
            ],
            Self::CertificateIii => &[
                "payable_amount",
                "total_123",
                "balance_4_minus_5",
                "amount_paid_last_bill",
                "payment_now",
                "by_cheque",
                "cheque_amount_words",
                "certificate_items",
                "total_recovery",
                "totals",
            ],
        }
    }

    pub fn required_totals(self) -> &'static [&'static str] {
        match self {
            Self::FirstPage => &["grand_total", "premium", "payable"],
            Self::CertificateIii => &["grand_total", "payable_amount", "extra_items_sum", "total_123"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One validated payload.
#[derive(Debug, Clone, Serialize)]
pub struct SheetPayload {
    pub sheet: SheetKind,
    pub data: Value,
}

/// All six payloads, in print order.
#[derive(Debug, Clone, Serialize)]
pub struct SheetSet {
    pub sheets: Vec<SheetPayload>,
}

impl SheetSet {
    pub fn get(&self, sheet: SheetKind) -> Option<&Value> {
        self.sheets.iter().find(|p| p.sheet == sheet).map(|p| &p.data)
    }
}

/// Check that `payload` carries every field the `sheet` template reads.
/// Missing `totals` sub-fields are reported as `totals.<field>`.
pub fn validate(sheet: SheetKind, payload: &Value) -> Result<(), ReconError> {
    let missing = |field: String| ReconError::MissingField {
        sheet: sheet.name().to_string(),
        field,
    };

    for field in sheet.required_fields() {
        if payload.get(field).is_none() {
            return Err(missing(field.to_string()));
        }
    }

    if let Some(totals) = payload.get("totals") {
        for field in sheet.required_totals() {
            if totals.get(field).is_none() {
                return Err(missing(format!("totals.{field}")));
            }
        }
    }

    Ok(())
}

/// Build and validate the six sheet payloads for one reconciled bill.
pub fn build_sheets(result: &ReconResult, context: &BillContext) -> Result<SheetSet, ReconError> {
    let payloads = [
        (SheetKind::FirstPage, first_page(result, context)),
        (SheetKind::LastPage, last_page(result)),
        (SheetKind::DeviationStatement, deviation_statement(result)),
        (SheetKind::ExtraItems, extra_items(result)),
        (SheetKind::NoteSheet, note_sheet(result, context)),
        (SheetKind::CertificateIii, certificate_iii(result, context)),
    ];

    let mut sheets = Vec::with_capacity(payloads.len());
    for (sheet, data) in payloads {
        validate(sheet, &data)?;
        sheets.push(SheetPayload { sheet, data });
    }

    Ok(SheetSet { sheets })
}

fn first_page(result: &ReconResult, context: &BillContext) -> Value {
    json!({
        "header": {
            "name_of_work": context.work_name,
            "name_of_firm": context.contractor_name,
            "agreement_no": context.agreement_no,
            "bill_serial": context.bill_serial,
            "work_order_ref": context.work_order_ref,
            "last_bill_no": context.last_bill_no,
            "cash_voucher_no": context.cash_voucher_no,
            "cash_voucher_date": context.cash_voucher_date,
            "is_first_bill": context.is_first_bill,
        },
        "items": result.current_bill.items,
        "totals": result.current_bill.totals,
    })
}

fn last_page(result: &ReconResult) -> Value {
    let payable = result.deviation.summary.grand_total_h;
    json!({
        "payable_amount": payable,
        "amount_words": amount_in_words(payable),
    })
}

fn deviation_statement(result: &ReconResult) -> Value {
    json!({
        "header": result.header.deviation_headers,
        "items": result.deviation.items,
        "summary": result.deviation.summary,
    })
}

fn extra_items(result: &ReconResult) -> Value {
    let total: f64 = result.extra_items.iter().map(|e| e.amount).sum();
    json!({
        "items": result.extra_items,
        "total": total,
    })
}

fn note_sheet(result: &ReconResult, context: &BillContext) -> Value {
    let notes = &result.notes;
    json!({
        "agreement_no": context.agreement_no,
        "name_of_work": context.work_name,
        "name_of_firm": context.contractor_name,
        "date_commencement": context.start_date,
        "date_completion": context.completion_date,
        "actual_completion": context.actual_completion_date,
        "work_order_amount": notes.work_order_amount,
        "extra_item_amount": notes.totals.extra_items_sum,
        "percentage_work_done": notes.percentage_work_done,
        "notes": notes.notes,
        "totals": notes.totals,
    })
}

fn certificate_iii(result: &ReconResult, context: &BillContext) -> Value {
    let summary = &result.deviation.summary;
    let extras: f64 = result.extra_items.iter().map(|e| e.amount).sum();
    let work_value = summary.executed_total - extras;

    let total_123 = summary.grand_total_h;
    let total_recovery = 0.0;
    let balance = total_123 - context.amount_paid_last_bill;
    let payment_now = balance - total_recovery;

    json!({
        "payable_amount": total_123,
        "total_123": total_123,
        "balance_4_minus_5": balance,
        "amount_paid_last_bill": context.amount_paid_last_bill,
        "payment_now": payment_now,
        "by_cheque": payment_now,
        "cheque_amount_words": amount_in_words(payment_now),
        "certificate_items": [
            { "serial_no": "1", "description": "Value of work done", "amount": work_value },
            { "serial_no": "2", "description": "Extra items", "amount": extras },
            {
                "serial_no": "3",
                "description": format!("Tender premium ({}% {})", summary.premium.percent, summary.premium.premium_type),
                "amount": summary.tender_premium_h,
            },
        ],
        "total_recovery": total_recovery,
        "totals": {
            "grand_total": summary.grand_total_h,
            "payable_amount": total_123,
            "extra_items_sum": extras,
            "total_123": total_123,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::engine::run;
    use crate::model::{BillInput, Cell, Table};

    fn sheet(rows: &[&[&str]]) -> Table {
        let mut table: Table = (0..21).map(|_| vec![Cell::Text("title".into())]).collect();
        table.extend(rows.iter().map(|r| r.iter().map(|c| Cell::from(*c)).collect()));
        table
    }

    fn reconciled(paid_last: f64) -> (ReconResult, BillContext) {
        let mut config = ReconConfig::default();
        config.context.agreement_no = "7/2024".into();
        config.context.premium_percent = 10.0;
        config.context.amount_paid_last_bill = paid_last;
        let input = BillInput::default()
            .with_sheet("Work Order", sheet(&[&["1", "Excavation", "cum", "100", "50", "5000", "BSR1"]]))
            .with_sheet("Bill Quantity", sheet(&[&["1", "Excavation", "cum", "100", "50", "5000", "BSR1"]]))
            .with_sheet(
                "Extra Items",
                vec![vec![
                    "E1".into(), "".into(), "Railing".into(), "m".into(),
                    "10".into(), "100".into(), "1000".into(),
                ]],
            );
        let result = run(&config, &input).unwrap();
        (result, config.context)
    }

    #[test]
    fn all_six_sheets_validate() {
        let (result, context) = reconciled(0.0);
        let set = build_sheets(&result, &context).unwrap();
        let kinds: Vec<SheetKind> = set.sheets.iter().map(|p| p.sheet).collect();
        assert_eq!(kinds, SheetKind::ALL.to_vec());
        for payload in &set.sheets {
            validate(payload.sheet, &payload.data).unwrap();
        }
    }

    #[test]
    fn certificate_arithmetic() {
        let (result, context) = reconciled(2_000.0);
        let set = build_sheets(&result, &context).unwrap();
        let cert = set.get(SheetKind::CertificateIii).unwrap();

        // executed 6000 (5000 + 1000 extra) plus 10% premium
        assert_eq!(cert["total_123"], json!(6600.0));
        assert_eq!(cert["payable_amount"], json!(6600.0));
        assert_eq!(cert["total_recovery"], json!(0.0));
        assert_eq!(cert["balance_4_minus_5"], json!(4600.0));
        assert_eq!(cert["payment_now"], json!(4600.0));
        assert_eq!(cert["by_cheque"], json!(4600.0));
        assert_eq!(cert["cheque_amount_words"], "Rupees Four Thousand Six Hundred Only");
        assert_eq!(cert["totals"]["extra_items_sum"], json!(1000.0));

        let items = cert["certificate_items"].as_array().unwrap();
        let sum: f64 = items.iter().map(|i| i["amount"].as_f64().unwrap()).sum();
        assert_eq!(sum, 6600.0);
    }

    #[test]
    fn last_page_words() {
        let (result, context) = reconciled(0.0);
        let set = build_sheets(&result, &context).unwrap();
        let last = set.get(SheetKind::LastPage).unwrap();
        assert_eq!(last["amount_words"], "Rupees Six Thousand Six Hundred Only");
    }

    #[test]
    fn missing_top_level_field() {
        let err = validate(SheetKind::LastPage, &json!({ "payable_amount": 10.0 })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field for Last Page: amount_words"
        );
    }

    #[test]
    fn missing_totals_field() {
        let payload = json!({
            "header": {},
            "items": [],
            "totals": { "grand_total": 1.0, "payable": 1.0 },
        });
        let err = validate(SheetKind::FirstPage, &payload).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingField { ref sheet, ref field } if sheet == "First Page" && field == "totals.premium"
        ));
    }

    #[test]
    fn sheet_names_and_slugs() {
        assert_eq!(SheetKind::CertificateIii.slug(), "certificate_iii");
        assert_eq!(SheetKind::from_name("Note Sheet"), Some(SheetKind::NoteSheet));
        assert_eq!(SheetKind::from_name("deviation-statement"), Some(SheetKind::DeviationStatement));
        assert_eq!(SheetKind::from_name("cover"), None);
    }
}
