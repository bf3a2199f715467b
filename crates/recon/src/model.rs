use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Text that spreadsheet exports use for "no value". Compared exactly, so
/// `" N/A"` or `"Nil"` stay ordinary text.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

/// A raw spreadsheet cell as handed over by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Display text of the cell, trimmed. Whole numbers render without a
    /// decimal point so serials like `1` don't become `1.0`.
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) if is_missing_marker(s) => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) if n.is_nan() => String::new(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }

    /// Raw text for diagnostics: no trimming, so operators see what was there.
    pub fn raw(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(_) => self.text(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() || is_missing_marker(s) {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Rows of cells. Rows may be ragged; cells past a row's end read as empty.
pub type Table = Vec<Vec<Cell>>;

/// Fetch a cell, treating anything past the row end as empty.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

/// Pre-loaded sheets keyed by sheet name.
#[derive(Debug, Default)]
pub struct BillInput {
    pub sheets: HashMap<String, Table>,
}

impl BillInput {
    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.sheets.insert(name.into(), table);
        self
    }
}

// ---------------------------------------------------------------------------
// Bill context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumType {
    #[default]
    Above,
    Below,
}

impl PremiumType {
    /// +1 for a premium added on top, -1 for a rebate below the base rate.
    pub fn sign(self) -> f64 {
        match self {
            Self::Above => 1.0,
            Self::Below => -1.0,
        }
    }
}

impl std::fmt::Display for PremiumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// Caller-supplied metadata for one bill. Dates are free text and are passed
/// through to the renderers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillContext {
    pub work_name: String,
    pub contractor_name: String,
    pub agreement_no: String,
    pub bill_serial: String,
    pub work_order_ref: String,
    pub last_bill_no: String,
    pub cash_voucher_no: String,
    pub cash_voucher_date: String,
    pub start_date: String,
    pub completion_date: String,
    pub actual_completion_date: String,
    pub written_order_date: String,
    /// Sanctioned work order amount. Falls back to the deviation statement's
    /// work order grand total when absent.
    pub work_order_amount: Option<f64>,
    /// Tender premium in percent (0-100).
    pub premium_percent: f64,
    pub premium_type: PremiumType,
    pub amount_paid_last_bill: f64,
    pub is_first_bill: bool,
}

impl BillContext {
    /// Signed premium on `base` per the configured percent and type.
    pub fn premium_on(&self, base: f64) -> f64 {
        base * self.premium_percent / 100.0 * self.premium_type.sign()
    }
}

// ---------------------------------------------------------------------------
// Parsed schedules
// ---------------------------------------------------------------------------

/// One validated row from the Work Order, Bill Quantity or Extra Items sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub serial_no: String,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub rate: f64,
    /// Taken from the sheet as-is, not recomputed from quantity x rate.
    pub amount: f64,
    pub match_key: String,
    /// 1-based spreadsheet row the item came from.
    pub source_row: usize,
}

/// A row dropped because one of its numeric cells was not usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowWarning {
    pub sheet: String,
    pub row: usize,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSchedule {
    pub items: Vec<LineItem>,
    pub warnings: Vec<RowWarning>,
}

// ---------------------------------------------------------------------------
// Current bill (First Page)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentBillRow {
    pub serial_no: String,
    pub description: String,
    pub unit: String,
    pub rate: f64,
    /// `None` on subsequent bills: carry-forward from the prior bill is not
    /// computed, and zero would be a lie.
    pub qty_since_last: Option<f64>,
    pub qty_upto_date: f64,
    pub amount_upto_date: f64,
    pub amount_since_prev: Option<f64>,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumLine {
    pub percent: f64,
    #[serde(rename = "type")]
    pub premium_type: PremiumType,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentBillTotals {
    pub grand_total: f64,
    pub premium: PremiumLine,
    pub payable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentBillTable {
    pub items: Vec<CurrentBillRow>,
    pub totals: CurrentBillTotals,
}

// ---------------------------------------------------------------------------
// Deviation statement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    WorkOrder,
    ExtraItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationEntry {
    pub serial_no: String,
    pub description: String,
    pub unit: String,
    pub qty_wo: f64,
    pub rate: f64,
    pub amt_wo: f64,
    pub qty_bill: f64,
    pub amt_bill: f64,
    pub excess_qty: f64,
    pub excess_amt: f64,
    pub saving_qty: f64,
    pub saving_amt: f64,
    pub remark: String,
    pub source: EntrySource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumSpec {
    pub percent: f64,
    #[serde(rename = "type")]
    pub premium_type: PremiumType,
}

/// Column letters follow the printed statement: F = work order amount,
/// H = executed amount, J = excess amount, L = saving amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationSummary {
    pub work_order_total: f64,
    pub executed_total: f64,
    pub overall_excess: f64,
    pub overall_saving: f64,
    pub premium: PremiumSpec,
    pub tender_premium_f: f64,
    pub tender_premium_h: f64,
    pub tender_premium_j: f64,
    pub tender_premium_l: f64,
    pub grand_total_f: f64,
    pub grand_total_h: f64,
    pub grand_total_j: f64,
    pub grand_total_l: f64,
    /// Positive = net excess over the work order, negative = net saving.
    pub net_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationStatement {
    pub items: Vec<DeviationEntry>,
    pub summary: DeviationSummary,
}

// ---------------------------------------------------------------------------
// Notes + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotesTotals {
    pub grand_total: f64,
    pub premium: PremiumLine,
    pub payable: f64,
    pub extra_items_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotesBlock {
    pub notes: Vec<String>,
    pub work_order_amount: f64,
    pub percentage_work_done: f64,
    pub totals: NotesTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderData {
    pub deviation_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub is_first_bill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub header: HeaderData,
    pub current_bill: CurrentBillTable,
    pub deviation: DeviationStatement,
    pub extra_items: Vec<LineItem>,
    pub notes: NotesBlock,
    pub warnings: Vec<RowWarning>,
}
