use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::BillContext;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub context: BillContext,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

fn default_name() -> String {
    "bill".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            context: BillContext::default(),
            layout: LayoutConfig::default(),
            notes: NotesConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet layout
// ---------------------------------------------------------------------------

/// Zero-based column positions of each field within a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub serial: usize,
    pub description: usize,
    pub unit: usize,
    pub quantity: usize,
    pub rate: usize,
    pub amount: usize,
    /// Rate-schedule code used to join Work Order and Bill rows.
    pub match_key: Option<usize>,
}

impl ColumnMap {
    fn all(&self) -> Vec<(&'static str, usize)> {
        let mut cols = vec![
            ("serial", self.serial),
            ("description", self.description),
            ("unit", self.unit),
            ("quantity", self.quantity),
            ("rate", self.rate),
            ("amount", self.amount),
        ];
        if let Some(key) = self.match_key {
            cols.push(("match_key", key));
        }
        cols
    }

    /// Minimum row width needed to read every mapped column.
    pub fn width(&self) -> usize {
        self.all().iter().map(|(_, c)| c + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
    /// Sheet name inside the workbook.
    pub sheet: String,
    /// Title/header rows to skip before line items begin.
    pub header_rows: usize,
    pub columns: ColumnMap,
}

impl SheetLayout {
    pub fn work_order() -> Self {
        Self {
            sheet: "Work Order".into(),
            header_rows: 21,
            columns: ColumnMap {
                serial: 0,
                description: 1,
                unit: 2,
                quantity: 3,
                rate: 4,
                amount: 5,
                match_key: Some(6),
            },
        }
    }

    pub fn bill_quantity() -> Self {
        Self {
            sheet: "Bill Quantity".into(),
            ..Self::work_order()
        }
    }

    pub fn extra_items() -> Self {
        Self {
            sheet: "Extra Items".into(),
            header_rows: 0,
            columns: ColumnMap {
                serial: 0,
                description: 2,
                unit: 3,
                quantity: 4,
                rate: 5,
                amount: 6,
                match_key: None,
            },
        }
    }

    fn apply(mut self, patch: Option<SheetLayoutPatch>) -> Self {
        let Some(patch) = patch else {
            return self;
        };
        if let Some(sheet) = patch.sheet {
            self.sheet = sheet;
        }
        if let Some(rows) = patch.header_rows {
            self.header_rows = rows;
        }
        let c = patch.columns;
        let cols = &mut self.columns;
        cols.serial = c.serial.unwrap_or(cols.serial);
        cols.description = c.description.unwrap_or(cols.description);
        cols.unit = c.unit.unwrap_or(cols.unit);
        cols.quantity = c.quantity.unwrap_or(cols.quantity);
        cols.rate = c.rate.unwrap_or(cols.rate);
        cols.amount = c.amount.unwrap_or(cols.amount);
        if c.match_key.is_some() {
            cols.match_key = c.match_key;
        }
        self
    }
}

/// Layout of all three schedules. Any field left out of the TOML keeps the
/// standard workbook layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LayoutPatch")]
pub struct LayoutConfig {
    pub work_order: SheetLayout,
    pub bill_quantity: SheetLayout,
    pub extra_items: SheetLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            work_order: SheetLayout::work_order(),
            bill_quantity: SheetLayout::bill_quantity(),
            extra_items: SheetLayout::extra_items(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutPatch {
    work_order: Option<SheetLayoutPatch>,
    bill_quantity: Option<SheetLayoutPatch>,
    extra_items: Option<SheetLayoutPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetLayoutPatch {
    sheet: Option<String>,
    header_rows: Option<usize>,
    #[serde(default)]
    columns: ColumnPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnPatch {
    serial: Option<usize>,
    description: Option<usize>,
    unit: Option<usize>,
    quantity: Option<usize>,
    rate: Option<usize>,
    amount: Option<usize>,
    match_key: Option<usize>,
}

impl From<LayoutPatch> for LayoutConfig {
    fn from(patch: LayoutPatch) -> Self {
        Self {
            work_order: SheetLayout::work_order().apply(patch.work_order),
            bill_quantity: SheetLayout::bill_quantity().apply(patch.bill_quantity),
            extra_items: SheetLayout::extra_items().apply(patch.extra_items),
        }
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    pub signatory: String,
    pub designation: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            signatory: "Premlata Jain".into(),
            designation: "AAO- As Auditor".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let ctx = &self.context;

        if !ctx.premium_percent.is_finite() || !(0.0..=100.0).contains(&ctx.premium_percent) {
            return Err(ReconError::ConfigValidation(format!(
                "premium_percent must be between 0 and 100, got {}",
                ctx.premium_percent
            )));
        }

        if !ctx.amount_paid_last_bill.is_finite() || ctx.amount_paid_last_bill < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "amount_paid_last_bill must be non-negative, got {}",
                ctx.amount_paid_last_bill
            )));
        }

        if let Some(amount) = ctx.work_order_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "work_order_amount must be non-negative, got {amount}"
                )));
            }
        }

        let layouts = [
            &self.layout.work_order,
            &self.layout.bill_quantity,
            &self.layout.extra_items,
        ];

        let mut names = HashSet::new();
        for layout in layouts {
            if layout.sheet.trim().is_empty() {
                return Err(ReconError::ConfigValidation("sheet names must not be empty".into()));
            }
            if !names.insert(layout.sheet.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "sheet '{}' is mapped to more than one schedule",
                    layout.sheet
                )));
            }

            let mut seen: HashSet<usize> = HashSet::new();
            for (field, col) in layout.columns.all() {
                if !seen.insert(col) {
                    return Err(ReconError::ConfigValidation(format!(
                        "sheet '{}': column {col} used twice (at '{field}')",
                        layout.sheet
                    )));
                }
            }
        }

        for layout in [&self.layout.work_order, &self.layout.bill_quantity] {
            if layout.columns.match_key.is_none() {
                return Err(ReconError::ConfigValidation(format!(
                    "sheet '{}': match_key column is required",
                    layout.sheet
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
