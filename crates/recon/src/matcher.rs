use std::collections::HashMap;

use tracing::debug;

use crate::model::LineItem;

/// A Work Order item and the Bill item it was joined to, if any.
#[derive(Debug, Clone, Copy)]
pub struct MatchedLine<'a> {
    pub work_order: &'a LineItem,
    pub bill: Option<&'a LineItem>,
}

impl MatchedLine<'_> {
    pub fn bill_quantity(&self) -> f64 {
        self.bill.map(|b| b.quantity).unwrap_or(0.0)
    }

    pub fn bill_amount(&self) -> f64 {
        self.bill.map(|b| b.amount).unwrap_or(0.0)
    }
}

/// Join each Work Order item to the first Bill item sharing its match key.
///
/// Keys are not assumed unique: when several Bill rows carry the same key the
/// earliest one in sheet order wins, and a single Bill row may serve several
/// Work Order rows. Bill rows whose key appears in no Work Order row are left
/// out of the join.
pub fn match_first_key<'a>(work_order: &'a [LineItem], bill: &'a [LineItem]) -> Vec<MatchedLine<'a>> {
    let mut first_by_key: HashMap<&str, &LineItem> = HashMap::with_capacity(bill.len());
    for item in bill {
        first_by_key.entry(item.match_key.as_str()).or_insert(item);
    }

    let matched: Vec<MatchedLine<'a>> = work_order
        .iter()
        .map(|wo| MatchedLine {
            work_order: wo,
            bill: first_by_key.get(wo.match_key.as_str()).copied(),
        })
        .collect();

    let unclaimed = bill
        .iter()
        .filter(|b| !work_order.iter().any(|wo| wo.match_key == b.match_key))
        .count();
    if unclaimed > 0 {
        debug!(unclaimed, "bill rows with no work order counterpart were not joined");
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(serial: &str, key: &str, qty: f64, amount: f64) -> LineItem {
        LineItem {
            serial_no: serial.into(),
            description: format!("item {serial}"),
            unit: "cum".into(),
            quantity: qty,
            rate: 50.0,
            amount,
            match_key: key.into(),
            source_row: 22,
        }
    }

    #[test]
    fn joins_by_key_not_position() {
        let wo = vec![item("1", "BSR1", 100.0, 5000.0), item("2", "BSR2", 10.0, 500.0)];
        let bill = vec![item("a", "BSR2", 12.0, 600.0), item("b", "BSR1", 120.0, 6000.0)];
        let out = match_first_key(&wo, &bill);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bill.unwrap().serial_no, "b");
        assert_eq!(out[1].bill.unwrap().serial_no, "a");
    }

    #[test]
    fn unmatched_defaults_to_zero() {
        let wo = vec![item("1", "BSR1", 100.0, 5000.0)];
        let bill = vec![item("a", "BSR9", 5.0, 250.0)];
        let out = match_first_key(&wo, &bill);
        assert!(out[0].bill.is_none());
        assert_eq!(out[0].bill_quantity(), 0.0);
        assert_eq!(out[0].bill_amount(), 0.0);
    }

    #[test]
    fn duplicate_bill_keys_resolve_to_first_in_order() {
        let wo = vec![item("1", "BSR1", 100.0, 5000.0)];
        let bill = vec![
            item("first", "BSR1", 80.0, 4000.0),
            item("second", "BSR1", 120.0, 6000.0),
        ];
        let out = match_first_key(&wo, &bill);
        assert_eq!(out[0].bill.unwrap().serial_no, "first");
        assert_eq!(out[0].bill_quantity(), 80.0);
    }

    #[test]
    fn one_bill_row_can_serve_repeated_work_order_keys() {
        let wo = vec![item("1", "BSR1", 100.0, 5000.0), item("1a", "BSR1", 20.0, 1000.0)];
        let bill = vec![item("a", "BSR1", 90.0, 4500.0)];
        let out = match_first_key(&wo, &bill);
        assert_eq!(out[0].bill.unwrap().serial_no, "a");
        assert_eq!(out[1].bill.unwrap().serial_no, "a");
    }

    #[test]
    fn preserves_work_order_order() {
        let wo = vec![
            item("3", "K3", 1.0, 1.0),
            item("1", "K1", 1.0, 1.0),
            item("2", "K2", 1.0, 1.0),
        ];
        let out = match_first_key(&wo, &[]);
        let serials: Vec<&str> = out.iter().map(|m| m.work_order.serial_no.as_str()).collect();
        assert_eq!(serials, vec!["3", "1", "2"]);
    }
}
