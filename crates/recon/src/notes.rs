//! Note sheet statements derived from the bill totals.

use crate::config::NotesConfig;
use crate::model::{NotesBlock, NotesTotals, PremiumLine, PremiumType};

const SIGNATORY_INDENT: &str = "                                ";
const DESIGNATION_INDENT: &str = "                               ";

/// Float text as the note sheet has always shown it: whole amounts keep one
/// decimal (`8000.0`), others print in shortest form (`8000.25`).
fn plain_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.is_finite() {
        format!("{amount:.1}")
    } else {
        format!("{amount}")
    }
}

/// `part / whole` as a percentage, or 0 when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Generate the numbered advisory notes.
///
/// The >100-105% and >105% completion bands currently print the same message,
/// as do the two extra-item bands.
#[allow(clippy::if_same_then_else)]
pub fn generate_notes(
    payable_amount: f64,
    work_order_amount: f64,
    extra_item_amount: f64,
    signature: &NotesConfig,
) -> NotesBlock {
    let percentage_work_done = percent_of(payable_amount, work_order_amount);

    let mut statements = vec![format!(
        "The work has been completed {percentage_work_done:.2}% of the Work Order Amount."
    )];

    if percentage_work_done < 90.0 {
        statements.push("The execution of work at final stage is less than 90%...".to_string());
    } else if percentage_work_done > 100.0 && percentage_work_done <= 105.0 {
        statements.push("Requisite Deviation Statement is enclosed...".to_string());
    } else if percentage_work_done > 105.0 {
        statements.push("Requisite Deviation Statement is enclosed...".to_string());
    }

    statements.push("Quality Control (QC) test reports attached.".to_string());

    if extra_item_amount > 0.0 {
        let extra_percentage = percent_of(extra_item_amount, work_order_amount);
        let amount = plain_amount(extra_item_amount);
        if extra_percentage > 5.0 {
            statements.push(format!("The amount of Extra items is Rs. {amount}..."));
        } else {
            statements.push(format!("The amount of Extra items is Rs. {amount}..."));
        }
    }

    statements.push("Please peruse above details for necessary decision-making.".to_string());

    let mut notes: Vec<String> = statements
        .into_iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect();
    notes.push(String::new());
    notes.push(format!("{SIGNATORY_INDENT}{}", signature.signatory));
    notes.push(format!("{DESIGNATION_INDENT}{}", signature.designation));

    NotesBlock {
        notes,
        work_order_amount,
        percentage_work_done,
        totals: NotesTotals {
            grand_total: payable_amount,
            premium: PremiumLine {
                percent: 0.0,
                premium_type: PremiumType::Above,
                amount: 0.0,
            },
            payable: payable_amount,
            extra_items_sum: extra_item_amount,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(payable: f64, wo: f64, extra: f64) -> NotesBlock {
        generate_notes(payable, wo, extra, &NotesConfig::default())
    }

    #[test]
    fn zero_work_order_amount_is_zero_percent() {
        let block = notes(500.0, 0.0, 0.0);
        assert_eq!(block.percentage_work_done, 0.0);
        assert_eq!(
            block.notes[0],
            "1. The work has been completed 0.00% of the Work Order Amount."
        );
        // below 90% caution fires for 0%
        assert!(block.notes[1].starts_with("2. The execution of work at final stage"));
    }

    #[test]
    fn within_band_has_no_caution() {
        let block = notes(95_000.0, 100_000.0, 0.0);
        assert_eq!(block.notes[0], "1. The work has been completed 95.00% of the Work Order Amount.");
        assert_eq!(block.notes[1], "2. Quality Control (QC) test reports attached.");
        assert_eq!(block.notes[2], "3. Please peruse above details for necessary decision-making.");
        assert_eq!(block.notes.len(), 6);
    }

    #[test]
    fn over_completion_bands_share_text() {
        let mild = notes(103_000.0, 100_000.0, 0.0);
        let heavy = notes(120_000.0, 100_000.0, 0.0);
        assert_eq!(mild.notes[1], "2. Requisite Deviation Statement is enclosed...");
        assert_eq!(mild.notes[1], heavy.notes[1]);
    }

    #[test]
    fn exactly_one_hundred_percent_has_no_caution() {
        let block = notes(100_000.0, 100_000.0, 0.0);
        assert_eq!(block.notes[1], "2. Quality Control (QC) test reports attached.");
    }

    #[test]
    fn extra_items_note_renumbers() {
        let block = notes(50_000.0, 100_000.0, 8_000.0);
        assert_eq!(block.notes[1], "2. The execution of work at final stage is less than 90%...");
        assert_eq!(block.notes[2], "3. Quality Control (QC) test reports attached.");
        assert_eq!(block.notes[3], "4. The amount of Extra items is Rs. 8000.0...");
        assert_eq!(block.notes[4], "5. Please peruse above details for necessary decision-making.");
        assert_eq!(block.totals.extra_items_sum, 8_000.0);

        let small = notes(50_000.0, 100_000.0, 1_000.0);
        assert_eq!(small.notes[3], "4. The amount of Extra items is Rs. 1000.0...");

        let fractional = notes(50_000.0, 100_000.0, 1_250.75);
        assert_eq!(fractional.notes[3], "4. The amount of Extra items is Rs. 1250.75...");
    }

    #[test]
    fn signature_block_closes_notes() {
        let block = notes(95_000.0, 100_000.0, 0.0);
        let n = block.notes.len();
        assert_eq!(block.notes[n - 3], "");
        assert_eq!(block.notes[n - 2], format!("{}Premlata Jain", " ".repeat(32)));
        assert_eq!(block.notes[n - 1], format!("{}AAO- As Auditor", " ".repeat(31)));
    }

    #[test]
    fn echoes_totals() {
        let block = notes(95_000.0, 100_000.0, 0.0);
        assert_eq!(block.work_order_amount, 100_000.0);
        assert_eq!(block.totals.grand_total, 95_000.0);
        assert_eq!(block.totals.payable, 95_000.0);
    }
}
