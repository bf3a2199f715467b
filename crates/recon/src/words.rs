//! Rupee amounts in Indian-English words (lakh/crore grouping).

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// `1234567.5` → `"Rupees Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven and Fifty Paise Only"`.
///
/// Rounds to whole paise. Non-finite input yields an empty string.
pub fn amount_in_words(amount: f64) -> String {
    if !amount.is_finite() {
        return String::new();
    }

    let total_paise = (amount.abs() * 100.0).round() as u64;
    let rupees = total_paise / 100;
    let paise = total_paise % 100;

    let mut out = String::from("Rupees ");
    if amount < 0.0 && total_paise > 0 {
        out.push_str("Minus ");
    }
    out.push_str(&number_in_words(rupees));
    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&number_in_words(paise));
        out.push_str(" Paise");
    }
    out.push_str(" Only");
    out
}

/// Whole number in words with Indian grouping. Crores above 99 recurse, so
/// 1,000 crore reads "One Thousand Crore".
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let crore = n / 10_000_000;
    let rest = n % 10_000_000;

    if crore > 0 {
        parts.push(format!("{} Crore", number_in_words(crore)));
    }

    let lakh = rest / 100_000;
    let thousand = (rest % 100_000) / 1_000;
    let hundred = (rest % 1_000) / 100;
    let below_hundred = rest % 100;

    if lakh > 0 {
        parts.push(format!("{} Lakh", two_digits(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", two_digits(thousand)));
    }
    if hundred > 0 {
        parts.push(format!("{} Hundred", ONES[hundred as usize]));
    }
    if below_hundred > 0 {
        parts.push(two_digits(below_hundred));
    }

    parts.join(" ")
}

fn two_digits(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}
