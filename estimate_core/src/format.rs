//! # Number Formatting
//!
//! Two families of helpers:
//!
//! - [`format_quantity`] builds the plain quantity strings that go into row
//!   volume labels (`"17.6"`, `"216"`). These are part of the estimate and
//!   stay locale-neutral.
//! - The `ru_*` / money helpers format values for the rendered document only:
//!   non-breaking-space thousands separators and a decimal comma.

use chrono::NaiveDate;

/// Thousands separator used in rendered documents (U+00A0)
pub const GROUP_SEPARATOR: char = '\u{00A0}';

/// Currency sign appended to money amounts
pub const CURRENCY_SIGN: &str = "₽";

/// Round to at most `max_decimals` places and drop trailing zeros.
///
/// ```rust
/// use estimate_core::format::format_quantity;
///
/// assert_eq!(format_quantity(17.600000000000001, 2), "17.6");
/// assert_eq!(format_quantity(216.0, 1), "216");
/// ```
pub fn format_quantity(value: f64, max_decimals: usize) -> String {
    let text = format!("{:.*}", max_decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Insert a group separator every three digits of an integer.
pub fn group_thousands(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(digits.len() + len / 3 * 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Whole-rouble amount, e.g. `"2 364 869 ₽"`.
pub fn format_money(amount: i64) -> String {
    format!("{}{}{}", group_thousands(amount), GROUP_SEPARATOR, CURRENCY_SIGN)
}

/// Decimal number in Russian notation, e.g. `"10,5"` or `"1 200"`.
///
/// Works on the digit string, so magnitudes beyond `i64` keep every digit.
pub fn format_decimal_ru(value: f64, max_decimals: usize) -> String {
    let plain = format_quantity(value, max_decimals);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut text = format!("{}{}", sign, group_digits(int_part));
    if let Some(frac) = frac_part {
        text.push(',');
        text.push_str(frac);
    }
    text
}

/// Pick the Russian plural form for a count.
///
/// ```rust
/// use estimate_core::format::ru_plural;
///
/// assert_eq!(ru_plural(1, "этаж", "этажа", "этажей"), "этаж");
/// assert_eq!(ru_plural(2, "этаж", "этажа", "этажей"), "этажа");
/// assert_eq!(ru_plural(11, "этаж", "этажа", "этажей"), "этажей");
/// ```
pub fn ru_plural<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let tens = n % 100;
    if (11..=14).contains(&tens) {
        return many;
    }
    match n % 10 {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

/// Date as `dd.mm.yyyy`
pub fn format_date_ru(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
