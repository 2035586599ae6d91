//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Attachment metadata commands
pub mod attachment;

/// General utility commands
pub mod general;

/// Budget and SKU line item commands
pub mod line_items;

/// Promotion commands
pub mod pwp;

/// Reference data commands
pub mod reference;

// Export commands
pub use attachment::*;
pub use general::*;
pub use line_items::*;
pub use pwp::*;
pub use reference::*;

use rust_decimal::Decimal;

/// Renders an amount with two decimals and thousands separators.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(950.5)), "950.50");
        assert_eq!(format_amount(dec!(10000)), "10,000.00");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(-2500)), "-2,500.00");
    }
}
