//! Core business logic - framework-agnostic operations on reference data and
//! promotions. Nothing in here knows about Discord.

/// Approval status transitions and history
pub mod approval;
/// Attachment metadata
pub mod attachment;
/// Cascading deletes of promotions
pub mod cascade;
/// Sequential code generation
pub mod code;
/// Budget and SKU line item arithmetic
pub mod line_items;
/// Unified cover/regular promotion listing
pub mod listing;
/// Search and pagination for list panels
pub mod page;
/// Promotion forms and header updates
pub mod pwp;
/// Line item reconciliation against the parent promotion
pub mod reconcile;
/// Generic reference-data editor
pub mod reference;
/// Operator session passed into every mutating call
pub mod session;

use crate::errors::{Error, Result};
use rust_decimal::Decimal;

/// Decimal places kept on every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest magnitude an amount may have: 999,999,999,999.99.
///
/// The SQLite backend stores amounts as `REAL`, which round-trips at most 15
/// significant digits, so anything wider would be silently rounded.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, AMOUNT_SCALE)
}

/// Trims a required form field, rejecting blank input.
pub(crate) fn required_field(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingField { field });
    }
    Ok(trimmed.to_string())
}

/// Trims an optional form field; blank becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects negative amounts, more than [`AMOUNT_SCALE`] decimals and anything
/// above [`max_amount`].
pub(crate) fn non_negative(amount: Decimal, field: &'static str) -> Result<Decimal> {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    if negative || amount.normalize().scale() > AMOUNT_SCALE || amount > max_amount() {
        return Err(Error::InvalidAmount {
            field,
            value: amount.to_string(),
        });
    }
    Ok(amount)
}

/// Checks the outcome of a `checked_*` operation: `None` (overflow) and
/// results outside [`max_amount`] are rejected.
pub(crate) fn bounded(amount: Option<Decimal>, field: &'static str) -> Result<Decimal> {
    match amount {
        Some(value) if value.abs() <= max_amount() => Ok(value),
        Some(value) => Err(Error::InvalidAmount {
            field,
            value: value.to_string(),
        }),
        None => Err(Error::InvalidAmount {
            field,
            value: "overflow".to_string(),
        }),
    }
}

/// Sums amounts with [`bounded`] applied at every step.
pub(crate) fn checked_sum<I>(amounts: I, field: &'static str) -> Result<Decimal>
where
    I: IntoIterator<Item = Result<Decimal>>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| bounded(acc.checked_add(amount?), field))
}

/// Parses an amount typed by an operator (e.g. `"1,250.50"`).
pub fn parse_amount(raw: &str, field: &'static str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    let amount: Decimal = cleaned.parse().map_err(|_| Error::InvalidAmount {
        field,
        value: raw.to_string(),
    })?;
    non_negative(amount, field)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_required_field() {
        assert_eq!(required_field("  Cola ", "Name").unwrap(), "Cola");
        assert!(matches!(
            required_field(" ", "Name"),
            Err(Error::MissingField { field: "Name" })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.50", "Budget").unwrap(), dec!(1250.50));
        assert_eq!(parse_amount("0", "Budget").unwrap(), dec!(0));
        assert_eq!(parse_amount("12.500", "Budget").unwrap(), dec!(12.5));
        assert!(matches!(
            parse_amount("-5", "Budget"),
            Err(Error::InvalidAmount { field: "Budget", .. })
        ));
        assert!(parse_amount("ten", "Budget").is_err());
    }

    #[test]
    fn test_amounts_are_capped() {
        assert_eq!(max_amount(), dec!(999_999_999_999.99));
        assert_eq!(
            parse_amount("999,999,999,999.99", "Budget").unwrap(),
            max_amount()
        );
        // 16 significant digits cannot be stored exactly.
        assert!(matches!(
            parse_amount("98765432109876.53", "SRP"),
            Err(Error::InvalidAmount { field: "SRP", .. })
        ));
        assert!(matches!(
            parse_amount("1.005", "Discount"),
            Err(Error::InvalidAmount { field: "Discount", .. })
        ));
        assert!(non_negative(Decimal::MAX, "SRP").is_err());
    }

    #[test]
    fn test_checked_sum_rejects_overflow() {
        let ok = checked_sum([Ok(dec!(1.50)), Ok(dec!(2.25))], "Total").unwrap();
        assert_eq!(ok, dec!(3.75));

        let over = checked_sum([Ok(max_amount()), Ok(dec!(0.01))], "Total");
        assert!(matches!(over, Err(Error::InvalidAmount { field: "Total", .. })));

        let overflow = checked_sum([Ok(Decimal::MAX), Ok(Decimal::MAX)], "Total");
        assert!(matches!(overflow, Err(Error::InvalidAmount { .. })));
        assert!(bounded(Decimal::MAX.checked_add(Decimal::ONE), "Total").is_err());
    }
}
