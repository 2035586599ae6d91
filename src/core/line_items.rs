//! Budget and SKU line item arithmetic.
//!
//! Drafts are the editable form of line items: the id is kept when a draft was
//! loaded from the database so that saving updates the row in place.

use crate::{
    core::{bounded, checked_sum, non_negative, required_field},
    entities::{BudgetLine, SkuLine, budget_line, sku_line},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, prelude::*};

/// SKU code written on the aggregate row
pub const TOTAL_SKU: &str = "TOTAL";

/// `srp * qty - discount`, rejected when it leaves the storable range.
pub fn billing_amount(srp: Decimal, qty: i32, discount: Decimal) -> Result<Decimal> {
    let gross = bounded(srp.checked_mul(Decimal::from(qty)), "SRP x Quantity")?;
    bounded(gross.checked_sub(discount), "Billing amount")
}

/// An account's allocation as edited by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetLineDraft {
    /// Row id when the line already exists
    pub id: Option<i64>,
    /// Account reference code
    pub account_code: String,
    /// Account name shown in the budget table
    pub account_name: String,
    /// Allocated amount
    pub budget: Decimal,
}

impl BudgetLineDraft {
    /// A new, unsaved line.
    #[must_use]
    pub fn new(
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        budget: Decimal,
    ) -> Self {
        Self {
            id: None,
            account_code: account_code.into(),
            account_name: account_name.into(),
            budget,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        required_field(&self.account_code, "Account")?;
        non_negative(self.budget, "Budget")?;
        Ok(())
    }
}

impl From<budget_line::Model> for BudgetLineDraft {
    fn from(line: budget_line::Model) -> Self {
        Self {
            id: Some(line.id),
            account_code: line.account_code,
            account_name: line.account_name,
            budget: line.budget,
        }
    }
}

/// A SKU billed under a promotion as edited by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuLineDraft {
    /// Row id when the line already exists
    pub id: Option<i64>,
    /// SKU reference code
    pub sku: String,
    /// Suggested retail price per unit
    pub srp: Decimal,
    /// Quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Discount on the whole line
    pub discount: Decimal,
}

impl SkuLineDraft {
    /// A new, unsaved line.
    #[must_use]
    pub fn new(
        sku: impl Into<String>,
        srp: Decimal,
        qty: i32,
        uom: impl Into<String>,
        discount: Decimal,
    ) -> Self {
        Self {
            id: None,
            sku: sku.into(),
            srp,
            qty,
            uom: uom.into(),
            discount,
        }
    }

    /// `srp * qty - discount` for this line.
    pub fn billing_amount(&self) -> Result<Decimal> {
        billing_amount(self.srp, self.qty, self.discount)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let sku = required_field(&self.sku, "SKU")?;
        if sku.eq_ignore_ascii_case(TOTAL_SKU) {
            return Err(Error::InvalidAmount {
                field: "SKU",
                value: sku,
            });
        }
        required_field(&self.uom, "UOM")?;
        non_negative(self.srp, "SRP")?;
        non_negative(self.discount, "Discount")?;
        if self.qty <= 0 {
            return Err(Error::InvalidAmount {
                field: "Quantity",
                value: self.qty.to_string(),
            });
        }
        self.billing_amount()?;
        Ok(())
    }
}

impl From<sku_line::Model> for SkuLineDraft {
    fn from(line: sku_line::Model) -> Self {
        Self {
            id: Some(line.id),
            sku: line.sku,
            srp: line.srp,
            qty: line.qty,
            uom: line.uom,
            discount: line.discount,
        }
    }
}

/// Sums over a promotion's line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTotals {
    /// Sum of budget lines
    pub budget_total: Decimal,
    /// Sum of SKU billing amounts, item rows only
    pub sku_total: Decimal,
}

impl LineTotals {
    /// Computes the totals of both line item lists.
    pub fn of(budget_lines: &[BudgetLineDraft], sku_lines: &[SkuLineDraft]) -> Result<Self> {
        let budget_total =
            checked_sum(budget_lines.iter().map(|line| Ok(line.budget)), "Budget total")?;
        let sku_total =
            checked_sum(sku_lines.iter().map(SkuLineDraft::billing_amount), "SKU total")?;
        let totals = Self {
            budget_total,
            sku_total,
        };
        totals.total()?;
        Ok(totals)
    }

    /// Amount committed by all line items; persisted as `credit_budget`.
    pub fn total(&self) -> Result<Decimal> {
        bounded(self.budget_total.checked_add(self.sku_total), "Line item total")
    }

    /// Balance left after the line items.
    pub fn remaining_from(&self, initial_remaining_balance: Decimal) -> Result<Decimal> {
        bounded(
            initial_remaining_balance.checked_sub(self.total()?),
            "Remaining balance",
        )
    }
}

/// Values of the aggregate SKU row.
///
/// `srp` carries the gross amount at `qty = 1`, so the row satisfies the same
/// `srp * qty - discount` identity as the item rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuTotalRow {
    /// `sum(srp * qty)`
    pub srp: Decimal,
    /// Always 1
    pub qty: i32,
    /// `sum(discount)`
    pub discount: Decimal,
    /// `srp - discount`
    pub billing_amount: Decimal,
}

impl SkuTotalRow {
    /// Aggregates item rows. `None` when there are no items.
    pub fn of(sku_lines: &[SkuLineDraft]) -> Result<Option<Self>> {
        if sku_lines.is_empty() {
            return Ok(None);
        }
        let gross = sku_lines
            .iter()
            .map(|line| bounded(line.srp.checked_mul(Decimal::from(line.qty)), "SRP x Quantity"));
        let srp = checked_sum(gross, "SKU gross total")?;
        let discount =
            checked_sum(sku_lines.iter().map(|line| Ok(line.discount)), "Discount total")?;
        Ok(Some(Self {
            srp,
            qty: 1,
            discount,
            billing_amount: billing_amount(srp, 1, discount)?,
        }))
    }
}

/// Budget lines of a regular promotion, ordered by account code.
pub async fn budget_lines_for<C>(db: &C, regular_code: &str) -> Result<Vec<budget_line::Model>>
where
    C: ConnectionTrait,
{
    BudgetLine::find()
        .filter(budget_line::Column::RegularCode.eq(regular_code))
        .order_by_asc(budget_line::Column::AccountCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// SKU lines of a regular promotion: item rows by SKU, then the total row.
pub async fn sku_lines_for<C>(db: &C, regular_code: &str) -> Result<Vec<sku_line::Model>>
where
    C: ConnectionTrait,
{
    SkuLine::find()
        .filter(sku_line::Column::RegularCode.eq(regular_code))
        .order_by_asc(sku_line::Column::RowType)
        .order_by_asc(sku_line::Column::Sku)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::max_amount;
    use rust_decimal_macros::dec;

    #[test]
    fn test_billing_amount() {
        assert_eq!(billing_amount(dec!(100), 3, dec!(50)).unwrap(), dec!(250));
        assert_eq!(billing_amount(dec!(19.99), 2, dec!(0)).unwrap(), dec!(39.98));
    }

    #[test]
    fn test_billing_amount_out_of_range_is_an_error() {
        assert!(matches!(
            billing_amount(Decimal::MAX, 2, dec!(0)),
            Err(Error::InvalidAmount { field: "SRP x Quantity", .. })
        ));
        assert!(matches!(
            billing_amount(max_amount(), 2, dec!(0)),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(billing_amount(dec!(0), 1, Decimal::MAX).is_err());

        let huge = SkuLineDraft::new("6000", Decimal::MAX, 2, "CS", dec!(0));
        assert!(huge.validate().is_err());
        assert!(huge.billing_amount().is_err());
        assert!(LineTotals::of(&[], &[huge.clone()]).is_err());
        assert!(SkuTotalRow::of(&[huge]).is_err());
    }

    #[test]
    fn test_totals_and_remaining() {
        let budget = vec![
            BudgetLineDraft::new("A00001", "Puregold", dec!(2000)),
            BudgetLineDraft::new("A00002", "Robinsons", dec!(3000)),
        ];
        let totals = LineTotals::of(&budget, &[]).unwrap();
        assert_eq!(totals.total().unwrap(), dec!(5000));
        assert_eq!(totals.remaining_from(dec!(10000)).unwrap(), dec!(5000));

        let skus = vec![SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50))];
        let totals = LineTotals::of(&budget, &skus).unwrap();
        assert_eq!(totals.sku_total, dec!(250));
        assert_eq!(totals.remaining_from(dec!(10000)).unwrap(), dec!(4750));
    }

    #[test]
    fn test_totals_above_cap_are_rejected() {
        let budget = vec![
            BudgetLineDraft::new("A00001", "Puregold", max_amount()),
            BudgetLineDraft::new("A00002", "Robinsons", dec!(0.01)),
        ];
        assert!(matches!(
            LineTotals::of(&budget, &[]),
            Err(Error::InvalidAmount { field: "Budget total", .. })
        ));

        let totals = LineTotals {
            budget_total: Decimal::MAX,
            sku_total: Decimal::MAX,
        };
        assert!(totals.total().is_err());
        assert!(totals.remaining_from(dec!(0)).is_err());
    }

    #[test]
    fn test_total_row_keeps_billing_identity() {
        let skus = vec![
            SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)),
            SkuLineDraft::new("6001", dec!(12.50), 4, "PC", dec!(5)),
        ];
        let total = SkuTotalRow::of(&skus).unwrap().unwrap();
        assert_eq!(total.srp, dec!(350));
        assert_eq!(total.discount, dec!(55));
        assert_eq!(total.billing_amount, dec!(295));
        assert_eq!(
            total.billing_amount,
            billing_amount(total.srp, total.qty, total.discount).unwrap()
        );
        let item_sum: Decimal = skus.iter().map(|line| line.billing_amount().unwrap()).sum();
        assert_eq!(total.billing_amount, item_sum);

        assert!(SkuTotalRow::of(&[]).unwrap().is_none());
    }

    #[test]
    fn test_draft_validation() {
        assert!(BudgetLineDraft::new("", "X", dec!(1)).validate().is_err());
        assert!(BudgetLineDraft::new("A00001", "X", dec!(-1)).validate().is_err());
        assert!(BudgetLineDraft::new("A00001", "X", dec!(0)).validate().is_ok());
        assert!(BudgetLineDraft::new("A00001", "X", dec!(0.001)).validate().is_err());

        assert!(SkuLineDraft::new("6000", dec!(1), 0, "CS", dec!(0)).validate().is_err());
        assert!(SkuLineDraft::new("total", dec!(1), 1, "CS", dec!(0)).validate().is_err());
        assert!(SkuLineDraft::new("6000", dec!(1), 1, " ", dec!(0)).validate().is_err());
        assert!(SkuLineDraft::new("6000", dec!(1), 1, "CS", dec!(0)).validate().is_ok());
        assert!(
            SkuLineDraft::new("6000", max_amount(), i32::MAX, "CS", dec!(0))
                .validate()
                .is_err()
        );
    }
}
