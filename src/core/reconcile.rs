//! Line item reconciliation.
//!
//! An [`EditSession`] holds the budget and SKU lines of one regular promotion
//! while an operator edits them. It snapshots the promotion's
//! `initial_remaining_balance` and `version` when opened, so the remaining
//! balance is always computed from the same base no matter how often the
//! lines are saved.
//!
//! [`EditSession::save`] writes everything in one transaction: line upserts,
//! removal of lines dropped from the session, the SKU total row and the
//! parent's aggregate columns. A concurrent edit of the parent fails the save
//! with [`Error::StaleRecord`] and nothing is written.

use crate::{
    core::{
        line_items::{
            BudgetLineDraft, LineTotals, SkuLineDraft, SkuTotalRow, TOTAL_SKU, budget_lines_for,
            sku_lines_for,
        },
        pwp::require_regular_pwp,
    },
    entities::{BudgetLine, RegularPwp, SkuLine, budget_line, regular_pwp, sku_line},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Line items of one regular promotion being edited.
#[derive(Debug, Clone)]
pub struct EditSession {
    regular_code: String,
    initial_remaining_balance: Decimal,
    version: i32,
    budget_lines: Vec<BudgetLineDraft>,
    sku_lines: Vec<SkuLineDraft>,
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Parent promotion after the save
    pub regular: regular_pwp::Model,
    /// Budget lines as stored
    pub budget_lines: Vec<budget_line::Model>,
    /// SKU lines as stored, total row last
    pub sku_lines: Vec<sku_line::Model>,
    /// Totals the parent was reconciled with
    pub totals: LineTotals,
}

impl EditSession {
    /// Loads the current lines of `regular_code`.
    pub async fn open(db: &DatabaseConnection, regular_code: &str) -> Result<Self> {
        let regular = require_regular_pwp(db, regular_code).await?;
        let budget_lines = budget_lines_for(db, &regular.code)
            .await?
            .into_iter()
            .map(BudgetLineDraft::from)
            .collect();
        let sku_lines = sku_lines_for(db, &regular.code)
            .await?
            .into_iter()
            .filter(|line| line.row_type == sku_line::ROW_TYPE_ITEM)
            .map(SkuLineDraft::from)
            .collect();

        Ok(Self {
            regular_code: regular.code,
            initial_remaining_balance: regular.initial_remaining_balance,
            version: regular.version,
            budget_lines,
            sku_lines,
        })
    }

    /// Code of the promotion being edited.
    #[must_use]
    pub fn regular_code(&self) -> &str {
        &self.regular_code
    }

    /// Version the session was opened at.
    #[must_use]
    pub const fn version(&self) -> i32 {
        self.version
    }

    /// Balance snapshot the remaining balance is computed from.
    #[must_use]
    pub const fn initial_remaining_balance(&self) -> Decimal {
        self.initial_remaining_balance
    }

    /// Budget lines currently in the session.
    #[must_use]
    pub fn budget_lines(&self) -> &[BudgetLineDraft] {
        &self.budget_lines
    }

    /// SKU item lines currently in the session.
    #[must_use]
    pub fn sku_lines(&self) -> &[SkuLineDraft] {
        &self.sku_lines
    }

    /// Adds a budget line, or replaces the line of the same account.
    pub fn set_budget_line(&mut self, mut draft: BudgetLineDraft) -> Result<()> {
        draft.validate()?;
        draft.account_code = draft.account_code.trim().to_string();

        if let Some(existing) = self
            .budget_lines
            .iter_mut()
            .find(|line| line.account_code == draft.account_code)
        {
            draft.id = draft.id.or(existing.id);
            *existing = draft;
        } else {
            self.budget_lines.push(draft);
        }
        Ok(())
    }

    /// Drops the line of `account_code`. Returns whether one was present.
    pub fn remove_budget_line(&mut self, account_code: &str) -> bool {
        let before = self.budget_lines.len();
        self.budget_lines
            .retain(|line| line.account_code != account_code.trim());
        self.budget_lines.len() != before
    }

    /// Adds a SKU line, or replaces the line of the same SKU.
    pub fn set_sku_line(&mut self, mut draft: SkuLineDraft) -> Result<()> {
        draft.validate()?;
        draft.sku = draft.sku.trim().to_string();
        draft.uom = draft.uom.trim().to_string();

        if let Some(existing) = self.sku_lines.iter_mut().find(|line| line.sku == draft.sku) {
            draft.id = draft.id.or(existing.id);
            *existing = draft;
        } else {
            self.sku_lines.push(draft);
        }
        Ok(())
    }

    /// Drops the line of `sku`. Returns whether one was present.
    pub fn remove_sku_line(&mut self, sku: &str) -> bool {
        let before = self.sku_lines.len();
        self.sku_lines.retain(|line| line.sku != sku.trim());
        self.sku_lines.len() != before
    }

    /// Totals of the lines in the session.
    pub fn totals(&self) -> Result<LineTotals> {
        LineTotals::of(&self.budget_lines, &self.sku_lines)
    }

    /// Remaining balance the parent would get if saved now.
    pub fn projected_remaining(&self) -> Result<Decimal> {
        self.totals()?.remaining_from(self.initial_remaining_balance)
    }

    /// Persists the session and reconciles the parent promotion.
    #[instrument(skip(self, db), fields(code = %self.regular_code, version = self.version))]
    pub async fn save(self, db: &DatabaseConnection) -> Result<ReconcileOutcome> {
        let totals = self.totals()?;
        let remaining = totals.remaining_from(self.initial_remaining_balance)?;
        let credit = totals.total()?;
        let total_row = SkuTotalRow::of(&self.sku_lines)?;

        let txn = db.begin().await?;

        let result = RegularPwp::update_many()
            .col_expr(regular_pwp::Column::RemainingBalance, Expr::value(remaining))
            .col_expr(regular_pwp::Column::CreditBudget, Expr::value(credit))
            .col_expr(regular_pwp::Column::Version, Expr::value(self.version + 1))
            .col_expr(
                regular_pwp::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().naive_utc()),
            )
            .filter(regular_pwp::Column::Code.eq(self.regular_code.as_str()))
            .filter(regular_pwp::Column::Version.eq(self.version))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::StaleRecord {
                entity: "Regular PWP",
                code: self.regular_code,
            });
        }

        write_budget_lines(&txn, &self.regular_code, &self.budget_lines).await?;
        write_sku_lines(&txn, &self.regular_code, &self.sku_lines).await?;
        write_total_row(&txn, &self.regular_code, total_row).await?;

        let regular = require_regular_pwp(&txn, &self.regular_code).await?;
        let budget_lines = budget_lines_for(&txn, &self.regular_code).await?;
        let sku_lines = sku_lines_for(&txn, &self.regular_code).await?;
        txn.commit().await?;

        info!(
            %remaining,
            %credit,
            budget_lines = budget_lines.len(),
            sku_lines = sku_lines.len(),
            "Line items reconciled"
        );

        Ok(ReconcileOutcome {
            regular,
            budget_lines,
            sku_lines,
            totals,
        })
    }
}

async fn write_budget_lines(
    txn: &DatabaseTransaction,
    regular_code: &str,
    drafts: &[BudgetLineDraft],
) -> Result<()> {
    let existing = BudgetLine::find()
        .filter(budget_line::Column::RegularCode.eq(regular_code))
        .all(txn)
        .await
        .map_err(|source| Error::LineItemWrite {
            item: "budget lines".to_string(),
            source,
        })?;

    // Pair every draft with the stored row it replaces, by id first and then
    // by account code.
    let targets: Vec<Option<&budget_line::Model>> = drafts
        .iter()
        .map(|draft| {
            draft
                .id
                .and_then(|id| existing.iter().find(|row| row.id == id))
                .or_else(|| {
                    existing
                        .iter()
                        .find(|row| row.account_code == draft.account_code)
                })
        })
        .collect();

    let kept: HashSet<i64> = targets.iter().flatten().map(|row| row.id).collect();
    let stale: Vec<i64> = existing
        .iter()
        .map(|row| row.id)
        .filter(|id| !kept.contains(id))
        .collect();
    if !stale.is_empty() {
        BudgetLine::delete_many()
            .filter(budget_line::Column::Id.is_in(stale.clone()))
            .exec(txn)
            .await
            .map_err(|source| Error::LineItemWrite {
                item: "removed budget lines".to_string(),
                source,
            })?;
        debug!(regular_code, removed = stale.len(), "Removed budget lines");
    }

    for (draft, target) in drafts.iter().zip(targets) {
        let item = format!("budget line {}", draft.account_code);
        let written = match target {
            Some(row) => {
                let mut active: budget_line::ActiveModel = row.clone().into();
                active.account_code = Set(draft.account_code.clone());
                active.account_name = Set(draft.account_name.clone());
                active.budget = Set(draft.budget);
                active.update(txn).await.map(|_| ())
            }
            None => budget_line::ActiveModel {
                regular_code: Set(regular_code.to_string()),
                account_code: Set(draft.account_code.clone()),
                account_name: Set(draft.account_name.clone()),
                budget: Set(draft.budget),
                ..Default::default()
            }
            .insert(txn)
            .await
            .map(|_| ()),
        };
        written.map_err(|source| Error::LineItemWrite { item, source })?;
    }
    Ok(())
}

async fn write_sku_lines(
    txn: &DatabaseTransaction,
    regular_code: &str,
    drafts: &[SkuLineDraft],
) -> Result<()> {
    let existing = SkuLine::find()
        .filter(sku_line::Column::RegularCode.eq(regular_code))
        .filter(sku_line::Column::RowType.eq(sku_line::ROW_TYPE_ITEM))
        .all(txn)
        .await
        .map_err(|source| Error::LineItemWrite {
            item: "SKU lines".to_string(),
            source,
        })?;

    let targets: Vec<Option<&sku_line::Model>> = drafts
        .iter()
        .map(|draft| {
            draft
                .id
                .and_then(|id| existing.iter().find(|row| row.id == id))
                .or_else(|| existing.iter().find(|row| row.sku == draft.sku))
        })
        .collect();

    let kept: HashSet<i64> = targets.iter().flatten().map(|row| row.id).collect();
    let stale: Vec<i64> = existing
        .iter()
        .map(|row| row.id)
        .filter(|id| !kept.contains(id))
        .collect();
    if !stale.is_empty() {
        SkuLine::delete_many()
            .filter(sku_line::Column::Id.is_in(stale.clone()))
            .exec(txn)
            .await
            .map_err(|source| Error::LineItemWrite {
                item: "removed SKU lines".to_string(),
                source,
            })?;
        debug!(regular_code, removed = stale.len(), "Removed SKU lines");
    }

    for (draft, target) in drafts.iter().zip(targets) {
        let item = format!("SKU line {}", draft.sku);
        let billing = draft.billing_amount()?;
        let written = match target {
            Some(row) => {
                let mut active: sku_line::ActiveModel = row.clone().into();
                active.sku = Set(draft.sku.clone());
                active.srp = Set(draft.srp);
                active.qty = Set(draft.qty);
                active.uom = Set(draft.uom.clone());
                active.discount = Set(draft.discount);
                active.billing_amount = Set(billing);
                active.update(txn).await.map(|_| ())
            }
            None => sku_line::ActiveModel {
                regular_code: Set(regular_code.to_string()),
                sku: Set(draft.sku.clone()),
                srp: Set(draft.srp),
                qty: Set(draft.qty),
                uom: Set(draft.uom.clone()),
                discount: Set(draft.discount),
                billing_amount: Set(billing),
                row_type: Set(sku_line::ROW_TYPE_ITEM.to_string()),
                ..Default::default()
            }
            .insert(txn)
            .await
            .map(|_| ()),
        };
        written.map_err(|source| Error::LineItemWrite { item, source })?;
    }
    Ok(())
}

/// Rewrites the aggregate SKU row, or removes it when there are no items.
async fn write_total_row(
    txn: &DatabaseTransaction,
    regular_code: &str,
    total: Option<SkuTotalRow>,
) -> Result<()> {
    let existing = SkuLine::find()
        .filter(sku_line::Column::RegularCode.eq(regular_code))
        .filter(sku_line::Column::RowType.eq(sku_line::ROW_TYPE_TOTAL))
        .one(txn)
        .await
        .map_err(|source| Error::LineItemWrite {
            item: "SKU total row".to_string(),
            source,
        })?;

    let item = "SKU total row".to_string();
    let written = match (total, existing) {
        (None, None) => Ok(()),
        (None, Some(row)) => row.delete(txn).await.map(|_| ()),
        (Some(total), Some(row)) => {
            let mut active: sku_line::ActiveModel = row.into();
            active.srp = Set(total.srp);
            active.qty = Set(total.qty);
            active.discount = Set(total.discount);
            active.billing_amount = Set(total.billing_amount);
            active.update(txn).await.map(|_| ())
        }
        (Some(total), None) => sku_line::ActiveModel {
            regular_code: Set(regular_code.to_string()),
            sku: Set(TOTAL_SKU.to_string()),
            srp: Set(total.srp),
            qty: Set(total.qty),
            uom: Set(String::new()),
            discount: Set(total.discount),
            billing_amount: Set(total.billing_amount),
            row_type: Set(sku_line::ROW_TYPE_TOTAL.to_string()),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map(|_| ()),
    };
    written.map_err(|source| Error::LineItemWrite { item, source })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::line_items::billing_amount, test_utils::*};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_budget_lines_reduce_remaining_balance() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        session.set_budget_line(BudgetLineDraft::new("A00002", "Robinsons", dec!(3000)))?;
        assert_eq!(session.projected_remaining()?, dec!(5000));

        let outcome = session.save(&db).await?;
        assert_eq!(outcome.regular.remaining_balance, dec!(5000));
        assert_eq!(outcome.regular.credit_budget, dec!(5000));
        assert_eq!(outcome.regular.initial_remaining_balance, dec!(10000));
        assert_eq!(outcome.regular.version, regular.version + 1);
        assert_eq!(outcome.budget_lines.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_saves_do_not_double_subtract() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        session.save(&db).await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        assert_eq!(session.budget_lines().len(), 1);
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2500)))?;
        let outcome = session.save(&db).await?;
        assert_eq!(outcome.regular.remaining_balance, dec!(7500));
        assert_eq!(outcome.budget_lines.len(), 1);

        let outcome = EditSession::open(&db, &regular.code).await?.save(&db).await?;
        assert_eq!(outcome.regular.remaining_balance, dec!(7500));
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_lines_are_deleted() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        session.set_budget_line(BudgetLineDraft::new("A00002", "Robinsons", dec!(3000)))?;
        session.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;
        session.save(&db).await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        assert!(session.remove_budget_line("A00001"));
        assert!(!session.remove_budget_line("A09999"));
        assert!(session.remove_sku_line("6000"));
        let outcome = session.save(&db).await?;

        assert_eq!(outcome.budget_lines.len(), 1);
        assert_eq!(outcome.budget_lines[0].account_code, "A00002");
        assert!(outcome.sku_lines.is_empty());
        assert_eq!(outcome.regular.remaining_balance, dec!(7000));
        Ok(())
    }

    #[tokio::test]
    async fn test_sku_lines_and_total_row() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;
        session.set_sku_line(SkuLineDraft::new("6001", dec!(12.5), 4, "PC", dec!(5)))?;
        let outcome = session.save(&db).await?;

        assert_eq!(outcome.totals.sku_total, dec!(295));
        assert_eq!(outcome.regular.remaining_balance, dec!(9705));
        assert_eq!(outcome.sku_lines.len(), 3);
        for row in &outcome.sku_lines {
            assert_eq!(row.billing_amount, billing_amount(row.srp, row.qty, row.discount)?);
        }

        let total = outcome
            .sku_lines
            .iter()
            .find(|row| row.row_type == sku_line::ROW_TYPE_TOTAL)
            .unwrap();
        assert_eq!(total.sku, TOTAL_SKU);
        assert_eq!(total.srp, dec!(350));
        assert_eq!(total.qty, 1);
        assert_eq!(total.discount, dec!(55));
        assert_eq!(total.billing_amount, dec!(295));

        let mut session = EditSession::open(&db, &regular.code).await?;
        assert_eq!(session.sku_lines().len(), 2);
        session.set_sku_line(SkuLineDraft::new("6000", dec!(100), 1, "CS", dec!(0)))?;
        let outcome = session.save(&db).await?;
        let total = outcome
            .sku_lines
            .iter()
            .find(|row| row.row_type == sku_line::ROW_TYPE_TOTAL)
            .unwrap();
        assert_eq!(total.billing_amount, dec!(145));
        assert_eq!(
            outcome
                .sku_lines
                .iter()
                .filter(|row| row.row_type == sku_line::ROW_TYPE_TOTAL)
                .count(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_edit_is_stale() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut first = EditSession::open(&db, &regular.code).await?;
        let mut second = EditSession::open(&db, &regular.code).await?;

        first.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        first.save(&db).await?;

        second.set_budget_line(BudgetLineDraft::new("A00002", "Robinsons", dec!(9000)))?;
        let result = second.save(&db).await;
        assert!(matches!(result, Err(Error::StaleRecord { .. })));

        let lines = budget_lines_for(&db, &regular.code).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].account_code, "A00001");
        let current = require_regular_pwp(&db, &regular.code).await?;
        assert_eq!(current.remaining_balance, dec!(8000));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_lines_are_rejected_before_save() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let mut session = EditSession::open(&db, &regular.code).await?;

        assert!(session
            .set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(-1)))
            .is_err());
        assert!(session
            .set_sku_line(SkuLineDraft::new("6000", dec!(10), 0, "CS", dec!(0)))
            .is_err());
        assert!(session.budget_lines().is_empty());
        assert!(session.sku_lines().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_open_snapshots_the_promotion() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let session = EditSession::open(&db, &format!(" {} ", regular.code)).await?;
        assert_eq!(session.regular_code(), regular.code);
        assert_eq!(session.version(), regular.version);
        assert_eq!(session.initial_remaining_balance(), dec!(10000));

        session.save(&db).await?;
        let session = EditSession::open(&db, &regular.code).await?;
        assert_eq!(session.version(), regular.version + 1);
        assert_eq!(session.initial_remaining_balance(), dec!(10000));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_line_write_names_the_line_and_writes_nothing() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        db.execute_unprepared(
            "CREATE TRIGGER block_sku_insert BEFORE INSERT ON regular_sku_listing \
             BEGIN SELECT RAISE(ABORT, 'sku writes blocked'); END;",
        )
        .await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        session.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;
        let result = session.save(&db).await;

        assert!(matches!(
            &result,
            Err(Error::LineItemWrite { item, .. }) if item == "SKU line 6000"
        ));
        assert!(result.unwrap_err().to_string().contains("SKU line 6000"));

        let current = require_regular_pwp(&db, &regular.code).await?;
        assert_eq!(current.version, regular.version);
        assert_eq!(current.remaining_balance, dec!(10000));
        assert_eq!(current.credit_budget, dec!(0));
        assert!(budget_lines_for(&db, &regular.code).await?.is_empty());
        assert!(sku_lines_for(&db, &regular.code).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_line_table_fails_the_save() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        session.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;

        db.execute_unprepared("DROP TABLE regular_sku_listing").await?;
        let result = session.save(&db).await;
        assert!(matches!(result, Err(Error::LineItemWrite { .. })));

        let current = require_regular_pwp(&db, &regular.code).await?;
        assert_eq!(current.version, regular.version);
        assert_eq!(current.remaining_balance, dec!(10000));
        assert!(budget_lines_for(&db, &regular.code).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_amounts_at_the_cap_round_trip_exactly() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;

        let mut session = EditSession::open(&db, &regular.code).await?;
        session.set_sku_line(SkuLineDraft::new(
            "6000",
            dec!(999_999_999.99),
            1000,
            "CS",
            dec!(0.01),
        ))?;
        session.save(&db).await?;

        let rows = sku_lines_for(&db, &regular.code).await?;
        assert_eq!(rows.len(), 2);
        let item = &rows[0];
        assert_eq!(item.srp, dec!(999_999_999.99));
        assert_eq!(item.discount, dec!(0.01));
        assert_eq!(item.billing_amount, dec!(999_999_999_989.99));
        for row in &rows {
            assert_eq!(row.billing_amount, billing_amount(row.srp, row.qty, row.discount)?);
        }
        assert_eq!(rows[1].srp, dec!(999_999_999_990));

        let current = require_regular_pwp(&db, &regular.code).await?;
        assert_eq!(current.credit_budget, dec!(999_999_999_989.99));
        assert_eq!(current.remaining_balance, dec!(-999_999_989_989.99));
        Ok(())
    }

    #[tokio::test]
    async fn test_lines_above_the_cap_are_rejected() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let mut session = EditSession::open(&db, &regular.code).await?;

        let result = session.set_sku_line(SkuLineDraft::new(
            "6000",
            crate::core::max_amount(),
            2,
            "CS",
            dec!(0),
        ));
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        assert!(session.sku_lines().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_open_unknown_promotion() -> Result<()> {
        let db = setup_test_db().await?;
        let result = EditSession::open(&db, "RP04040").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
