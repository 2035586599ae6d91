//! Cascading deletes of promotions.
//!
//! Dependents go first, in a fixed order, then the parent row. Everything
//! runs in one transaction: if any step fails the error names the step and
//! the promotion is left exactly as it was.

use crate::{
    core::{
        pwp::{get_cover_pwp, get_regular_pwp, reconcile_cover, regulars_under_cover},
        session::Session,
    },
    entities::{
        ApprovalHistory, Attachment, BudgetLine, CoverPwp, RegularPwp, SkuLine, approval_history,
        attachment, budget_line, cover_pwp, regular_pwp, sku_line,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, DeleteMany, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Rows removed by one cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Code that was deleted
    pub code: String,
    /// Budget line items removed
    pub budget_lines: u64,
    /// SKU line items removed, total row included
    pub sku_lines: u64,
    /// Attachment rows removed
    pub attachments: u64,
    /// Approval history rows removed
    pub approvals: u64,
    /// Parent rows removed (0 or 1)
    pub parent: u64,
}

impl CascadeOutcome {
    /// All rows removed, parent included.
    #[must_use]
    pub const fn rows_removed(&self) -> u64 {
        self.budget_lines + self.sku_lines + self.attachments + self.approvals + self.parent
    }

    /// Whether the parent row was removed.
    #[must_use]
    pub const fn deleted(&self) -> bool {
        self.parent > 0
    }
}

async fn run_step<E>(
    txn: &DatabaseTransaction,
    step: &'static str,
    code: &str,
    delete: DeleteMany<E>,
) -> Result<u64>
where
    E: EntityTrait,
{
    delete
        .exec(txn)
        .await
        .map(|result| result.rows_affected)
        .map_err(|source| Error::CascadeStep {
            step,
            code: code.to_string(),
            source,
        })
}

async fn delete_attachments_and_history(
    txn: &DatabaseTransaction,
    code: &str,
    outcome: &mut CascadeOutcome,
) -> Result<()> {
    outcome.attachments = run_step(
        txn,
        "attachments",
        code,
        Attachment::delete_many().filter(attachment::Column::PwpCode.eq(code)),
    )
    .await?;
    outcome.approvals = run_step(
        txn,
        "approval history",
        code,
        ApprovalHistory::delete_many().filter(approval_history::Column::PwpCode.eq(code)),
    )
    .await?;
    Ok(())
}

/// Deletes a regular promotion with its line items, attachments and history.
///
/// Deleting a code that no longer exists is a no-op reporting zero rows. The
/// cover it was filed under is reconciled afterwards.
#[instrument(skip(db, session), fields(operator = session.user_id()))]
pub async fn delete_regular_pwp(
    db: &DatabaseConnection,
    session: &Session,
    code: &str,
) -> Result<CascadeOutcome> {
    let code = code.trim();
    let mut outcome = CascadeOutcome {
        code: code.to_string(),
        ..CascadeOutcome::default()
    };

    let txn = db.begin().await?;
    let Some(regular) = get_regular_pwp(&txn, code).await? else {
        txn.commit().await?;
        info!(code, "Nothing to delete");
        return Ok(outcome);
    };

    outcome.budget_lines = run_step(
        &txn,
        "budget line items",
        code,
        BudgetLine::delete_many().filter(budget_line::Column::RegularCode.eq(code)),
    )
    .await?;
    outcome.sku_lines = run_step(
        &txn,
        "SKU line items",
        code,
        SkuLine::delete_many().filter(sku_line::Column::RegularCode.eq(code)),
    )
    .await?;
    delete_attachments_and_history(&txn, code, &mut outcome).await?;
    outcome.parent = run_step(
        &txn,
        "promotion",
        code,
        RegularPwp::delete_many().filter(regular_pwp::Column::Code.eq(code)),
    )
    .await?;

    if let Some(cover) = &regular.cover_code {
        reconcile_cover(&txn, cover).await?;
    }
    txn.commit().await?;

    info!(
        code,
        rows = outcome.rows_removed(),
        "Regular PWP deleted with its dependents"
    );
    Ok(outcome)
}

/// Deletes a cover promotion with its attachments and history.
///
/// Refused with [`Error::HasDependents`] while regular promotions are still
/// filed under it.
#[instrument(skip(db, session), fields(operator = session.user_id()))]
pub async fn delete_cover_pwp(
    db: &DatabaseConnection,
    session: &Session,
    code: &str,
) -> Result<CascadeOutcome> {
    let code = code.trim();
    let mut outcome = CascadeOutcome {
        code: code.to_string(),
        ..CascadeOutcome::default()
    };

    let txn = db.begin().await?;
    if get_cover_pwp(&txn, code).await?.is_none() {
        txn.commit().await?;
        info!(code, "Nothing to delete");
        return Ok(outcome);
    }

    let filed = regulars_under_cover(&txn, code).await?;
    if !filed.is_empty() {
        return Err(Error::HasDependents {
            entity: "Cover PWP",
            code: code.to_string(),
            count: u64::try_from(filed.len())?,
            dependents: "regular promotions",
        });
    }

    delete_attachments_and_history(&txn, code, &mut outcome).await?;
    outcome.parent = run_step(
        &txn,
        "promotion",
        code,
        CoverPwp::delete_many().filter(cover_pwp::Column::Code.eq(code)),
    )
    .await?;
    txn.commit().await?;

    info!(
        code,
        rows = outcome.rows_removed(),
        "Cover PWP deleted with its dependents"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            approval::history_for,
            attachment::{add_attachment, list_attachments},
            line_items::{BudgetLineDraft, SkuLineDraft, budget_lines_for, sku_lines_for},
            pwp::{CoverPwpForm, create_cover_pwp, create_regular_pwp, require_cover_pwp},
            reconcile::EditSession,
        },
        test_utils::*,
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_delete_removes_n_plus_one_rows() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let mut edit = EditSession::open(&db, &regular.code).await?;
        edit.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        edit.set_budget_line(BudgetLineDraft::new("A00002", "Robinsons", dec!(3000)))?;
        edit.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;
        edit.save(&db).await?;
        add_attachment(&db, &session, &regular.code, "brief.pdf", "https://files.example/brief.pdf")
            .await?;

        let outcome = delete_regular_pwp(&db, &session, &regular.code).await?;
        assert_eq!(outcome.budget_lines, 2);
        assert_eq!(outcome.sku_lines, 2);
        assert_eq!(outcome.attachments, 1);
        assert_eq!(outcome.approvals, 1);
        assert_eq!(outcome.parent, 1);
        assert_eq!(outcome.rows_removed(), 7);
        assert!(outcome.deleted());

        assert!(get_regular_pwp(&db, &regular.code).await?.is_none());
        assert!(budget_lines_for(&db, &regular.code).await?.is_empty());
        assert!(sku_lines_for(&db, &regular.code).await?.is_empty());
        assert!(list_attachments(&db, &regular.code).await?.is_empty());
        assert!(history_for(&db, &regular.code).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_step_is_named_and_keeps_the_promotion() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let mut edit = EditSession::open(&db, &regular.code).await?;
        edit.set_budget_line(BudgetLineDraft::new("A00001", "Puregold", dec!(2000)))?;
        edit.set_sku_line(SkuLineDraft::new("6000", dec!(100), 3, "CS", dec!(50)))?;
        edit.save(&db).await?;

        db.execute_unprepared("DROP TABLE pwp_attachments").await?;
        let result = delete_regular_pwp(&db, &session, &regular.code).await;

        assert!(matches!(
            &result,
            Err(Error::CascadeStep { step: "attachments", code, .. }) if *code == regular.code
        ));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Deleting attachments for 'RP00001' failed")
        );

        let kept = get_regular_pwp(&db, &regular.code).await?.unwrap();
        assert_eq!(kept.remaining_balance, dec!(7750));
        assert_eq!(budget_lines_for(&db, &regular.code).await?.len(), 1);
        assert_eq!(sku_lines_for(&db, &regular.code).await?.len(), 2);
        assert_eq!(history_for(&db, &regular.code).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_delete_is_noop() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        assert!(delete_regular_pwp(&db, &session, &regular.code).await?.deleted());

        let again = delete_regular_pwp(&db, &session, &regular.code).await?;
        assert!(!again.deleted());
        assert_eq!(again.rows_removed(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cover_with_regulars_is_refused() -> Result<()> {
        let (db, codes, regular) = setup_with_regular().await?;
        let session = test_session();
        let cover = create_cover_pwp(
            &db,
            &codes,
            &session,
            CoverPwpForm {
                title: "Umbrella".to_string(),
                distributor_code: regular.distributor_code.clone(),
                amount_budget: dec!(30000),
            },
        )
        .await?;
        let mut form = regular_form(&regular.distributor_code, &regular.activity_code, dec!(4000));
        form.cover_code = Some(cover.code.clone());
        let filed = create_regular_pwp(&db, &codes, &session, form).await?;

        let refused = delete_cover_pwp(&db, &session, &cover.code).await;
        assert!(matches!(
            refused,
            Err(Error::HasDependents { count: 1, .. })
        ));
        assert!(get_cover_pwp(&db, &cover.code).await?.is_some());

        delete_regular_pwp(&db, &session, &filed.code).await?;
        let cover_now = require_cover_pwp(&db, &cover.code).await?;
        assert_eq!(cover_now.credit_budget, dec!(0));
        assert_eq!(cover_now.remaining_balance, dec!(30000));

        let outcome = delete_cover_pwp(&db, &session, &cover.code).await?;
        assert_eq!(outcome.approvals, 1);
        assert_eq!(outcome.rows_removed(), 2);
        assert!(!delete_cover_pwp(&db, &session, &cover.code).await?.deleted());
        Ok(())
    }
}
