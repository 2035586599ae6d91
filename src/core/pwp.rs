//! Promotion forms - creating and editing cover and regular promotions.
//!
//! A new promotion gets the next code of its table, starts in `draft` with
//! its whole approved budget available (`initial_remaining_balance =
//! remaining_balance = amount_budget`) and a `created` history row. Header
//! edits are guarded by the record's `version`.

use crate::{
    core::{
        approval::{PwpStatus, record_action},
        code::{COVER_PWP_TABLE, CodeBook, REGULAR_PWP_TABLE, generate_code, is_unique_violation},
        bounded, checked_sum, non_negative,
        reference::{ReferenceKind, require_reference_record},
        required_field,
        session::Session,
    },
    entities::{CoverPwp, RegularPwp, cover_pwp, regular_pwp},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// Form for a new regular promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularPwpForm {
    /// Promotion title
    pub title: String,
    /// Distributor reference code
    pub distributor_code: String,
    /// Activity reference code
    pub activity_code: String,
    /// Cover promotion to file this under
    pub cover_code: Option<String>,
    /// Approved budget
    pub amount_budget: Decimal,
}

/// Form for a new cover promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPwpForm {
    /// Promotion title
    pub title: String,
    /// Distributor reference code
    pub distributor_code: String,
    /// Approved budget
    pub amount_budget: Decimal,
}

/// Changes to a promotion header. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderUpdate {
    /// New title
    pub title: Option<String>,
    /// New approved budget; resets the initial remaining balance
    pub amount_budget: Option<Decimal>,
    /// New cover assignment (regular promotions only); `Some(None)` detaches
    pub cover_code: Option<Option<String>>,
}

/// Finds a regular promotion by code.
pub async fn get_regular_pwp<C>(db: &C, code: &str) -> Result<Option<regular_pwp::Model>>
where
    C: ConnectionTrait,
{
    RegularPwp::find()
        .filter(regular_pwp::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_regular_pwp`] but a missing promotion is an error.
pub async fn require_regular_pwp<C>(db: &C, code: &str) -> Result<regular_pwp::Model>
where
    C: ConnectionTrait,
{
    get_regular_pwp(db, code)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Regular PWP",
            key: code.to_string(),
        })
}

/// Finds a cover promotion by code.
pub async fn get_cover_pwp<C>(db: &C, code: &str) -> Result<Option<cover_pwp::Model>>
where
    C: ConnectionTrait,
{
    CoverPwp::find()
        .filter(cover_pwp::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_cover_pwp`] but a missing promotion is an error.
pub async fn require_cover_pwp<C>(db: &C, code: &str) -> Result<cover_pwp::Model>
where
    C: ConnectionTrait,
{
    get_cover_pwp(db, code)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Cover PWP",
            key: code.to_string(),
        })
}

/// Regular promotions filed under a cover.
pub async fn regulars_under_cover<C>(db: &C, cover_code: &str) -> Result<Vec<regular_pwp::Model>>
where
    C: ConnectionTrait,
{
    RegularPwp::find()
        .filter(regular_pwp::Column::CoverCode.eq(cover_code))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Recomputes a cover's credit and remaining balance from the approved
/// budgets of the regular promotions under it.
pub async fn reconcile_cover<C>(db: &C, cover_code: &str) -> Result<cover_pwp::Model>
where
    C: ConnectionTrait,
{
    let cover = require_cover_pwp(db, cover_code).await?;
    let regulars = regulars_under_cover(db, cover_code).await?;
    let credit = checked_sum(
        regulars.iter().map(|regular| Ok(regular.amount_budget)),
        "Cover credit",
    )?;
    let remaining = bounded(
        cover.initial_remaining_balance.checked_sub(credit),
        "Remaining balance",
    )?;

    CoverPwp::update_many()
        .col_expr(cover_pwp::Column::CreditBudget, Expr::value(credit))
        .col_expr(cover_pwp::Column::RemainingBalance, Expr::value(remaining))
        .col_expr(
            cover_pwp::Column::Version,
            Expr::col(cover_pwp::Column::Version).add(1),
        )
        .col_expr(
            cover_pwp::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(cover_pwp::Column::Code.eq(cover_code))
        .exec(db)
        .await?;

    info!(cover_code, %credit, %remaining, "Cover balance reconciled");
    require_cover_pwp(db, cover_code).await
}

/// Creates a regular promotion with the next `regular_pwp` code.
///
/// Title, distributor and activity are required; the distributor, activity
/// and cover (when given) must exist. The cover's balance is reconciled in
/// the same transaction.
#[instrument(skip(db, codes, session, form), fields(operator = session.user_id()))]
pub async fn create_regular_pwp(
    db: &DatabaseConnection,
    codes: &CodeBook,
    session: &Session,
    form: RegularPwpForm,
) -> Result<regular_pwp::Model> {
    let title = required_field(&form.title, "Title")?;
    let distributor_code = required_field(&form.distributor_code, "Distributor")?;
    let activity_code = required_field(&form.activity_code, "Activity")?;
    let amount_budget = non_negative(form.amount_budget, "Approved budget")?;
    let cover_code = crate::core::optional_text(form.cover_code);

    require_reference_record(db, ReferenceKind::Distributor, &distributor_code).await?;
    require_reference_record(db, ReferenceKind::Activity, &activity_code).await?;
    if let Some(cover) = &cover_code {
        require_cover_pwp(db, cover).await?;
    }

    let sequence = codes.sequence(REGULAR_PWP_TABLE)?;
    let attempts = codes.retry_attempts();

    for attempt in 1..=attempts {
        let txn = db.begin().await?;
        let code = generate_code(
            &txn,
            REGULAR_PWP_TABLE,
            sequence,
            RegularPwp::find(),
            regular_pwp::Column::Code,
        )
        .await?;

        let now = chrono::Utc::now().naive_utc();
        let record = regular_pwp::ActiveModel {
            code: Set(code.clone()),
            title: Set(title.clone()),
            cover_code: Set(cover_code.clone()),
            distributor_code: Set(distributor_code.clone()),
            activity_code: Set(activity_code.clone()),
            amount_budget: Set(amount_budget),
            initial_remaining_balance: Set(amount_budget),
            remaining_balance: Set(amount_budget),
            credit_budget: Set(Decimal::ZERO),
            status: Set(PwpStatus::Draft.as_str().to_string()),
            version: Set(0),
            created_by: Set(session.display_name().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match record.insert(&txn).await {
            Ok(model) => {
                record_action(&txn, &model.code, "created", None, session).await?;
                if let Some(cover) = &model.cover_code {
                    reconcile_cover(&txn, cover).await?;
                }
                txn.commit().await?;
                info!(code = %model.code, "Regular PWP created");
                return Ok(model);
            }
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await?;
                warn!(%code, attempt, "Generated PWP code already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::CodeConflict {
        table: REGULAR_PWP_TABLE.to_string(),
        attempts,
    })
}

/// Creates a cover promotion with the next `cover_pwp` code.
#[instrument(skip(db, codes, session, form), fields(operator = session.user_id()))]
pub async fn create_cover_pwp(
    db: &DatabaseConnection,
    codes: &CodeBook,
    session: &Session,
    form: CoverPwpForm,
) -> Result<cover_pwp::Model> {
    let title = required_field(&form.title, "Title")?;
    let distributor_code = required_field(&form.distributor_code, "Distributor")?;
    let amount_budget = non_negative(form.amount_budget, "Approved budget")?;

    require_reference_record(db, ReferenceKind::Distributor, &distributor_code).await?;

    let sequence = codes.sequence(COVER_PWP_TABLE)?;
    let attempts = codes.retry_attempts();

    for attempt in 1..=attempts {
        let txn = db.begin().await?;
        let code = generate_code(
            &txn,
            COVER_PWP_TABLE,
            sequence,
            CoverPwp::find(),
            cover_pwp::Column::Code,
        )
        .await?;

        let now = chrono::Utc::now().naive_utc();
        let record = cover_pwp::ActiveModel {
            code: Set(code.clone()),
            title: Set(title.clone()),
            distributor_code: Set(distributor_code.clone()),
            amount_budget: Set(amount_budget),
            initial_remaining_balance: Set(amount_budget),
            remaining_balance: Set(amount_budget),
            credit_budget: Set(Decimal::ZERO),
            status: Set(PwpStatus::Draft.as_str().to_string()),
            version: Set(0),
            created_by: Set(session.display_name().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match record.insert(&txn).await {
            Ok(model) => {
                record_action(&txn, &model.code, "created", None, session).await?;
                txn.commit().await?;
                info!(code = %model.code, "Cover PWP created");
                return Ok(model);
            }
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await?;
                warn!(%code, attempt, "Generated cover code already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::CodeConflict {
        table: COVER_PWP_TABLE.to_string(),
        attempts,
    })
}

/// Edits a regular promotion header.
///
/// A new approved budget becomes the new initial remaining balance and the
/// remaining balance is recomputed against the current line item total.
/// Moving between covers reconciles both covers. Fails with
/// [`Error::StaleRecord`] when `expected_version` is no longer current.
#[instrument(skip(db, session, update), fields(operator = session.user_id()))]
pub async fn update_regular_header(
    db: &DatabaseConnection,
    session: &Session,
    code: &str,
    expected_version: i32,
    update: HeaderUpdate,
) -> Result<regular_pwp::Model> {
    let code = code.trim();
    let title = update
        .title
        .as_deref()
        .map(|t| required_field(t, "Title"))
        .transpose()?;
    let amount_budget = update
        .amount_budget
        .map(|amount| non_negative(amount, "Approved budget"))
        .transpose()?;
    let new_cover = update.cover_code.map(crate::core::optional_text);
    if let Some(Some(cover)) = &new_cover {
        require_cover_pwp(db, cover).await?;
    }

    let txn = db.begin().await?;
    let current = require_regular_pwp(&txn, code).await?;

    let mut stmt = RegularPwp::update_many()
        .col_expr(regular_pwp::Column::Version, Expr::value(expected_version + 1))
        .col_expr(
            regular_pwp::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(regular_pwp::Column::Code.eq(code))
        .filter(regular_pwp::Column::Version.eq(expected_version));
    if let Some(title) = title {
        stmt = stmt.col_expr(regular_pwp::Column::Title, Expr::value(title));
    }
    if let Some(amount) = amount_budget {
        stmt = stmt
            .col_expr(regular_pwp::Column::AmountBudget, Expr::value(amount))
            .col_expr(regular_pwp::Column::InitialRemainingBalance, Expr::value(amount))
            .col_expr(
                regular_pwp::Column::RemainingBalance,
                Expr::value(bounded(
                    amount.checked_sub(current.credit_budget),
                    "Remaining balance",
                )?),
            );
    }
    if let Some(cover) = &new_cover {
        stmt = stmt.col_expr(regular_pwp::Column::CoverCode, Expr::value(cover.clone()));
    }

    let result = stmt.exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::StaleRecord {
            entity: "Regular PWP",
            code: code.to_string(),
        });
    }

    let mut covers_to_reconcile: Vec<String> = Vec::new();
    if let Some(old) = &current.cover_code {
        if amount_budget.is_some() || new_cover.is_some() {
            covers_to_reconcile.push(old.clone());
        }
    }
    if let Some(Some(new)) = &new_cover {
        if !covers_to_reconcile.contains(new) {
            covers_to_reconcile.push(new.clone());
        }
    }
    for cover in &covers_to_reconcile {
        reconcile_cover(&txn, cover).await?;
    }

    let updated = require_regular_pwp(&txn, code).await?;
    txn.commit().await?;

    info!(code, version = updated.version, "Regular PWP header updated");
    Ok(updated)
}

/// Edits a cover promotion header. Cover assignment in `update` is ignored.
#[instrument(skip(db, session, update), fields(operator = session.user_id()))]
pub async fn update_cover_header(
    db: &DatabaseConnection,
    session: &Session,
    code: &str,
    expected_version: i32,
    update: HeaderUpdate,
) -> Result<cover_pwp::Model> {
    let code = code.trim();
    let title = update
        .title
        .as_deref()
        .map(|t| required_field(t, "Title"))
        .transpose()?;
    let amount_budget = update
        .amount_budget
        .map(|amount| non_negative(amount, "Approved budget"))
        .transpose()?;

    let txn = db.begin().await?;
    let current = require_cover_pwp(&txn, code).await?;

    let mut stmt = CoverPwp::update_many()
        .col_expr(cover_pwp::Column::Version, Expr::value(expected_version + 1))
        .col_expr(
            cover_pwp::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(cover_pwp::Column::Code.eq(code))
        .filter(cover_pwp::Column::Version.eq(expected_version));
    if let Some(title) = title {
        stmt = stmt.col_expr(cover_pwp::Column::Title, Expr::value(title));
    }
    if let Some(amount) = amount_budget {
        stmt = stmt
            .col_expr(cover_pwp::Column::AmountBudget, Expr::value(amount))
            .col_expr(cover_pwp::Column::InitialRemainingBalance, Expr::value(amount))
            .col_expr(
                cover_pwp::Column::RemainingBalance,
                Expr::value(bounded(
                    amount.checked_sub(current.credit_budget),
                    "Remaining balance",
                )?),
            );
    }

    let result = stmt.exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::StaleRecord {
            entity: "Cover PWP",
            code: code.to_string(),
        });
    }

    let updated = require_cover_pwp(&txn, code).await?;
    txn.commit().await?;

    info!(code, version = updated.version, "Cover PWP header updated");
    Ok(updated)
}
