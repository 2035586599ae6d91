//! Approval workflow for promotions.
//!
//! Both promotion variants move through the same statuses. Every change is
//! written to the approval history together with the acting operator.

use crate::{
    core::{optional_text, session::Session},
    entities::{ApprovalHistory, CoverPwp, RegularPwp, approval_history, cover_pwp, regular_pwp},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

/// Approval status of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwpStatus {
    /// Being prepared
    Draft,
    /// Waiting for approval
    Submitted,
    /// Approved
    Approved,
    /// Sent back; may be resubmitted
    Rejected,
}

impl PwpStatus {
    /// Value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PwpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PwpStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::NotFound {
                entity: "status",
                key: other.to_string(),
            }),
        }
    }
}

/// A status change requested by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    /// Send a draft or rejected promotion for approval
    Submit,
    /// Approve a submitted promotion
    Approve,
    /// Reject a submitted promotion
    Reject,
}

impl ApprovalAction {
    /// Imperative form used in error messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Status reached from `current`, or [`Error::InvalidTransition`].
    pub fn next_status(self, current: PwpStatus) -> Result<PwpStatus> {
        match (self, current) {
            (Self::Submit, PwpStatus::Draft | PwpStatus::Rejected) => Ok(PwpStatus::Submitted),
            (Self::Approve, PwpStatus::Submitted) => Ok(PwpStatus::Approved),
            (Self::Reject, PwpStatus::Submitted) => Ok(PwpStatus::Rejected),
            _ => Err(Error::InvalidTransition {
                action: self.verb(),
                status: current.to_string(),
            }),
        }
    }
}

/// Appends one approval history row.
pub async fn record_action<C>(
    db: &C,
    pwp_code: &str,
    action: &str,
    remarks: Option<String>,
    session: &Session,
) -> Result<approval_history::Model>
where
    C: ConnectionTrait,
{
    approval_history::ActiveModel {
        pwp_code: Set(pwp_code.to_string()),
        action: Set(action.to_string()),
        remarks: Set(optional_text(remarks)),
        actor: Set(session.display_name().to_string()),
        acted_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Moves a promotion (cover or regular) to its next status and records it.
///
/// Rejections must carry remarks.
#[instrument(skip(db, session, remarks), fields(operator = session.user_id()))]
pub async fn apply_action(
    db: &DatabaseConnection,
    session: &Session,
    code: &str,
    action: ApprovalAction,
    remarks: Option<String>,
) -> Result<PwpStatus> {
    let code = code.trim();
    let remarks = optional_text(remarks);
    if action == ApprovalAction::Reject && remarks.is_none() {
        return Err(Error::MissingField { field: "Remarks" });
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now().naive_utc();

    let next = if let Some(regular) = RegularPwp::find()
        .filter(regular_pwp::Column::Code.eq(code))
        .one(&txn)
        .await?
    {
        let next = action.next_status(regular.status.parse()?)?;
        RegularPwp::update_many()
            .col_expr(regular_pwp::Column::Status, Expr::value(next.as_str()))
            .col_expr(
                regular_pwp::Column::Version,
                Expr::col(regular_pwp::Column::Version).add(1),
            )
            .col_expr(regular_pwp::Column::UpdatedAt, Expr::value(now))
            .filter(regular_pwp::Column::Code.eq(code))
            .exec(&txn)
            .await?;
        next
    } else if let Some(cover) = CoverPwp::find()
        .filter(cover_pwp::Column::Code.eq(code))
        .one(&txn)
        .await?
    {
        let next = action.next_status(cover.status.parse()?)?;
        CoverPwp::update_many()
            .col_expr(cover_pwp::Column::Status, Expr::value(next.as_str()))
            .col_expr(
                cover_pwp::Column::Version,
                Expr::col(cover_pwp::Column::Version).add(1),
            )
            .col_expr(cover_pwp::Column::UpdatedAt, Expr::value(now))
            .filter(cover_pwp::Column::Code.eq(code))
            .exec(&txn)
            .await?;
        next
    } else {
        return Err(Error::NotFound {
            entity: "Promotion",
            key: code.to_string(),
        });
    };

    record_action(&txn, code, next.as_str(), remarks, session).await?;
    txn.commit().await?;

    info!(code, status = next.as_str(), "Promotion status changed");
    Ok(next)
}

/// Approval history of a promotion, oldest first.
pub async fn history_for(
    db: &DatabaseConnection,
    pwp_code: &str,
) -> Result<Vec<approval_history::Model>> {
    ApprovalHistory::find()
        .filter(approval_history::Column::PwpCode.eq(pwp_code))
        .order_by_asc(approval_history::Column::ActedAt)
        .order_by_asc(approval_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_transitions() {
        use ApprovalAction::{Approve, Reject, Submit};
        use PwpStatus::{Approved, Draft, Rejected, Submitted};

        assert_eq!(Submit.next_status(Draft).ok(), Some(Submitted));
        assert_eq!(Submit.next_status(Rejected).ok(), Some(Submitted));
        assert_eq!(Approve.next_status(Submitted).ok(), Some(Approved));
        assert_eq!(Reject.next_status(Submitted).ok(), Some(Rejected));

        assert!(matches!(
            Approve.next_status(Draft),
            Err(Error::InvalidTransition { action: "approve", .. })
        ));
        assert!(Submit.next_status(Approved).is_err());
        assert!(Reject.next_status(Approved).is_err());
    }

    #[tokio::test]
    async fn test_workflow_writes_history() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let status = apply_action(&db, &session, &regular.code, ApprovalAction::Submit, None).await?;
        assert_eq!(status, PwpStatus::Submitted);

        let missing_remarks =
            apply_action(&db, &session, &regular.code, ApprovalAction::Reject, None).await;
        assert!(matches!(
            missing_remarks,
            Err(Error::MissingField { field: "Remarks" })
        ));

        apply_action(
            &db,
            &session,
            &regular.code,
            ApprovalAction::Reject,
            Some("Budget too high".to_string()),
        )
        .await?;
        apply_action(&db, &session, &regular.code, ApprovalAction::Submit, None).await?;
        let status =
            apply_action(&db, &session, &regular.code, ApprovalAction::Approve, None).await?;
        assert_eq!(status, PwpStatus::Approved);

        let history = history_for(&db, &regular.code).await?;
        let actions: Vec<&str> = history.iter().map(|h| h.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["created", "submitted", "rejected", "submitted", "approved"]
        );
        assert_eq!(history[2].remarks.as_deref(), Some("Budget too high"));
        assert!(history.iter().all(|h| h.actor == session.display_name()));
        Ok(())
    }

    #[tokio::test]
    async fn test_code_with_surrounding_spaces() -> Result<()> {
        let (db, _codes, regular) = setup_with_regular().await?;
        let session = test_session();

        let padded = format!(" {} ", regular.code);
        let status = apply_action(&db, &session, &padded, ApprovalAction::Submit, None).await?;
        assert_eq!(status, PwpStatus::Submitted);

        let history = history_for(&db, &regular.code).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].pwp_code, regular.code);
        assert_eq!(history[1].action, "submitted");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result =
            apply_action(&db, &test_session(), "RP99999", ApprovalAction::Submit, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
