//! Unified promotion listing.
//!
//! Cover and regular promotions are shown in one list, newest first. Each row
//! carries its variant so the caller can open the right editor.

use crate::{
    core::{
        page::{ListQuery, Page, contains_ignoring_case},
        pwp::{get_cover_pwp, get_regular_pwp},
    },
    entities::{CoverPwp, RegularPwp, cover_pwp, regular_pwp},
    errors::Result,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::{Condition, QueryOrder, prelude::*};
use std::fmt;

/// Which table a listed promotion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwpVariant {
    /// Cover promotion
    Cover,
    /// Regular promotion
    Regular,
}

impl fmt::Display for PwpVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cover => f.write_str("Cover"),
            Self::Regular => f.write_str("Regular"),
        }
    }
}

/// One row of the unified list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwpRow {
    /// Source table
    pub variant: PwpVariant,
    /// Promotion code
    pub code: String,
    /// Promotion title
    pub title: String,
    /// Distributor reference code
    pub distributor_code: String,
    /// Set on regular promotions filed under a cover
    pub cover_code: Option<String>,
    /// Approved budget
    pub amount_budget: Decimal,
    /// Balance left
    pub remaining_balance: Decimal,
    /// Committed amount
    pub credit_budget: Decimal,
    /// Approval status
    pub status: String,
    /// Optimistic concurrency counter
    pub version: i32,
    /// Creating operator
    pub created_by: String,
    /// Creation time
    pub created_at: NaiveDateTime,
}

impl From<regular_pwp::Model> for PwpRow {
    fn from(model: regular_pwp::Model) -> Self {
        Self {
            variant: PwpVariant::Regular,
            code: model.code,
            title: model.title,
            distributor_code: model.distributor_code,
            cover_code: model.cover_code,
            amount_budget: model.amount_budget,
            remaining_balance: model.remaining_balance,
            credit_budget: model.credit_budget,
            status: model.status,
            version: model.version,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

impl From<cover_pwp::Model> for PwpRow {
    fn from(model: cover_pwp::Model) -> Self {
        Self {
            variant: PwpVariant::Cover,
            code: model.code,
            title: model.title,
            distributor_code: model.distributor_code,
            cover_code: None,
            amount_budget: model.amount_budget,
            remaining_balance: model.remaining_balance,
            credit_budget: model.credit_budget,
            status: model.status,
            version: model.version,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Lists cover and regular promotions together, newest first.
///
/// The search term matches code, title or distributor code.
pub async fn list_unified(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<PwpRow>> {
    let mut regulars = RegularPwp::find();
    let mut covers = CoverPwp::find();

    if let Some(term) = query.search() {
        regulars = regulars.filter(
            Condition::any()
                .add(contains_ignoring_case(regular_pwp::Column::Code, term))
                .add(contains_ignoring_case(regular_pwp::Column::Title, term))
                .add(contains_ignoring_case(regular_pwp::Column::DistributorCode, term)),
        );
        covers = covers.filter(
            Condition::any()
                .add(contains_ignoring_case(cover_pwp::Column::Code, term))
                .add(contains_ignoring_case(cover_pwp::Column::Title, term))
                .add(contains_ignoring_case(cover_pwp::Column::DistributorCode, term)),
        );
    }

    let mut rows: Vec<PwpRow> = covers
        .order_by_desc(cover_pwp::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(PwpRow::from)
        .collect();
    rows.extend(
        regulars
            .order_by_desc(regular_pwp::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(PwpRow::from),
    );

    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.code.cmp(&a.code))
    });

    Page::from_items(rows, query)
}

/// Finds a promotion of either variant by code.
pub async fn find_pwp(db: &DatabaseConnection, code: &str) -> Result<Option<PwpRow>> {
    if let Some(regular) = get_regular_pwp(db, code).await? {
        return Ok(Some(regular.into()));
    }
    Ok(get_cover_pwp(db, code).await?.map(PwpRow::from))
}
