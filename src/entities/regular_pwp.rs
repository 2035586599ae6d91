//! Regular PWP entity - a promotion with budget and SKU line items.
//!
//! The aggregate columns (`remaining_balance`, `credit_budget`) are derived
//! from the line items and rewritten by reconciliation. `version` guards
//! header updates against lost writes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Regular promotion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regular_pwp")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Generated promotion code (e.g. `"RP00012"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Promotion title
    pub title: String,
    /// Cover promotion this one is filed under, if any
    pub cover_code: Option<String>,
    /// Distributor reference code
    pub distributor_code: String,
    /// Activity reference code
    pub activity_code: String,
    /// Approved budget
    pub amount_budget: Decimal,
    /// Balance available to line items, snapshotted by edit sessions
    pub initial_remaining_balance: Decimal,
    /// `initial_remaining_balance` minus the line item total
    pub remaining_balance: Decimal,
    /// Line item total
    pub credit_budget: Decimal,
    /// Approval status (`draft`, `submitted`, `approved`, `rejected`)
    pub status: String,
    /// Optimistic concurrency counter
    pub version: i32,
    /// Operator who created the record
    pub created_by: String,
    /// When the record was created
    pub created_at: DateTime,
    /// When the record was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between regular promotions and their line items
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One promotion has many budget line items
    #[sea_orm(has_many = "super::budget_line::Entity")]
    BudgetLines,
    /// One promotion has many SKU line items
    #[sea_orm(has_many = "super::sku_line::Entity")]
    SkuLines,
}

impl Related<super::budget_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetLines.def()
    }
}

impl Related<super::sku_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SkuLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
