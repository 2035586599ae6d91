//! Cover PWP entity - an umbrella promotion whose budget is drawn down by the
//! regular promotions filed under it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cover promotion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cover_pwp")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Generated cover code (e.g. `"CP00003"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Promotion title
    pub title: String,
    /// Distributor reference code
    pub distributor_code: String,
    /// Approved budget
    pub amount_budget: Decimal,
    /// Balance available to regular promotions
    pub initial_remaining_balance: Decimal,
    /// `initial_remaining_balance` minus `credit_budget`
    pub remaining_balance: Decimal,
    /// Sum of the approved budgets of regular promotions under this cover
    pub credit_budget: Decimal,
    /// Approval status
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

/// Regular promotions reference covers by code only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
