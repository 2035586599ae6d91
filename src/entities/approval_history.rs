//! Approval history entity - one row per status change of a promotion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pwp_approval_history")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code of the promotion (cover or regular)
    pub pwp_code: String,
    /// What happened (`"created"`, `"submitted"`, `"approved"`, `"rejected"`)
    pub action: String,
    /// Optional remarks from the operator
    pub remarks: Option<String>,
    /// Operator who performed the action
    pub actor: String,
    /// When the action happened
    pub acted_at: DateTime,
}

/// `ApprovalHistory` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
