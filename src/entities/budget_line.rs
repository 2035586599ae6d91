//! Budget line entity (`regular_accountlis_badget`) - an account's share of a
//! regular promotion's budget. Unique per `(regular_code, account_code)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regular_accountlis_badget")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code of the owning regular promotion
    pub regular_code: String,
    /// Account reference code
    pub account_code: String,
    /// Account name at the time the line was saved
    pub account_name: String,
    /// Allocated budget
    pub budget: Decimal,
}

/// Defines relationships between budget lines and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one regular promotion
    #[sea_orm(
        belongs_to = "super::regular_pwp::Entity",
        from = "Column::RegularCode",
        to = "super::regular_pwp::Column::Code"
    )]
    RegularPwp,
}

impl Related<super::regular_pwp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RegularPwp.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
