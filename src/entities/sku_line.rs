//! SKU line entity (`regular_sku_listing`) - a SKU billed under a regular
//! promotion. `billing_amount` is always `srp * qty - discount`.
//!
//! Each promotion also carries one `row_type = "total"` row aggregating the
//! item rows; it never counts towards the promotion's line item total.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Row type of an ordinary SKU line
pub const ROW_TYPE_ITEM: &str = "item";
/// Row type of the aggregate line
pub const ROW_TYPE_TOTAL: &str = "total";

/// SKU line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regular_sku_listing")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Code of the owning regular promotion
    pub regular_code: String,
    /// SKU reference code (`"TOTAL"` on the aggregate row)
    pub sku: String,
    /// Suggested retail price per unit
    pub srp: Decimal,
    /// Quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Discount applied to the whole line
    pub discount: Decimal,
    /// `srp * qty - discount`
    pub billing_amount: Decimal,
    /// `"item"` or `"total"`
    pub row_type: String,
}

/// Defines relationships between SKU lines and other entities
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
