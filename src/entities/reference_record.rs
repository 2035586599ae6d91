//! Reference record entity - distributors, categories, accounts, activities,
//! SKUs, positions, departments and sales groups share this table.
//!
//! `kind` tells the lists apart; `code` is unique within a kind and is
//! assigned from the kind's code sequence.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reference_records")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Which reference list this row belongs to (e.g. `"distributor"`)
    pub kind: String,
    /// Sequential code, unique per kind (e.g. `"A00057"`)
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// When the record was created
    pub created_at: DateTime,
    /// When the record was last modified
    pub updated_at: DateTime,
}

/// Reference records are looked up by code, not joined
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
