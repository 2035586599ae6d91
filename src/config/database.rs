//! Database configuration module for the PWP console.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; the composite natural keys that the
//! entity macros cannot express are added as unique indexes afterwards.

use crate::entities::{
    ApprovalHistory, Attachment, BudgetLine, BudgetLineColumn, CoverPwp, ReferenceRecord,
    ReferenceRecordColumn, RegularPwp, SkuLine, SkuLineColumn,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/pwp_console.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    debug!("Connecting to {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and natural-key indexes if they do not exist yet.
///
/// Parents are created before the line item tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, ReferenceRecord).await?;
    create_table(db, &schema, CoverPwp).await?;
    create_table(db, &schema, RegularPwp).await?;
    create_table(db, &schema, BudgetLine).await?;
    create_table(db, &schema, SkuLine).await?;
    create_table(db, &schema, Attachment).await?;
    create_table(db, &schema, ApprovalHistory).await?;

    let indexes = [
        Index::create()
            .name("idx_reference_records_kind_code")
            .table(ReferenceRecord)
            .col(ReferenceRecordColumn::Kind)
            .col(ReferenceRecordColumn::Code)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_budget_lines_regular_account")
            .table(BudgetLine)
            .col(BudgetLineColumn::RegularCode)
            .col(BudgetLineColumn::AccountCode)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_sku_lines_regular_sku")
            .table(SkuLine)
            .col(SkuLineColumn::RegularCode)
            .col(SkuLineColumn::Sku)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];
    for index in &indexes {
        db.execute(builder.build(index)).await?;
    }

    info!("Database tables ensured.");
    Ok(())
}
