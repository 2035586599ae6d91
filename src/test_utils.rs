//! Shared test utilities for the PWP console.
//!
//! This module provides common helper functions for setting up test databases
//! and creating reference data and promotions with sensible defaults.

use crate::{
    core::{
        code::CodeBook,
        pwp::{RegularPwpForm, create_regular_pwp},
        reference::{ReferenceKind, create_reference_record},
        session::Session,
    },
    entities::{reference_record, regular_pwp},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The operator every test acts as (display name `"Tester"`).
pub fn test_session() -> Session {
    Session::new("1000", "Tester")
}

/// Creates a reference record with the next generated code of its kind.
pub async fn create_test_reference(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    name: &str,
) -> Result<reference_record::Model> {
    create_reference_record(db, &CodeBook::default(), kind, name, None).await
}

/// Inserts a reference record with an explicit code, bypassing generation.
/// Use this to simulate legacy data or a code taken by another writer.
pub async fn insert_reference_with_code(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    code: &str,
    name: &str,
) -> Result<reference_record::Model> {
    let now = chrono::Utc::now().naive_utc();
    reference_record::ActiveModel {
        kind: Set(kind.as_str().to_string()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Builds a regular promotion form with no cover.
///
/// # Defaults
/// * `title`: `"Test promotion"`
pub fn regular_form(distributor_code: &str, activity_code: &str, amount: Decimal) -> RegularPwpForm {
    RegularPwpForm {
        title: "Test promotion".to_string(),
        distributor_code: distributor_code.to_string(),
        activity_code: activity_code.to_string(),
        cover_code: None,
        amount_budget: amount,
    }
}

/// Sets up a complete test environment with one regular promotion.
///
/// The distributor gets code `"20001"`, the activity `"8000"` and the
/// promotion `"RP00001"` with an approved budget of 10000.
/// Returns (db, codes, promotion) for common test scenarios.
pub async fn setup_with_regular() -> Result<(DatabaseConnection, CodeBook, regular_pwp::Model)> {
    let db = setup_test_db().await?;
    let codes = CodeBook::default();
    let distributor = create_test_reference(&db, ReferenceKind::Distributor, "North Luzon Trading")
        .await?;
    let activity = create_test_reference(&db, ReferenceKind::Activity, "Display").await?;

    let regular = create_regular_pwp(
        &db,
        &codes,
        &test_session(),
        regular_form(&distributor.code, &activity.code, Decimal::from(10_000)),
    )
    .await?;
    Ok((db, codes, regular))
}
