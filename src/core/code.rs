//! Sequential code generation.
//!
//! Every table hands out short codes from its own sequence: a fixed prefix,
//! a minimum digit width and a seed used when the table has no codes yet.
//! The next code is always one past the largest numeric suffix currently in
//! the table, so gaps left by deletes are never refilled.
//!
//! Two writers can read the same maximum. Codes therefore sit behind unique
//! indexes and callers retry the insert with a fresh code on a unique
//! violation (see [`is_unique_violation`] and [`CodeBook::retry_attempts`]).

use crate::{
    config::settings::Settings,
    core::reference::ReferenceKind,
    errors::{Error, Result},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, SqlErr,
};
use std::collections::HashMap;
use tracing::debug;

/// Table name of the regular promotion sequence
pub const REGULAR_PWP_TABLE: &str = "regular_pwp";
/// Table name of the cover promotion sequence
pub const COVER_PWP_TABLE: &str = "cover_pwp";

/// Prefix, width and seed of one table's codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSequence {
    prefix: String,
    width: usize,
    seed: u64,
}

impl CodeSequence {
    /// Creates a sequence, e.g. `CodeSequence::new("A", 5, 1)` for `A00001`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, width: usize, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            seed,
        }
    }

    /// The fixed prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Renders `number` with the prefix and zero padding.
    #[must_use]
    pub fn format(&self, number: u64) -> String {
        format!("{}{:0width$}", self.prefix, number, width = self.width)
    }

    /// The first code of an empty table.
    #[must_use]
    pub fn seed_code(&self) -> String {
        self.format(self.seed)
    }

    /// Numeric suffix of `code`, or `None` when the code does not belong to
    /// this sequence.
    #[must_use]
    pub fn suffix_of(&self, code: &str) -> Option<u64> {
        let digits = code.trim().strip_prefix(self.prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Next code after the given existing codes.
    ///
    /// Codes outside the sequence are ignored. With none left the seed code
    /// is returned.
    pub fn next_after<'a, I>(&self, existing: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(max) = existing.into_iter().filter_map(|c| self.suffix_of(c)).max() else {
            return Ok(self.seed_code());
        };

        max.checked_add(1)
            .map(|next| self.format(next))
            .ok_or_else(|| Error::CodeGeneration {
                table: self.prefix.clone(),
                message: format!("suffix {max} cannot be incremented"),
            })
    }

    /// `LIKE` pattern selecting candidate codes.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        format!("{}%", self.prefix)
    }
}

/// Code sequences for every table plus the retry budget for colliding inserts.
#[derive(Debug, Clone)]
pub struct CodeBook {
    sequences: HashMap<String, CodeSequence>,
    retry_attempts: u32,
}

impl Default for CodeBook {
    fn default() -> Self {
        let mut sequences: HashMap<String, CodeSequence> = ReferenceKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), kind.default_sequence()))
            .collect();
        sequences.insert(
            REGULAR_PWP_TABLE.to_string(),
            CodeSequence::new("RP", 5, 1),
        );
        sequences.insert(COVER_PWP_TABLE.to_string(), CodeSequence::new("CP", 5, 1));

        Self {
            sequences,
            retry_attempts: 3,
        }
    }
}

impl CodeBook {
    /// Built-in sequences with the overrides and retry budget from `settings`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut book = Self::default();
        for (table, config) in &settings.sequences {
            book.sequences.insert(
                table.clone(),
                CodeSequence::new(config.prefix.clone(), config.width, config.seed),
            );
        }
        book.retry_attempts = settings.console.code_retry_attempts.max(1);
        book
    }

    /// Sequence used by `table`.
    pub fn sequence(&self, table: &str) -> Result<&CodeSequence> {
        self.sequences
            .get(table)
            .ok_or_else(|| Error::CodeGeneration {
                table: table.to_string(),
                message: "no code sequence configured".to_string(),
            })
    }

    /// How many times an insert is attempted before giving up on collisions.
    #[must_use]
    pub const fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }
}

/// Reads the codes matching `sequence` from `query` and returns the next one.
///
/// A failed read aborts generation with [`Error::CodeGeneration`], so no row
/// is ever inserted without a code.
pub async fn generate_code<C, E>(
    db: &C,
    table: &str,
    sequence: &CodeSequence,
    query: Select<E>,
    column: E::Column,
) -> Result<String>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let existing: Vec<String> = query
        .filter(column.like(sequence.like_pattern()))
        .select_only()
        .column(column)
        .order_by_desc(column)
        .into_tuple()
        .all(db)
        .await
        .map_err(|e| Error::CodeGeneration {
            table: table.to_string(),
            message: e.to_string(),
        })?;

    let code = sequence.next_after(existing.iter().map(String::as_str))?;
    debug!(table, %code, "Generated next code");
    Ok(code)
}

/// True when the error is a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("UNIQUE constraint failed")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefixed_code_increments() {
        let seq = CodeSequence::new("A", 5, 1);
        assert_eq!(seq.next_after(["A00057"]).unwrap(), "A00058");
    }

    #[test]
    fn test_empty_table_yields_seed() {
        assert_eq!(
            CodeSequence::new("A", 5, 1).next_after([]).unwrap(),
            "A00001"
        );
        assert_eq!(
            CodeSequence::new("", 5, 20001).next_after([]).unwrap(),
            "20001"
        );
    }

    #[test]
    fn test_numeric_max_not_lexicographic_max() {
        let seq = CodeSequence::new("", 4, 5000);
        assert_eq!(seq.next_after(["9999", "10000", "5000"]).unwrap(), "10001");
    }

    #[test]
    fn test_foreign_codes_are_ignored() {
        let seq = CodeSequence::new("SG", 3, 1);
        assert_eq!(seq.next_after(["SGX01", "SG", "XX999", "SG004"]).unwrap(), "SG005");
        assert_eq!(seq.next_after(["SGX01"]).unwrap(), "SG001");
    }

    #[test]
    fn test_width_is_a_minimum() {
        let seq = CodeSequence::new("A", 5, 1);
        assert_eq!(seq.next_after(["A99999"]).unwrap(), "A100000");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let seq = CodeSequence::new("", 1, 1);
        let max = u64::MAX.to_string();
        assert!(matches!(
            seq.next_after([max.as_str()]),
            Err(Error::CodeGeneration { .. })
        ));
    }

    #[test]
    fn test_code_book_defaults_and_overrides() {
        let book = CodeBook::default();
        assert_eq!(book.sequence("account").unwrap().prefix(), "A");
        assert_eq!(book.sequence("account").unwrap().seed_code(), "A00001");
        assert_eq!(book.sequence("distributor").unwrap().seed_code(), "20001");
        assert_eq!(book.sequence(REGULAR_PWP_TABLE).unwrap().seed_code(), "RP00001");
        assert!(book.sequence("nonsense").is_err());

        let settings = crate::config::settings::parse_settings(
            r#"
            [console]
            code_retry_attempts = 0

            [sequences.account]
            prefix = "ACC"
            width = 3
            seed = 7
        "#,
        )
        .unwrap();
        let book = CodeBook::from_settings(&settings);
        assert_eq!(book.sequence("account").unwrap().prefix(), "ACC");
        assert_eq!(book.sequence("account").unwrap().seed_code(), "ACC007");
        assert_eq!(book.sequence(COVER_PWP_TABLE).unwrap().prefix(), "CP");
        assert_eq!(book.retry_attempts(), 1);
    }

    proptest! {
        #[test]
        fn prop_next_code_is_max_suffix_plus_one(
            suffixes in proptest::collection::vec(0u64..1_000_000, 1..20),
            width in 1usize..8,
        ) {
            let seq = CodeSequence::new("P", width, 1);
            let codes: Vec<String> = suffixes.iter().map(|n| seq.format(*n)).collect();
            let next = seq.next_after(codes.iter().map(String::as_str)).unwrap();
            let max = suffixes.iter().max().copied().unwrap();
            prop_assert_eq!(next, format!("P{:0width$}", max + 1, width = width));
        }

        #[test]
        fn prop_generated_code_parses_back(seed in 0u64..100_000, width in 1usize..8) {
            let seq = CodeSequence::new("A", width, seed);
            let code = seq.seed_code();
            prop_assert_eq!(seq.suffix_of(&code), Some(seed));
        }
    }
}
