//! Unified error type for the PWP console.
//!
//! Every layer returns [`Result`]. Core operations propagate with `?`; the bot
//! layer turns each variant into an operator-facing reply.

use thiserror::Error;

/// All errors the console can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Failure reported by the database layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A required form field was empty.
    #[error("{field} is required")]
    MissingField {
        /// Name of the empty field
        field: &'static str,
    },

    /// An amount was negative or could not be parsed.
    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount {
        /// Field the amount was entered into
        field: &'static str,
        /// Raw value as entered
        value: String,
    },

    /// A record looked up by code does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Code or id used for the lookup
        key: String,
    },

    /// The next code for a table could not be generated.
    #[error("Could not generate the next {table} code: {message}")]
    CodeGeneration {
        /// Table the code was generated for
        table: String,
        /// Underlying reason
        message: String,
    },

    /// Every generated code collided with a concurrent insert.
    #[error("Could not allocate a unique {table} code after {attempts} attempts")]
    CodeConflict {
        /// Table the code was generated for
        table: String,
        /// Number of insert attempts made
        attempts: u32,
    },

    /// The record changed since it was loaded.
    #[error("{entity} '{code}' was modified by someone else; reload and try again")]
    StaleRecord {
        /// Kind of record
        entity: &'static str,
        /// Code of the record
        code: String,
    },

    /// A line item could not be written during reconciliation.
    #[error("Saving line item {item} failed: {source}")]
    LineItemWrite {
        /// Natural key of the line item
        item: String,
        /// Database failure
        #[source]
        source: sea_orm::DbErr,
    },

    /// One step of a cascading delete failed; the parent row was kept.
    #[error("Deleting {step} for '{code}' failed: {source}")]
    CascadeStep {
        /// Dependent table being cleared
        step: &'static str,
        /// Code of the parent record
        code: String,
        /// Database failure
        #[source]
        source: sea_orm::DbErr,
    },

    /// The record is still referenced and cannot be deleted.
    #[error("{entity} '{code}' is still referenced by {count} {dependents}")]
    HasDependents {
        /// Kind of record
        entity: &'static str,
        /// Code of the record
        code: String,
        /// Number of referencing rows
        count: u64,
        /// What references it
        dependents: &'static str,
    },

    /// The requested approval status change is not allowed.
    #[error("Cannot {action} a promotion that is {status}")]
    InvalidTransition {
        /// Attempted action
        action: &'static str,
        /// Current status
        status: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Integer conversion error.
    #[error("Conversion error: {0}")]
    Conversion(#[from] std::num::TryFromIntError),

    /// Building a reply failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_part() {
        let err = Error::CascadeStep {
            step: "budget line items",
            code: "RP00001".to_string(),
            source: sea_orm::DbErr::Custom("disk full".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Deleting budget line items for 'RP00001' failed: Custom Error: disk full"
        );

        let err = Error::MissingField { field: "Title" };
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_db_err_converts() {
        let err: Error = sea_orm::DbErr::RecordNotUpdated.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
