//! Operator session.
//!
//! Every mutating operation takes the acting operator explicitly instead of
//! reading a "current user" from shared state. The bot builds one per
//! command invocation.

/// The operator on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    display_name: String,
}

impl Session {
    /// Creates a session for `user_id`, recorded in history rows as `display_name`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Stable identifier of the operator.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Name written to `created_by`, `actor` and `uploaded_by` columns.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
