//! SQL dialect seam
//!
//! Everything backend-specific that the query history SQL depends on:
//! boolean literals, the case-insensitive pattern operator, and deciding
//! whether a failed write collided with a unique constraint.

use rusqlite::ffi;

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Literal for a boolean in a select list
    fn boolean_str(&self, value: bool) -> &'static str;

    /// Case-insensitive pattern-match operator
    fn like_str(&self) -> &'static str;

    /// Escape character used with `like_str` patterns
    fn like_escape(&self) -> char {
        '\\'
    }

    /// Quote `%`, `_` and the escape character so `text` matches literally
    fn escape_like(&self, text: &str) -> String {
        let escape = self.like_escape();
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if c == '%' || c == '_' || c == escape {
                out.push(escape);
            }
            out.push(c);
        }
        out
    }

    /// Whether a write failed because it violated a unique constraint
    fn is_unique_constraint_violation(&self, err: &rusqlite::Error) -> bool;
}

/// SQLite rendering
///
/// SQLite has no boolean type; `LIKE` is case-insensitive for ASCII unless
/// `case_sensitive_like` is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn boolean_str(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn like_str(&self) -> &'static str {
        "LIKE"
    }

    fn is_unique_constraint_violation(&self, err: &rusqlite::Error) -> bool {
        match err {
            rusqlite::Error::SqliteFailure(e, _) => {
                e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            _ => false,
        }
    }
}
