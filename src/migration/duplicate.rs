//! Classification of "already exists" failures
//!
//! Engines that know a failure is a duplicate index report
//! [`LifeError::DuplicateIndex`]. PostgreSQL errors are recognized by SQLSTATE
//! `42P07`, with the name taken from the server's message. Everything else is
//! recognized by its text: a quoted name followed by "already exists", e.g.
//! `relation "index_users_on_email" already exists`.
//!
//! The error itself is never rewritten. `42P07` covers any relation, so the name
//! may belong to a table or view; the caller checks it against the table's indexes.

use crate::LifeError;
use once_cell::sync::Lazy;
use regex::Regex;

/// SQLSTATE `duplicate_table`, raised for any relation name clash (indexes included)
pub const DUPLICATE_RELATION: &str = "42P07";

static ALREADY_EXISTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["']([^"']+)["'].*already exists"#).expect("already-exists pattern is valid")
});

/// Name of the object an "already exists" failure refers to
///
/// Returns `None` for failures of any other kind.
pub fn already_exists_name(error: &LifeError) -> Option<String> {
    match error {
        LifeError::DuplicateIndex { name, .. } => Some(name.clone()),
        LifeError::PostgresError(e) => {
            let db = e.as_db_error()?;
            if db.code().code() != DUPLICATE_RELATION {
                return None;
            }
            quoted_name(db.message())
        }
        other => quoted_name(&other.to_string()),
    }
}

fn quoted_name(message: &str) -> Option<String> {
    ALREADY_EXISTS
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_duplicate() {
        let err = LifeError::DuplicateIndex {
            name: "idx_t_a".to_string(),
            table: "t".to_string(),
        };
        assert_eq!(already_exists_name(&err).as_deref(), Some("idx_t_a"));
    }

    #[test]
    fn test_postgres_message_double_quotes() {
        let err = LifeError::QueryError("ERROR: relation \"idx_t_a\" already exists".to_string());
        assert_eq!(already_exists_name(&err).as_deref(), Some("idx_t_a"));
    }

    #[test]
    fn test_single_quotes() {
        let err = LifeError::Other("index 'idx_t_a' already exists".to_string());
        assert_eq!(already_exists_name(&err).as_deref(), Some("idx_t_a"));
    }

    #[test]
    fn test_first_quoted_name_wins() {
        let err = LifeError::QueryError("index \"idx_t_a\" on \"t\" already exists".to_string());
        assert_eq!(already_exists_name(&err).as_deref(), Some("idx_t_a"));
    }

    #[test]
    fn test_server_message_without_prefix() {
        assert_eq!(
            quoted_name("relation \"index_users_on_email\" already exists").as_deref(),
            Some("index_users_on_email")
        );
        assert_eq!(quoted_name("duplicate key value violates unique constraint \"x\""), None);
    }

    #[test]
    fn test_unrelated_failures() {
        let err = LifeError::QueryError("column \"z\" does not exist".to_string());
        assert_eq!(already_exists_name(&err), None);

        let err = LifeError::QueryError("index already exists".to_string());
        assert_eq!(already_exists_name(&err), None);
    }
}
