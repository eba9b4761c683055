//! Row-level access to query_history and query_history_star
//!
//! Every function takes a `&Connection`, so it runs equally inside a
//! session or a transaction (`Transaction` derefs to `Connection`).
//! Composition into atomic operations happens one layer up.

use crate::dialect::Dialect;
use crate::errors::{from_rusqlite, serialization_error, Result};
use crate::search::SearchQuery;
use dashq_core::errors::DashqError;
use dashq_core::model::{QueryHistory, QueryHistoryDto, QueryHistoryStar, SearchFilter, SignedInUser};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::Value;

pub struct QueryHistoryRepo;

impl QueryHistoryRepo {
    /// Insert a new row; returns its internal id
    pub fn insert_query(conn: &Connection, query: &QueryHistory) -> Result<i64> {
        let queries = serde_json::to_string(&query.queries)
            .map_err(|e| serialization_error("insert_query", e))?;

        conn.execute(
            "INSERT INTO query_history (uid, org_id, datasource_uid, created_by, created_at, comment, queries)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                query.uid,
                query.org_id,
                query.datasource_uid,
                query.created_by,
                query.created_at,
                query.comment,
                queries,
            ],
        )
        .map_err(from_rusqlite)?;

        let id = conn.last_insert_rowid();
        tracing::debug!(query_uid = %query.uid, id, "Inserted query history row");
        Ok(id)
    }

    /// Fetch a row owned by `user`
    pub fn get_query(
        conn: &Connection,
        user: &SignedInUser,
        uid: &str,
    ) -> Result<Option<QueryHistory>> {
        conn.query_row(
            "SELECT id, uid, org_id, datasource_uid, created_by, created_at, comment, queries
             FROM query_history
             WHERE org_id = ?1 AND created_by = ?2 AND uid = ?3",
            rusqlite::params![user.org_id, user.user_id, uid],
            row_to_query_history,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Fetch a row owned by `user` or fail with `QueryNotFound`
    pub fn require_query(conn: &Connection, user: &SignedInUser, uid: &str) -> Result<QueryHistory> {
        Self::get_query(conn, user, uid)?.ok_or_else(|| {
            DashqError::QueryNotFound {
                query_uid: uid.to_string(),
            }
            .into()
        })
    }

    /// Overwrite the comment of a row by internal id
    pub fn update_comment(conn: &Connection, id: i64, comment: &str) -> Result<usize> {
        conn.execute(
            "UPDATE query_history SET comment = ?1 WHERE id = ?2",
            rusqlite::params![comment, id],
        )
        .map_err(from_rusqlite)
    }

    /// Delete a row owned by `user`; returns the deleted row's id, if any
    pub fn delete_query(conn: &Connection, user: &SignedInUser, uid: &str) -> Result<Option<i64>> {
        conn.query_row(
            "DELETE FROM query_history
             WHERE org_id = ?1 AND created_by = ?2 AND uid = ?3
             RETURNING id",
            rusqlite::params![user.org_id, user.user_id, uid],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn is_starred(conn: &Connection, user_id: i64, uid: &str) -> Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM query_history_star WHERE user_id = ?1 AND query_uid = ?2)",
            rusqlite::params![user_id, uid],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }

    /// Insert a star row
    ///
    /// ## Errors
    ///
    /// - `QueryAlreadyStarred`: the `(user_id, query_uid)` pair already exists
    /// - `Persistence`: any other store failure
    pub fn insert_star(conn: &Connection, dialect: &dyn Dialect, star: &QueryHistoryStar) -> Result<()> {
        match conn.execute(
            "INSERT INTO query_history_star (user_id, query_uid) VALUES (?1, ?2)",
            rusqlite::params![star.user_id, star.query_uid],
        ) {
            Ok(_) => Ok(()),
            Err(e) if dialect.is_unique_constraint_violation(&e) => {
                Err(DashqError::QueryAlreadyStarred {
                    query_uid: star.query_uid.clone(),
                }
                .into())
            }
            Err(e) => Err(from_rusqlite(e)),
        }
    }

    /// Delete the star row for `(user_id, uid)`; returns affected rows
    pub fn delete_star(conn: &Connection, user_id: i64, uid: &str) -> Result<usize> {
        conn.execute(
            "DELETE FROM query_history_star WHERE user_id = ?1 AND query_uid = ?2",
            rusqlite::params![user_id, uid],
        )
        .map_err(from_rusqlite)
    }

    /// Run a search for `user`; `filter` must already be normalized
    pub fn search(
        conn: &Connection,
        dialect: &dyn Dialect,
        user: &SignedInUser,
        filter: &SearchFilter,
    ) -> Result<Vec<QueryHistoryDto>> {
        let built = SearchQuery::from_filter(dialect, user.org_id, user.user_id, filter).build();

        let mut stmt = conn.prepare(&built.sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(built.params.iter()), |row| {
                let starred: bool = row.get(8)?;
                Ok(row_to_query_history(row)?.into_dto(starred))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        tracing::debug!(result_len = rows.len(), "Searched query history");
        Ok(rows)
    }
}

fn row_to_query_history(row: &Row<'_>) -> rusqlite::Result<QueryHistory> {
    let queries_json: String = row.get(7)?;
    let queries: Vec<Value> = serde_json::from_str(&queries_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(QueryHistory {
        id: row.get(0)?,
        uid: row.get(1)?,
        org_id: row.get(2)?,
        datasource_uid: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
        comment: row.get(6)?,
        queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;
    use crate::migrations::apply_migrations;
    use dashq_core::ExErrorKind;
    use serde_json::json;

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn row(uid: &str, user: &SignedInUser) -> QueryHistory {
        QueryHistory {
            id: 0,
            uid: uid.to_string(),
            org_id: user.org_id,
            datasource_uid: "ds1".to_string(),
            created_by: user.user_id,
            created_at: 1_700_000_000,
            comment: String::new(),
            queries: vec![json!({"refId": "A", "expr": "up"})],
        }
    }

    #[test]
    fn test_insert_and_get_roundtrip() {
        let conn = setup_test_db();
        let user = SignedInUser::new(1, 7);
        let id = QueryHistoryRepo::insert_query(&conn, &row("q1", &user)).unwrap();

        let fetched = QueryHistoryRepo::get_query(&conn, &user, "q1")
            .unwrap()
            .expect("row should exist");
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.queries, vec![json!({"refId": "A", "expr": "up"})]);
    }

    #[test]
    fn test_get_is_scoped_to_owner() {
        let conn = setup_test_db();
        let owner = SignedInUser::new(1, 7);
        QueryHistoryRepo::insert_query(&conn, &row("q1", &owner)).unwrap();

        let other_user = SignedInUser::new(1, 8);
        let other_org = SignedInUser::new(2, 7);
        assert!(QueryHistoryRepo::get_query(&conn, &other_user, "q1").unwrap().is_none());
        assert!(QueryHistoryRepo::get_query(&conn, &other_org, "q1").unwrap().is_none());

        let err = QueryHistoryRepo::require_query(&conn, &other_user, "q1").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
    }

    #[test]
    fn test_duplicate_uid_rejected_by_schema() {
        let conn = setup_test_db();
        let user = SignedInUser::new(1, 7);
        QueryHistoryRepo::insert_query(&conn, &row("q1", &user)).unwrap();
        let err = QueryHistoryRepo::insert_query(&conn, &row("q1", &user)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }

    #[test]
    fn test_star_uniqueness() {
        let conn = setup_test_db();
        let star = QueryHistoryStar {
            user_id: 7,
            query_uid: "q1".to_string(),
        };
        QueryHistoryRepo::insert_star(&conn, &SqliteDialect, &star).unwrap();
        let err = QueryHistoryRepo::insert_star(&conn, &SqliteDialect, &star).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::QueryAlreadyStarred);

        assert!(QueryHistoryRepo::is_starred(&conn, 7, "q1").unwrap());
        assert!(!QueryHistoryRepo::is_starred(&conn, 8, "q1").unwrap());
    }

    #[test]
    fn test_delete_returns_id() {
        let conn = setup_test_db();
        let user = SignedInUser::new(1, 7);
        let id = QueryHistoryRepo::insert_query(&conn, &row("q1", &user)).unwrap();

        assert_eq!(QueryHistoryRepo::delete_query(&conn, &user, "q1").unwrap(), Some(id));
        assert_eq!(QueryHistoryRepo::delete_query(&conn, &user, "q1").unwrap(), None);
    }

    #[test]
    fn test_corrupt_queries_column_surfaces_as_persistence_error() {
        let conn = setup_test_db();
        conn.execute_batch(
            "INSERT INTO query_history (uid, org_id, datasource_uid, created_by, created_at, queries)
             VALUES ('bad', 1, 'ds1', 7, 0, 'not json')",
        )
        .unwrap();
        let err = QueryHistoryRepo::get_query(&conn, &SignedInUser::new(1, 7), "bad").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
    }
}
