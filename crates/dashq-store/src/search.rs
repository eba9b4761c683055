//! Parameterized query history search
//!
//! The SQL text is assembled only from fixed fragments and dialect
//! literals; every caller-supplied value is bound as a parameter in the
//! order its placeholder appears.

use crate::dialect::Dialect;
use dashq_core::model::{SearchFilter, Sort};
use rusqlite::types::Value;

/// How the star table joins the query history rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Only starred rows; `starred` is always true
    Inner,
    /// All rows; `starred` reports whether the join matched
    Left,
}

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct SearchQuery<'d> {
    dialect: &'d dyn Dialect,
    org_id: i64,
    user_id: i64,
    join: JoinMode,
    datasource_uids: Vec<String>,
    contains: Option<String>,
    sort: Sort,
    limit: i64,
    offset: i64,
}

impl<'d> SearchQuery<'d> {
    /// Search scoped to one org and user
    pub fn new(dialect: &'d dyn Dialect, org_id: i64, user_id: i64) -> Self {
        Self {
            dialect,
            org_id,
            user_id,
            join: JoinMode::Left,
            datasource_uids: Vec::new(),
            contains: None,
            sort: Sort::TimeDesc,
            limit: -1,
            offset: 0,
        }
    }

    /// Build from a normalized filter
    pub fn from_filter(
        dialect: &'d dyn Dialect,
        org_id: i64,
        user_id: i64,
        filter: &SearchFilter,
    ) -> Self {
        Self::new(dialect, org_id, user_id)
            .join(if filter.only_starred {
                JoinMode::Inner
            } else {
                JoinMode::Left
            })
            .datasources(&filter.datasource_uids)
            .contains(&filter.search_string)
            .order(filter.sort)
            .page(filter.limit, filter.page)
    }

    pub fn join(mut self, join: JoinMode) -> Self {
        self.join = join;
        self
    }

    /// Restrict to these datasources; an empty set matches nothing
    pub fn datasources(mut self, uids: &[String]) -> Self {
        self.datasource_uids = uids.to_vec();
        self
    }

    /// Case-insensitive substring of the serialized queries; empty is no filter
    pub fn contains(mut self, text: &str) -> Self {
        self.contains = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self
    }

    pub fn order(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// `limit` rows starting at 1-based `page`
    ///
    /// The offset saturates, so a page past `i64::MAX` rows is simply empty.
    pub fn page(mut self, limit: i64, page: i64) -> Self {
        self.limit = limit;
        self.offset = limit.max(0).saturating_mul(page.max(1) - 1);
        self
    }

    pub fn build(&self) -> BuiltQuery {
        let mut sql = String::from(
            "SELECT qh.id, qh.uid, qh.org_id, qh.datasource_uid, qh.created_by, \
             qh.created_at, qh.comment, qh.queries, ",
        );
        let mut params: Vec<Value> = Vec::new();

        match self.join {
            JoinMode::Inner => {
                sql.push_str(self.dialect.boolean_str(true));
                sql.push_str(
                    " AS starred FROM query_history qh \
                     INNER JOIN query_history_star qhs \
                     ON qhs.query_uid = qh.uid AND qhs.user_id = ?",
                );
            }
            JoinMode::Left => {
                sql.push_str("CASE WHEN qhs.query_uid IS NULL THEN ");
                sql.push_str(self.dialect.boolean_str(false));
                sql.push_str(" ELSE ");
                sql.push_str(self.dialect.boolean_str(true));
                sql.push_str(
                    " END AS starred FROM query_history qh \
                     LEFT JOIN query_history_star qhs \
                     ON qhs.query_uid = qh.uid AND qhs.user_id = ?",
                );
            }
        }
        params.push(Value::Integer(self.user_id));

        sql.push_str(" WHERE qh.org_id = ? AND qh.created_by = ?");
        params.push(Value::Integer(self.org_id));
        params.push(Value::Integer(self.user_id));

        if self.datasource_uids.is_empty() {
            sql.push_str(" AND 1 = 0");
        } else {
            sql.push_str(" AND qh.datasource_uid IN (");
            for (i, uid) in self.datasource_uids.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('?');
                params.push(Value::Text(uid.clone()));
            }
            sql.push(')');
        }

        if let Some(text) = &self.contains {
            sql.push_str(" AND qh.queries ");
            sql.push_str(self.dialect.like_str());
            sql.push_str(" ? ESCAPE '");
            sql.push(self.dialect.like_escape());
            sql.push('\'');
            params.push(Value::Text(format!("%{}%", self.dialect.escape_like(text))));
        }

        // id breaks created_at ties so pages never overlap
        match self.sort {
            Sort::TimeAsc => sql.push_str(" ORDER BY qh.created_at ASC, qh.id ASC"),
            Sort::TimeDesc => sql.push_str(" ORDER BY qh.created_at DESC, qh.id DESC"),
        }

        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(self.limit));
        params.push(Value::Integer(self.offset));

        BuiltQuery { sql, params }
    }
}
