//! Query history entities and their read projection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A previously executed data-source query, owned by one org+user pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistory {
    pub id: i64,
    pub uid: String,
    pub org_id: i64,
    pub datasource_uid: String,
    pub created_by: i64,
    /// Unix seconds, set once at creation
    pub created_at: i64,
    pub comment: String,
    /// Opaque query definitions, kept in their original order
    pub queries: Vec<Value>,
}

impl QueryHistory {
    /// Project into the DTO with the per-request starred flag
    pub fn to_dto(&self, starred: bool) -> QueryHistoryDto {
        QueryHistoryDto {
            uid: self.uid.clone(),
            datasource_uid: self.datasource_uid.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            comment: self.comment.clone(),
            queries: self.queries.clone(),
            starred,
        }
    }

    pub fn into_dto(self, starred: bool) -> QueryHistoryDto {
        QueryHistoryDto {
            uid: self.uid,
            datasource_uid: self.datasource_uid,
            created_by: self.created_by,
            created_at: self.created_at,
            comment: self.comment,
            queries: self.queries,
            starred,
        }
    }
}

/// Join row marking a query as starred by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryStar {
    pub user_id: i64,
    pub query_uid: String,
}

/// Read projection returned by every query history operation
///
/// `starred` is computed per request from the star table; it is never
/// stored on the query row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryDto {
    pub uid: String,
    pub datasource_uid: String,
    pub created_by: i64,
    pub created_at: i64,
    pub comment: String,
    pub queries: Vec<Value>,
    pub starred: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryCommand {
    pub datasource_uid: String,
    pub queries: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchQueryCommentCommand {
    pub comment: String,
}
