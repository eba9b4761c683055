//! Query history operations
//!
//! Every operation is scoped to the calling user's org and user id. The
//! mutations that touch the star table (delete, comment patch, star,
//! unstar) each run inside exactly one transaction, so a failure part way
//! through is never observable.

#![allow(clippy::result_large_err)]

use dashq_core::errors::{DashqError, ExError};
use dashq_core::model::{
    CreateQueryCommand, PatchQueryCommentCommand, QueryHistory, QueryHistoryDto,
    QueryHistoryStar, SearchFilter, SignedInUser,
};
use dashq_core::uid::generate_short_uid;
use dashq_store::errors::Result;
use dashq_store::{advisory, QueryHistoryRepo, SqlStore};
use std::time::Instant;

/// Record a query the user just ran
///
/// A new row is never starred, so the returned DTO has `starred = false`.
pub fn create_query(
    store: &SqlStore,
    user: &SignedInUser,
    cmd: CreateQueryCommand,
) -> Result<QueryHistoryDto> {
    let start = Instant::now();
    dashq_core::log_op_start!(
        "create_query",
        org_id = user.org_id,
        user_id = user.user_id,
        datasource_uid = cmd.datasource_uid.as_str()
    );

    match create_query_impl(store, user, cmd) {
        Ok(dto) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!(
                "create_query",
                duration_ms = duration_ms,
                query_uid = dto.uid.as_str()
            );
            Ok(dto)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!("create_query", e.clone(), duration_ms = duration_ms);
            Err(e)
        }
    }
}

fn create_query_impl(
    store: &SqlStore,
    user: &SignedInUser,
    cmd: CreateQueryCommand,
) -> Result<QueryHistoryDto> {
    let mut query = QueryHistory {
        id: 0,
        uid: generate_short_uid(),
        org_id: user.org_id,
        datasource_uid: cmd.datasource_uid,
        created_by: user.user_id,
        created_at: chrono::Utc::now().timestamp(),
        comment: String::new(),
        queries: cmd.queries,
    };

    let id = store.with_session(|conn| QueryHistoryRepo::insert_query(conn, &query))?;
    query.id = id;
    Ok(query.into_dto(false))
}

/// Search the caller's history
///
/// ## Errors
///
/// - `InvalidArgument`: `filter.datasource_uids` is empty
pub fn search_queries(
    store: &SqlStore,
    user: &SignedInUser,
    filter: SearchFilter,
) -> Result<Vec<QueryHistoryDto>> {
    let start = Instant::now();
    dashq_core::log_op_start!(
        "search_queries",
        org_id = user.org_id,
        user_id = user.user_id,
        only_starred = filter.only_starred
    );

    let result = filter
        .normalized(store.config().default_search_limit)
        .map_err(ExError::from)
        .and_then(|filter| {
            store.with_session(|conn| {
                QueryHistoryRepo::search(conn, store.dialect(), user, &filter)
            })
        });

    match result {
        Ok(rows) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!(
                "search_queries",
                duration_ms = duration_ms,
                result_len = rows.len()
            );
            Ok(rows)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!("search_queries", e.clone(), duration_ms = duration_ms);
            Err(e)
        }
    }
}

/// Delete a query and any star the caller put on it
///
/// Returns the internal id of the deleted row.
///
/// ## Errors
///
/// - `QueryNotFound`: no row with this uid for the caller; nothing changes
pub fn delete_query(store: &SqlStore, user: &SignedInUser, uid: &str) -> Result<i64> {
    let start = Instant::now();
    dashq_core::log_op_start!("delete_query", query_uid = uid, user_id = user.user_id);

    let result = store.with_transaction(|tx| {
        // A missing or undeletable star never blocks the delete
        advisory(
            "unstar_before_delete",
            QueryHistoryRepo::delete_star(tx, user.user_id, uid),
        );

        QueryHistoryRepo::delete_query(tx, user, uid)?.ok_or_else(|| {
            DashqError::QueryNotFound {
                query_uid: uid.to_string(),
            }
            .into()
        })
    });

    match result {
        Ok(id) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!("delete_query", duration_ms = duration_ms, query_uid = uid);
            Ok(id)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "delete_query",
                e.clone(),
                duration_ms = duration_ms,
                query_uid = uid
            );
            Err(e)
        }
    }
}

/// Replace the comment on one of the caller's queries
///
/// ## Errors
///
/// - `QueryNotFound`: no row with this uid for the caller
pub fn patch_query_comment(
    store: &SqlStore,
    user: &SignedInUser,
    uid: &str,
    cmd: PatchQueryCommentCommand,
) -> Result<QueryHistoryDto> {
    let start = Instant::now();
    dashq_core::log_op_start!("patch_query_comment", query_uid = uid, user_id = user.user_id);

    let result = store.with_transaction(|tx| {
        let mut query = QueryHistoryRepo::require_query(tx, user, uid)?;
        QueryHistoryRepo::update_comment(tx, query.id, &cmd.comment)?;
        query.comment = cmd.comment;
        let starred = QueryHistoryRepo::is_starred(tx, user.user_id, uid)?;
        Ok(query.into_dto(starred))
    });

    match result {
        Ok(dto) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!(
                "patch_query_comment",
                duration_ms = duration_ms,
                query_uid = uid
            );
            Ok(dto)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "patch_query_comment",
                e.clone(),
                duration_ms = duration_ms,
                query_uid = uid
            );
            Err(e)
        }
    }
}

/// Star one of the caller's queries
///
/// ## Errors
///
/// - `QueryNotFound`: no row with this uid for the caller
/// - `QueryAlreadyStarred`: the caller already starred it
pub fn star_query(store: &SqlStore, user: &SignedInUser, uid: &str) -> Result<QueryHistoryDto> {
    let start = Instant::now();
    dashq_core::log_op_start!("star_query", query_uid = uid, user_id = user.user_id);

    let result = store.with_transaction(|tx| {
        let query = QueryHistoryRepo::require_query(tx, user, uid)?;
        let star = QueryHistoryStar {
            user_id: user.user_id,
            query_uid: query.uid.clone(),
        };
        QueryHistoryRepo::insert_star(tx, store.dialect(), &star)?;
        Ok(query.into_dto(true))
    });

    match result {
        Ok(dto) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!("star_query", duration_ms = duration_ms, query_uid = uid);
            Ok(dto)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "star_query",
                e.clone(),
                duration_ms = duration_ms,
                query_uid = uid
            );
            Err(e)
        }
    }
}

/// Remove the caller's star from a query
///
/// ## Errors
///
/// - `QueryNotFound`: no row with this uid for the caller
/// - `StarredQueryNotFound`: the caller has no star on it
pub fn unstar_query(store: &SqlStore, user: &SignedInUser, uid: &str) -> Result<QueryHistoryDto> {
    let start = Instant::now();
    dashq_core::log_op_start!("unstar_query", query_uid = uid, user_id = user.user_id);

    let result = store.with_transaction(|tx| {
        let query = QueryHistoryRepo::require_query(tx, user, uid)?;
        if QueryHistoryRepo::delete_star(tx, user.user_id, uid)? == 0 {
            return Err(DashqError::StarredQueryNotFound {
                query_uid: uid.to_string(),
            }
            .into());
        }
        Ok(query.into_dto(false))
    });

    match result {
        Ok(dto) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!("unstar_query", duration_ms = duration_ms, query_uid = uid);
            Ok(dto)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "unstar_query",
                e.clone(),
                duration_ms = duration_ms,
                query_uid = uid
            );
            Err(e)
        }
    }
}
