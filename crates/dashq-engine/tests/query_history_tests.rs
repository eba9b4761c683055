// Integration tests for the query history operations.
// Covers create, search, delete, comment patch, star and unstar.

use dashq_core::logging_facility::test_capture::init_test_capture;
use dashq_core::model::{
    CreateQueryCommand, PatchQueryCommentCommand, SearchFilter, SignedInUser, Sort,
};
use dashq_core::ExErrorKind;
use dashq_engine::{
    create_query, delete_query, patch_query_comment, search_queries, star_query, unstar_query,
};
use dashq_store::errors::from_rusqlite;
use dashq_store::SqlStore;
use serde_json::json;
use std::collections::HashSet;

fn setup_store() -> SqlStore {
    SqlStore::open_in_memory().unwrap()
}

fn user() -> SignedInUser {
    SignedInUser::new(1, 42).with_login("alice")
}

fn create(store: &SqlStore, user: &SignedInUser, ds: &str) -> String {
    create_query(
        store,
        user,
        CreateQueryCommand {
            datasource_uid: ds.to_string(),
            queries: vec![json!({"refId": "A", "expr": "up"})],
        },
    )
    .unwrap()
    .uid
}

fn count(store: &SqlStore, sql: &str) -> i64 {
    store
        .with_session(|conn| conn.query_row(sql, [], |r| r.get(0)).map_err(from_rusqlite))
        .unwrap()
}

fn set_created_at(store: &SqlStore, uid: &str, created_at: i64) {
    store
        .with_session(|conn| {
            conn.execute(
                "UPDATE query_history SET created_at = ?1 WHERE uid = ?2",
                rusqlite::params![created_at, uid],
            )
            .map_err(from_rusqlite)
        })
        .unwrap();
}

// ---------------------------------------------------------------------------
// create_query
// ---------------------------------------------------------------------------

#[test]
fn test_create_returns_unstarred_dto_with_fresh_uid() {
    // Given: An empty store
    let store = setup_store();
    let user = user();

    // When: A query is recorded
    let dto = create_query(
        &store,
        &user,
        CreateQueryCommand {
            datasource_uid: "ds1".to_string(),
            queries: vec![json!({"refId": "A"}), json!({"refId": "B"})],
        },
    )
    .unwrap();

    // Then: The DTO reflects the caller and is not starred
    assert_eq!(dto.uid.len(), 22);
    assert_eq!(dto.datasource_uid, "ds1");
    assert_eq!(dto.created_by, 42);
    assert_eq!(dto.comment, "");
    assert!(!dto.starred);
    assert!(dto.created_at > 0);
    assert_eq!(dto.queries, vec![json!({"refId": "A"}), json!({"refId": "B"})]);
}

#[test]
fn test_create_uids_are_unique() {
    let store = setup_store();
    let user = user();

    let uids: HashSet<String> = (0..50).map(|_| create(&store, &user, "ds1")).collect();

    assert_eq!(uids.len(), 50);
    assert!(uids.iter().all(|uid| !uid.is_empty()));
}

#[test]
fn test_create_logs_lifecycle_events() {
    let capture = init_test_capture();
    let store = setup_store();

    let uid = create(&store, &SignedInUser::new(1, 9001), "ds-logging");

    let ended = capture.count_events(|e| {
        e.op.as_deref() == Some("create_query")
            && e.event.as_deref() == Some("end")
            && e.fields.get("query_uid") == Some(&uid)
    });
    assert_eq!(ended, 1);
    capture.assert_event_exists("create_query", "start");
}

// ---------------------------------------------------------------------------
// search_queries
// ---------------------------------------------------------------------------

#[test]
fn test_create_then_search_by_ref_id() {
    // Given: One query with refId A on ds1
    let store = setup_store();
    let user = user();
    let created = create_query(
        &store,
        &user,
        CreateQueryCommand {
            datasource_uid: "ds1".to_string(),
            queries: vec![json!({"refId": "A"})],
        },
    )
    .unwrap();

    // When: Searching ds1 for "A"
    let found = search_queries(
        &store,
        &user,
        SearchFilter::for_datasources(["ds1"]).with_search_string("A"),
    )
    .unwrap();

    // Then: Exactly that DTO comes back, unstarred
    assert_eq!(found, vec![created]);
    assert!(!found[0].starred);
}

#[test]
fn test_search_without_datasources_is_invalid() {
    let store = setup_store();

    let err = search_queries(&store, &user(), SearchFilter::default()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);
    assert_eq!(err.kind().http_status(), 400);
}

#[test]
fn test_search_empty_result_is_not_an_error() {
    let store = setup_store();
    create(&store, &user(), "ds1");

    let found = search_queries(&store, &user(), SearchFilter::for_datasources(["ds2"])).unwrap();

    assert!(found.is_empty());
}

#[test]
fn test_search_far_past_last_page_is_empty() {
    let store = setup_store();
    create(&store, &user(), "ds1");

    let found = search_queries(
        &store,
        &user(),
        SearchFilter::for_datasources(["ds1"]).with_page(i64::MAX, 10),
    )
    .unwrap();

    assert!(found.is_empty());
}

#[test]
fn test_search_sort_and_paging() {
    // Given: 25 queries with distinct creation times
    let store = setup_store();
    let user = user();
    let mut uids = Vec::new();
    for i in 0..25 {
        let uid = create(&store, &user, "ds1");
        set_created_at(&store, &uid, 1_000 + i);
        uids.push(uid);
    }

    // When: Reading pages of 10, newest first
    let page = |n: i64| {
        search_queries(
            &store,
            &user,
            SearchFilter::for_datasources(["ds1"]).with_page(n, 10),
        )
        .unwrap()
        .into_iter()
        .map(|d| d.uid)
        .collect::<Vec<_>>()
    };
    let (p1, p2, p3) = (page(1), page(2), page(3));

    // Then: Pages are disjoint, ordered, and cover everything
    assert_eq!(p1.len(), 10);
    assert_eq!(p2.len(), 10);
    assert_eq!(p3.len(), 5);
    assert!(p1.iter().all(|uid| !p2.contains(uid)));
    let mut newest_first = uids.clone();
    newest_first.reverse();
    assert_eq!([p1, p2, p3].concat(), newest_first);

    // And: Ascending sort returns the creation order
    let asc: Vec<String> = search_queries(
        &store,
        &user,
        SearchFilter::for_datasources(["ds1"]).with_sort(Sort::TimeAsc),
    )
    .unwrap()
    .into_iter()
    .map(|d| d.uid)
    .collect();
    assert_eq!(asc, uids);
}

#[test]
fn test_only_starred_never_returns_unstarred() {
    let store = setup_store();
    let user = user();
    let a = create(&store, &user, "ds1");
    let _b = create(&store, &user, "ds1");
    star_query(&store, &user, &a).unwrap();

    let found = search_queries(
        &store,
        &user,
        SearchFilter::for_datasources(["ds1"]).with_only_starred(true),
    )
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uid, a);
    assert!(found.iter().all(|d| d.starred));
}

#[test]
fn test_search_is_scoped_to_caller() {
    let store = setup_store();
    let alice = user();
    let bob = SignedInUser::new(1, 43);
    create(&store, &alice, "ds1");

    let found = search_queries(&store, &bob, SearchFilter::for_datasources(["ds1"])).unwrap();

    assert!(found.is_empty());
}

// ---------------------------------------------------------------------------
// star_query / unstar_query
// ---------------------------------------------------------------------------

#[test]
fn test_star_then_unstar_leaves_no_star_row() {
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");

    let starred = star_query(&store, &user, &uid).unwrap();
    assert!(starred.starred);

    let unstarred = unstar_query(&store, &user, &uid).unwrap();
    assert!(!unstarred.starred);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history_star"), 0);
}

#[test]
fn test_star_twice_fails_with_already_starred() {
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");
    star_query(&store, &user, &uid).unwrap();

    let err = star_query(&store, &user, &uid).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::QueryAlreadyStarred);
    assert_eq!(err.entity_id(), Some(uid.as_str()));
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history_star"), 1);
}

#[test]
fn test_unstar_never_starred_fails() {
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");

    let err = unstar_query(&store, &user, &uid).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::StarredQueryNotFound);
    assert_eq!(err.kind().http_status(), 404);
}

#[test]
fn test_star_unknown_query_fails_without_inserting() {
    let store = setup_store();

    let err = star_query(&store, &user(), "missing").unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history_star"), 0);
}

#[test]
fn test_star_other_users_query_is_not_found() {
    let store = setup_store();
    let uid = create(&store, &user(), "ds1");

    let err = star_query(&store, &SignedInUser::new(1, 43), &uid).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
}

#[test]
fn test_star_failure_logged_as_warning() {
    let capture = init_test_capture();
    let store = setup_store();
    let user = SignedInUser::new(1, 9002);
    let uid = create(&store, &user, "ds1");
    star_query(&store, &user, &uid).unwrap();

    let _ = star_query(&store, &user, &uid);

    let warned = capture.count_events(|e| {
        e.op.as_deref() == Some("star_query")
            && e.event.as_deref() == Some("end_error")
            && e.fields.get("query_uid") == Some(&uid)
            && e.level == tracing::Level::WARN
            && e.fields.get("err_code").map(String::as_str) == Some("ERR_QUERY_ALREADY_STARRED")
    });
    assert_eq!(warned, 1);
}

// ---------------------------------------------------------------------------
// patch_query_comment
// ---------------------------------------------------------------------------

#[test]
fn test_patch_comment_keeps_starred_flag() {
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");
    star_query(&store, &user, &uid).unwrap();

    let dto = patch_query_comment(
        &store,
        &user,
        &uid,
        PatchQueryCommentCommand {
            comment: "slow on Mondays".to_string(),
        },
    )
    .unwrap();

    assert_eq!(dto.comment, "slow on Mondays");
    assert!(dto.starred);

    let found = search_queries(&store, &user, SearchFilter::for_datasources(["ds1"])).unwrap();
    assert_eq!(found[0].comment, "slow on Mondays");
}

#[test]
fn test_patch_comment_unknown_query() {
    let store = setup_store();

    let err = patch_query_comment(
        &store,
        &user(),
        "missing",
        PatchQueryCommentCommand {
            comment: "x".to_string(),
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
}

// ---------------------------------------------------------------------------
// delete_query
// ---------------------------------------------------------------------------

#[test]
fn test_delete_removes_row_and_star() {
    // Given: A starred query
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");
    star_query(&store, &user, &uid).unwrap();

    // When: It is deleted
    let id = delete_query(&store, &user, &uid).unwrap();

    // Then: Both rows are gone
    assert!(id > 0);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history"), 0);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history_star"), 0);

    // And: Deleting again reports not found
    let err = delete_query(&store, &user, &uid).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
}

#[test]
fn test_delete_unstarred_query_succeeds() {
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");

    assert!(delete_query(&store, &user, &uid).is_ok());
}

#[test]
fn test_failed_delete_rolls_back_star_removal() {
    // Given: Bob starred a uid that is not his own query
    let store = setup_store();
    let alice = user();
    let bob = SignedInUser::new(1, 43);
    let uid = create(&store, &alice, "ds1");
    store
        .with_session(|conn| {
            conn.execute(
                "INSERT INTO query_history_star (user_id, query_uid) VALUES (43, ?1)",
                [&uid],
            )
            .map_err(from_rusqlite)
        })
        .unwrap();

    // When: Bob tries to delete it
    let err = delete_query(&store, &bob, &uid).unwrap_err();

    // Then: The delete fails and the star removed inside it is restored
    assert_eq!(err.kind(), ExErrorKind::QueryNotFound);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history_star"), 1);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history"), 1);
}

#[test]
fn test_delete_proceeds_when_star_table_fails() {
    // Given: A query whose star table has been dropped out from under it
    let store = setup_store();
    let user = user();
    let uid = create(&store, &user, "ds1");
    store
        .with_session(|conn| {
            conn.execute_batch("DROP TABLE query_history_star")
                .map_err(from_rusqlite)
        })
        .unwrap();

    // When: The query is deleted
    let result = delete_query(&store, &user, &uid);

    // Then: The unstar failure is advisory only
    assert!(result.is_ok(), "delete should succeed: {:?}", result.err());
    assert_eq!(count(&store, "SELECT COUNT(*) FROM query_history"), 0);
}
