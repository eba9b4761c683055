//! Query history domain model

pub mod query_history;
pub mod search;
pub mod user;

pub use query_history::{
    CreateQueryCommand, PatchQueryCommentCommand, QueryHistory, QueryHistoryDto, QueryHistoryStar,
};
pub use search::{SearchFilter, Sort, DEFAULT_SEARCH_LIMIT};
pub use user::SignedInUser;
