//! Query history subcommands

use super::{print_json, CliResult};
use clap::{Args, Subcommand};
use dashq_core::errors::{ExError, ExErrorKind};
use dashq_core::model::{
    CreateQueryCommand, PatchQueryCommentCommand, SearchFilter, SignedInUser, Sort,
};
use dashq_engine::{
    create_query, delete_query, patch_query_comment, search_queries, star_query, unstar_query,
};
use dashq_store::SqlStore;
use serde_json::Value;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Organization of the acting user
    #[arg(long, global = true, default_value_t = 1)]
    pub org: i64,

    /// Acting user id
    #[arg(long, global = true, default_value_t = 1)]
    pub user: i64,

    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// Record a query
    Create(CreateArgs),
    /// Search the user's history
    Search(SearchArgs),
    /// Delete a query and its star
    Delete(UidArgs),
    /// Replace a query's comment
    Comment(CommentArgs),
    /// Star a query
    Star(UidArgs),
    /// Remove the star from a query
    Unstar(UidArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub datasource: String,

    /// JSON array of query objects
    #[arg(long)]
    pub queries: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Datasource uid to include; repeat for several
    #[arg(long = "datasource")]
    pub datasources: Vec<String>,

    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub only_starred: bool,

    /// time-asc or time-desc
    #[arg(long, default_value = "time-desc")]
    pub sort: String,

    #[arg(long, default_value_t = 1)]
    pub page: i64,

    /// Rows per page; 0 uses the configured default
    #[arg(long, default_value_t = 0)]
    pub limit: i64,
}

#[derive(Debug, Args)]
pub struct UidArgs {
    pub uid: String,
}

#[derive(Debug, Args)]
pub struct CommentArgs {
    pub uid: String,

    #[arg(long)]
    pub comment: String,
}

pub fn execute(store: &SqlStore, args: HistoryArgs) -> CliResult {
    let user = SignedInUser::new(args.org, args.user);

    match args.command {
        HistoryCommand::Create(create) => {
            let queries = parse_queries(&create.queries)?;
            let dto = create_query(
                store,
                &user,
                CreateQueryCommand {
                    datasource_uid: create.datasource,
                    queries,
                },
            )?;
            print_json(&dto)
        }
        HistoryCommand::Search(search) => {
            let filter = SearchFilter::for_datasources(search.datasources)
                .with_search_string(search.search)
                .with_only_starred(search.only_starred)
                .with_sort(Sort::from(search.sort))
                .with_page(search.page, search.limit);
            print_json(&search_queries(store, &user, filter)?)
        }
        HistoryCommand::Delete(target) => {
            let id = delete_query(store, &user, &target.uid)?;
            print_json(&serde_json::json!({ "id": id, "message": "Query deleted" }))
        }
        HistoryCommand::Comment(comment) => {
            let dto = patch_query_comment(
                store,
                &user,
                &comment.uid,
                PatchQueryCommentCommand {
                    comment: comment.comment,
                },
            )?;
            print_json(&dto)
        }
        HistoryCommand::Star(target) => print_json(&star_query(store, &user, &target.uid)?),
        HistoryCommand::Unstar(target) => print_json(&unstar_query(store, &user, &target.uid)?),
    }
}

fn parse_queries(text: &str) -> Result<Vec<Value>, ExError> {
    serde_json::from_str(text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidArgument)
            .with_op("parse_queries")
            .with_message(format!("--queries must be a JSON array: {}", e))
    })
}
