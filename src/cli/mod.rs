//! Command-line front-end.
//!
//! The CLI is a thin boundary layer over `IssueApi`: it resolves the
//! database path, derives the per-request session from the environment
//! (identity verification itself happens outside this process), converts
//! wire strings into native values, and prints results as JSON on stdout.

use crate::api::IssueApi;
use crate::auth::Session;
use crate::config::Config;
use crate::error::Result;
use crate::model::{IssueFilter, IssueInput, IssuePatch, Status};
use crate::storage::IssueStore;
use crate::util::time::parse_timestamp;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable carrying the verified user email.
pub const USER_EMAIL_ENV: &str = "TRACKD_USER_EMAIL";
/// Environment variable carrying the verified user display name.
pub const USER_NAME_ENV: &str = "TRACKD_USER_NAME";
/// Environment variable carrying the verified user given name.
pub const USER_GIVEN_NAME_ENV: &str = "TRACKD_USER_GIVEN_NAME";

#[derive(Parser)]
#[command(name = "trackd", version, about = "Issue-tracking backend core")]
pub struct Cli {
    /// Database file path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new issue (requires a signed-in session)
    Add(AddArgs),
    /// Show one active issue
    Get { id: i64 },
    /// Patch fields of an active issue (requires a signed-in session)
    Update(UpdateArgs),
    /// Soft-delete an issue (requires a signed-in session)
    Delete { id: i64 },
    /// Restore a soft-deleted issue (requires a signed-in session)
    Restore { id: i64 },
    /// List one page of filtered issues
    List(ListArgs),
    /// Full-text search over title and description
    Search { query: String },
    /// Per-owner status counts
    Counts(FilterArgs),
    /// Wipe and repopulate the active set with generated issues
    Seed {
        #[arg(default_value_t = 115)]
        count: i64,
    },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    /// Explicit id; assigned from the sequence when omitted
    #[arg(long)]
    pub id: Option<i64>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub effort: Option<i64>,
    /// Due date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, conflicts_with = "clear_owner")]
    pub owner: Option<String>,
    /// Unset the owner
    #[arg(long)]
    pub clear_owner: bool,
    #[arg(long)]
    pub effort: Option<i64>,
    /// Due date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Page number; values below 1 are treated as page 1
    #[arg(long)]
    pub page: Option<i64>,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub effort_min: Option<i64>,
    #[arg(long)]
    pub effort_max: Option<i64>,
}

impl FilterArgs {
    fn into_filter(self) -> Result<IssueFilter> {
        let status = self
            .status
            .as_deref()
            .map(Status::from_str)
            .transpose()?;
        Ok(IssueFilter {
            status,
            effort_min: self.effort_min,
            effort_max: self.effort_max,
        })
    }
}

/// Derive the per-request session from the environment.
///
/// The server deployment derives this from a verified identity token; the
/// CLI trusts the variables its caller set, which is the same contract one
/// layer down.
#[must_use]
pub fn session_from_env() -> Session {
    match std::env::var(USER_EMAIL_ENV) {
        Ok(email) if !email.is_empty() => {
            let name = std::env::var(USER_NAME_ENV).unwrap_or_else(|_| email.clone());
            let given_name = std::env::var(USER_GIVEN_NAME_ENV).unwrap_or_else(|_| name.clone());
            Session::signed_in(given_name, name, email)
        }
        _ => Session::anonymous(),
    }
}

/// Execute one parsed command against the store.
///
/// # Errors
///
/// Propagates any core error; the caller maps it to an exit code.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db);
    let mut store = IssueStore::open(&config.db_path)?;
    let api = IssueApi::new();
    let session = session_from_env();

    match cli.command {
        Commands::Add(args) => {
            let input = IssueInput {
                id: args.id,
                title: args.title,
                status: args.status.as_deref().map(Status::from_str).transpose()?,
                owner: args.owner,
                effort: args.effort,
                created: None,
                due: args
                    .due
                    .as_deref()
                    .map(|s| parse_timestamp(s, "due"))
                    .transpose()?,
                description: args.description,
            };
            print_json(&api.add(&mut store, &session, input)?)
        }
        Commands::Get { id } => print_json(&api.get(&store, id)?),
        Commands::Update(args) => {
            let owner = if args.clear_owner {
                Some(None)
            } else {
                args.owner.map(Some)
            };
            let patch = IssuePatch {
                title: args.title,
                status: args.status.as_deref().map(Status::from_str).transpose()?,
                owner,
                effort: args.effort,
                due: args
                    .due
                    .as_deref()
                    .map(|s| parse_timestamp(s, "due"))
                    .transpose()?,
                description: args.description,
            };
            print_json(&api.update(&mut store, &session, args.id, patch)?)
        }
        Commands::Delete { id } => {
            let removed = api.remove(&mut store, &session, id)?;
            print_json(&serde_json::json!({ "deleted": removed }))
        }
        Commands::Restore { id } => print_json(&api.restore(&mut store, &session, id)?),
        Commands::List(args) => {
            let filter = args.filter.into_filter()?;
            print_json(&api.list(&store, &filter, args.page)?)
        }
        Commands::Search { query } => print_json(&api.search(&store, &query)?),
        Commands::Counts(args) => {
            let filter = args.into_filter()?;
            print_json(&api.counts(&store, &filter)?)
        }
        Commands::Seed { count } => {
            let seeded = store.seed(count)?;
            print_json(&serde_json::json!({ "seeded": seeded }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
