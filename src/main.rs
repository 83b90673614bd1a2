//! # Global Search CLI (`gsearch`)
//!
//! ## Usage
//!
//! ```bash
//! gsearch --config ./config/gsearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gsearch search "<query>"` | Search every collection once and print grouped results |
//! | `gsearch history` | Show recent searches and recently viewed items |
//! | `gsearch interactive` | Run the search modal on stdin |
//!
//! ## Examples
//!
//! ```bash
//! # Search everything
//! gsearch search "quarterly"
//!
//! # Only tasks that are still open, as JSON
//! gsearch search "report" --scope tasks --filter status=active --json
//!
//! # Forget past searches
//! gsearch history --clear
//! ```

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use global_search::{config, history, interactive, logging, search, source_http};
use global_search_core::models::Scope;

/// Global Search CLI: incremental search over the task API.
#[derive(Parser)]
#[command(
    name = "gsearch",
    about = "Global search across projects, goals, tasks, contexts, notes, and tags",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/gsearch.toml`. When the file is missing, the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/gsearch.toml")]
    config: PathBuf,

    /// Log debug output to stderr (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search once and print the grouped results.
    Search {
        /// The search query string.
        query: String,

        /// `all`, `projects`, `goals`, `tasks`, `contexts`, `tags`, or `notes`.
        #[arg(long, default_value = "all")]
        scope: Scope,

        /// Extra filters passed to the API as `key=value` pairs.
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches and recently viewed items.
    History {
        /// Forget all history and recent items.
        #[arg(long)]
        clear: bool,
    },

    /// Run the search modal on stdin.
    ///
    /// Plain lines are input text; `:down`, `:up`, `:enter`, `:new`, `:esc`,
    /// `:scope <s>`, `:recent <n>`, `:toggle`, `:clear`, and `:quit` drive
    /// the modal.
    Interactive,
}

/// Parse a `key=value` pair for `--filter` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    let key = &s[..pos];
    source_http::check_filter_key(key).map_err(|e| e.to_string())?;
    Ok((key.to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
        config::Config::minimal()
    };

    match cli.command {
        Commands::Search {
            query,
            scope,
            filters,
            json,
        } => {
            let filters: BTreeMap<String, String> = filters.into_iter().collect();
            search::run_search(&cfg, &query, scope, filters, json).await?;
        }
        Commands::History { clear } => {
            history::run_history(&cfg, clear)?;
        }
        Commands::Interactive => {
            interactive::run_interactive(&cfg).await?;
        }
    }

    Ok(())
}
