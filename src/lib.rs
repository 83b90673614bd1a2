//! # Global Search
//!
//! Incremental search across projects, goals, tasks, contexts, notes, and
//! tags served by a REST API.
//!
//! The search logic (caching, fan-out, ranking, grouping, history, keyboard
//! navigation) lives in the `global-search-core` crate. This crate supplies
//! the I/O around it: the HTTP data source, the on-disk state file, config
//! loading, logging, and the `gsearch` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ gsearch CLI│──▶│ SearchController │──▶│ HttpDataSource│──▶ /api/v1/{collection}
//! │ / modal    │   │  (core crate)    │   └──────────────┘
//! └────────────┘   └────────┬─────────┘
//!                           ▼
//!                  ┌──────────────────┐
//!                  │ FileKeyValueStore│  history + recent items
//!                  └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`source_http`] | REST data source |
//! | [`store_file`] | JSON state file |
//! | [`session`] | Config → controller wiring |
//! | [`search`] | One-shot search command |
//! | [`history`] | History command |
//! | [`interactive`] | Line-driven search modal |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod history;
pub mod interactive;
pub mod logging;
pub mod search;
pub mod session;
pub mod source_http;
pub mod store_file;
