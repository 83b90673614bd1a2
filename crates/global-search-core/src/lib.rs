//! # Global Search Core
//!
//! Runtime-agnostic logic of the global incremental search: data models,
//! query cache, concurrent fan-out over a data source, relevance ranking,
//! grouping, persisted history, keyboard navigation, and the controller
//! that orchestrates them.
//!
//! This crate contains no tokio, HTTP client, or filesystem I/O. The data
//! source, the key-value store, and the clock are injected through the
//! [`source::DataSource`], [`store::KeyValueStore`], and [`clock::Clock`]
//! traits.
//!
//! ## Pipeline
//!
//! ```text
//! keystroke ─▶ debounce ─▶ QueryCache ──hit──────────────┐
//!                              │ miss                     │
//!                              ▼                          ▼
//!                         SourceFanOut ─▶ rank ─▶ group ─▶ ViewState
//!                                                          │
//!                                     KeyboardNavigator ◀──┘
//!                                            │ Enter
//!                                            ▼
//!                              HistoryStore / RecentItemStore
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Scopes, collections, entities, results, history records |
//! | [`cache`] | Bounded LRU query cache with optional TTL |
//! | [`source`] | `DataSource` trait, settle-all fan-out, in-memory source |
//! | [`rank`] | Substring matching, scoring, and ordering |
//! | [`group`] | First-occurrence grouping by type |
//! | [`pipeline`] | Cache → fan-out → rank → group |
//! | [`history`] | Deduplicated, capped, persisted lists |
//! | [`store`] | Key-value persistence trait and in-memory store |
//! | [`navigator`] | Keyboard selection state machine |
//! | [`controller`] | Modal orchestration, debounce, generation tokens |
//! | [`render`] | Plain-text rendering of the result pane |
//! | [`clock`] | Injected time source |

pub mod cache;
pub mod clock;
pub mod controller;
pub mod error;
pub mod group;
pub mod history;
pub mod models;
pub mod navigator;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod source;
pub mod store;
