//! Search modal orchestration.
//!
//! [`SearchController`] owns the modal state (open flag, input text, scope,
//! filters), the debounce window, the keyboard navigator, and the history
//! stores. It never performs I/O on its own: a search is started by taking a
//! [`SearchTicket`], executed against the shared [`SearchPipeline`], and its
//! [`SearchOutcome`] handed back through [`SearchController::apply`].
//!
//! Every started search bumps a generation counter. An outcome is applied
//! only when its generation is still current and the modal is open, so a
//! slow response for an earlier query can never overwrite a newer one.
//!
//! ```text
//! handle_input ─▶ debounce ─▶ poll_debounce ─▶ SearchTicket
//!                                                  │
//!                         SearchPipeline::execute ◀┘
//!                                   │
//!                     apply(SearchOutcome) ─▶ ViewState + navigator
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::QueryCache;
use crate::clock::Clock;
use crate::error::SearchError;
use crate::group::{flatten, group_by_type};
use crate::history::{HistoryStore, RecentItemStore};
use crate::models::{
    Collection, HistoryEntry, RawEntity, RecentItem, ResultGroup, Scope, SearchQuery, SearchResult,
};
use crate::navigator::{KeyboardNavigator, NavAction, NavKey};
use crate::pipeline::SearchPipeline;
use crate::rank::RecentSet;
use crate::render::{self, RenderInput};
use crate::source::DataSource;
use crate::store::KeyValueStore;

pub const DEFAULT_DEBOUNCE_MS: i64 = 200;
/// History entries shown in the recent view.
pub const RECENT_SEARCHES_SHOWN: usize = 5;
/// Recent items shown (and navigable) in the recent view.
pub const RECENT_ITEMS_SHOWN: usize = 8;
/// Message of the error state.
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

/// Controller tuning, decoupled from application config.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub debounce_ms: i64,
    pub cache_capacity: usize,
    /// `None` keeps cache entries for the whole session.
    pub cache_ttl_ms: Option<i64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            cache_capacity: crate::cache::DEFAULT_CACHE_CAPACITY,
            cache_ttl_ms: None,
        }
    }
}

/// Content of the result pane. Exactly one state is shown at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error { message: String },
    NoResults { query: String },
    Results { query: String, groups: Vec<ResultGroup> },
    Recent,
}

/// Where an activated result should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    SameTab,
    NewTab,
}

/// Handed to the navigation collaborator when a result is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub url: String,
    pub target: OpenTarget,
    pub kind: Collection,
    pub title: String,
}

/// A started search, detached from the controller.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: SearchQuery,
    recent: RecentSet,
}

/// Result of executing a [`SearchTicket`].
#[derive(Debug)]
pub struct SearchOutcome {
    pub generation: u64,
    pub query: SearchQuery,
    pub result: Result<Arc<[SearchResult]>, SearchError>,
}

impl SearchPipeline {
    /// Run a ticket. Holds no borrow of the controller.
    pub async fn execute(&self, ticket: SearchTicket) -> SearchOutcome {
        let result = self.search(&ticket.query, &ticket.recent).await;
        SearchOutcome {
            generation: ticket.generation,
            query: ticket.query,
            result,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingInput {
    text: String,
    due_at: i64,
}

pub struct SearchController {
    pipeline: Arc<SearchPipeline>,
    history: HistoryStore,
    recent: RecentItemStore,
    clock: Arc<dyn Clock>,
    debounce_ms: i64,
    is_open: bool,
    scope: Scope,
    filters: BTreeMap<String, String>,
    input: String,
    pending: Option<PendingInput>,
    generation: u64,
    view: ViewState,
    navigator: KeyboardNavigator,
}

impl SearchController {
    /// Build a controller. History and recent items are loaded from `store`
    /// immediately; unreadable data loads as empty lists.
    pub fn new(
        source: Arc<dyn DataSource>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: ControllerOptions,
    ) -> Self {
        let cache = QueryCache::new(options.cache_capacity, options.cache_ttl_ms);
        let pipeline = Arc::new(SearchPipeline::new(source, cache, Arc::clone(&clock)));
        Self {
            pipeline,
            history: HistoryStore::load(Arc::clone(&store)),
            recent: RecentItemStore::load(store),
            clock,
            debounce_ms: options.debounce_ms,
            is_open: false,
            scope: Scope::All,
            filters: BTreeMap::new(),
            input: String::new(),
            pending: None,
            generation: 0,
            view: ViewState::Recent,
            navigator: KeyboardNavigator::new(),
        }
    }

    // ── Modal lifecycle ─────────────────────────────────────────────

    pub fn open(&mut self) {
        self.is_open = true;
        self.show_recent();
    }

    /// Hide the modal and reset it: input cleared, scope back to `all`,
    /// pending debounce dropped, in-flight searches invalidated, nothing
    /// selectable until the next [`open`](Self::open).
    pub fn close(&mut self) {
        self.is_open = false;
        self.input.clear();
        self.scope = Scope::All;
        self.pending = None;
        self.generation += 1;
        self.view = ViewState::Recent;
        self.navigator.reset();
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    // ── Input ───────────────────────────────────────────────────────

    /// New input text. Cancels any pending debounce; blank input shows the
    /// recent view, anything else schedules a search one debounce window
    /// from now. Changed text invalidates searches already in flight.
    pub fn handle_input(&mut self, text: &str) {
        if self.input != text {
            self.generation += 1;
        }
        self.input = text.to_string();
        self.pending = None;

        if text.trim().is_empty() {
            self.show_recent();
            return;
        }

        self.pending = Some(PendingInput {
            text: text.to_string(),
            due_at: self.clock.now_millis() + self.debounce_ms,
        });
    }

    /// When the pending debounced search becomes due, if any.
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    /// Start the debounced search if its window has elapsed.
    pub fn poll_debounce(&mut self) -> Option<SearchTicket> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| self.clock.now_millis() >= p.due_at);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.begin_search(&pending.text))
    }

    /// Change scope; re-runs the search at once when there is input.
    pub fn set_scope(&mut self, scope: Scope) -> Option<SearchTicket> {
        self.scope = scope;
        self.rerun()
    }

    /// Replace the filters; re-runs the search at once when there is input.
    pub fn set_filters(&mut self, filters: BTreeMap<String, String>) -> Option<SearchTicket> {
        self.filters = filters;
        self.rerun()
    }

    /// Fill the input with a past query and search immediately.
    pub fn execute_recent_search(&mut self, query: &str) -> Option<SearchTicket> {
        self.input = query.to_string();
        self.rerun()
    }

    fn rerun(&mut self) -> Option<SearchTicket> {
        self.pending = None;
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(self.begin_search(&text))
    }

    fn begin_search(&mut self, text: &str) -> SearchTicket {
        self.generation += 1;
        self.view = ViewState::Loading;
        self.navigator.reset();
        SearchTicket {
            generation: self.generation,
            query: SearchQuery::new(text, self.scope).with_filters(self.filters.clone()),
            recent: self.recent.recent_set(),
        }
    }

    // ── Results ─────────────────────────────────────────────────────

    /// The pipeline tickets are executed against.
    pub fn pipeline(&self) -> Arc<SearchPipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Install a finished search. Returns `false` when the outcome was stale
    /// (a newer search started, or the modal closed) and got discarded.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if !self.is_open || outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                open = self.is_open,
                "discarding stale search outcome"
            );
            return false;
        }

        match outcome.result {
            Ok(results) if results.is_empty() => {
                self.view = ViewState::NoResults {
                    query: outcome.query.text,
                };
                self.navigator.on_render(0, true);
            }
            Ok(results) => {
                let groups = group_by_type(&results);
                let len = flatten(&groups).len();
                self.view = ViewState::Results {
                    query: outcome.query.text,
                    groups,
                };
                self.navigator.on_render(len, true);
            }
            Err(e) => {
                tracing::error!(query = %outcome.query.text, error = %e, "search failed");
                self.view = ViewState::Error {
                    message: SEARCH_FAILED_MESSAGE.to_string(),
                };
                self.navigator.on_render(0, false);
            }
        }
        true
    }

    /// Execute and apply a ticket on the current task.
    pub async fn run_ticket(&mut self, ticket: SearchTicket) -> bool {
        let outcome = self.pipeline.execute(ticket).await;
        self.apply(outcome)
    }

    /// Run the debounced search if it is due. Returns whether one ran.
    pub async fn run_pending(&mut self) -> bool {
        match self.poll_debounce() {
            Some(ticket) => self.run_ticket(ticket).await,
            None => false,
        }
    }

    // ── Keyboard & activation ───────────────────────────────────────

    /// Feed one modal-local key. Returns an activation for the navigation
    /// collaborator when a result was opened. Keys are ignored while closed.
    pub fn handle_key(&mut self, key: NavKey) -> Option<Activation> {
        if !self.is_open {
            return None;
        }
        match self.navigator.handle(key) {
            NavAction::Activate { index, new_tab } => self.activate(index, new_tab),
            NavAction::Cancel => {
                self.close();
                None
            }
            NavAction::Moved(_) | NavAction::None => None,
        }
    }

    /// Open the rendered item at `index` (keyboard Enter or a click):
    /// records history and the recent item, then closes the modal.
    pub fn activate(&mut self, index: usize, new_tab: bool) -> Option<Activation> {
        if !self.is_open {
            return None;
        }
        let (entity, kind) = self.rendered_item(index)?;
        let now = self.clock.now_millis();
        let title = render::display_label(&entity).to_string();
        let activation = Activation {
            url: kind.item_url(&entity.id),
            target: if new_tab {
                OpenTarget::NewTab
            } else {
                OpenTarget::SameTab
            },
            kind,
            title: title.clone(),
        };

        self.history.add(HistoryEntry {
            query: self.input.clone(),
            kind,
            title,
            timestamp: now,
        });
        self.recent.add(RecentItem {
            entity,
            kind,
            timestamp: now,
        });
        tracing::info!(url = %activation.url, "search result activated");

        self.close();
        Some(activation)
    }

    fn rendered_item(&self, index: usize) -> Option<(RawEntity, Collection)> {
        match &self.view {
            ViewState::Results { groups, .. } => flatten(groups)
                .get(index)
                .map(|r| (r.entity.clone(), r.kind)),
            ViewState::Recent => self
                .recent
                .entries()
                .iter()
                .take(RECENT_ITEMS_SHOWN)
                .nth(index)
                .map(|r| (r.entity.clone(), r.kind)),
            _ => None,
        }
    }

    fn show_recent(&mut self) {
        self.view = ViewState::Recent;
        let shown = self.recent.len().min(RECENT_ITEMS_SHOWN);
        self.navigator.on_render(shown, false);
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn placeholder(&self) -> String {
        self.scope.placeholder()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn navigator(&self) -> &KeyboardNavigator {
        &self.navigator
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn recent_items(&self) -> &[RecentItem] {
        self.recent.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.recent.clear();
        if self.is_open && matches!(self.view, ViewState::Recent) {
            self.show_recent();
        }
    }

    /// Text rendering of the current result pane.
    pub fn render(&self) -> String {
        render::render(&RenderInput {
            view: &self.view,
            scope: self.scope,
            history: self.history.entries(),
            recent: self.recent.entries(),
            selected: self.navigator.selected(),
            now_millis: self.clock.now_millis(),
        })
    }
}
