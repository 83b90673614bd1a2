//! Plain-text rendering of the result pane.
//!
//! Rendering is a pure function of the view state, the history lists, the
//! current selection, and the time (for relative timestamps). Matches of the
//! query are wrapped in `[` `]`; the selected row is prefixed with `>`.

use regex::RegexBuilder;
use std::fmt::Write;

use crate::controller::{ViewState, RECENT_ITEMS_SHOWN, RECENT_SEARCHES_SHOWN};
use crate::models::{HistoryEntry, RawEntity, RecentItem, ResultGroup, Scope};

const DESCRIPTION_LIMIT: usize = 100;
const RECENT_DESCRIPTION_LIMIT: usize = 60;
const TAGS_SHOWN: usize = 3;

pub struct RenderInput<'a> {
    pub view: &'a ViewState,
    pub scope: Scope,
    pub history: &'a [HistoryEntry],
    pub recent: &'a [RecentItem],
    pub selected: Option<usize>,
    pub now_millis: i64,
}

pub fn render(input: &RenderInput<'_>) -> String {
    match input.view {
        ViewState::Loading => "Searching...\n".to_string(),
        ViewState::Error { message } => format!("! {}\n", message),
        ViewState::NoResults { .. } => render_no_results(input.scope),
        ViewState::Results { query, groups } => render_groups(groups, query, input.selected),
        ViewState::Recent => render_recent(input),
    }
}

fn render_no_results(scope: Scope) -> String {
    let mut out = String::from("No results found\n");
    if scope == Scope::All {
        out.push_str("Try adjusting your search terms.\n");
    } else {
        out.push_str("Try adjusting your search terms or searching all categories.\n");
    }
    out
}

fn render_groups(groups: &[ResultGroup], query: &str, selected: Option<usize>) -> String {
    let mut out = String::new();
    let mut index = 0;
    for group in groups {
        let _ = writeln!(out, "{} ({})", group.kind.display_name(), group.items.len());
        for item in &group.items {
            let marker = if selected == Some(index) { ">" } else { " " };
            let _ = writeln!(
                out,
                "{} {}",
                marker,
                highlight(display_label(&item.entity), query)
            );

            let description = truncate(item.entity.body_text(), DESCRIPTION_LIMIT);
            if !description.is_empty() {
                let _ = writeln!(out, "    {}", highlight(&description, query));
            }
            let metadata = item_metadata(&item.entity);
            if !metadata.is_empty() {
                let _ = writeln!(out, "    {}", metadata);
            }
            index += 1;
        }
    }
    out
}

fn render_recent(input: &RenderInput<'_>) -> String {
    let mut out = String::new();

    if !input.history.is_empty() {
        out.push_str("Recent Searches\n");
        for entry in input.history.iter().take(RECENT_SEARCHES_SHOWN) {
            let _ = writeln!(
                out,
                "  {}  {} • {}  {}",
                entry.query,
                entry.kind,
                entry.title,
                format_relative_time(input.now_millis, entry.timestamp)
            );
        }
    }

    if !input.recent.is_empty() {
        out.push_str("Recently Viewed\n");
        for (i, item) in input.recent.iter().take(RECENT_ITEMS_SHOWN).enumerate() {
            let marker = if input.selected == Some(i) { ">" } else { " " };
            let _ = writeln!(
                out,
                "{} {} ({})",
                marker,
                display_label(&item.entity),
                item.kind
            );
            let description = truncate(
                item.entity.description.as_deref().unwrap_or(""),
                RECENT_DESCRIPTION_LIMIT,
            );
            if !description.is_empty() {
                let _ = writeln!(out, "    {}", description);
            }
        }
    }

    if out.is_empty() {
        out.push_str("Start typing to search\n");
        out.push_str("Search across all your projects, goals, tasks, and more\n");
    }
    out
}

/// The entity's label, or `Untitled` when it has neither title nor name.
pub fn display_label(entity: &RawEntity) -> &str {
    match entity.label() {
        "" => "Untitled",
        label => label,
    }
}

/// Status badge, priority, due date, and up to three tag names.
pub fn item_metadata(entity: &RawEntity) -> String {
    let mut parts = Vec::new();
    if let Some(status) = entity.status.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("[{}]", status));
    }
    if let Some(priority) = entity.priority.filter(|p| *p != 0) {
        parts.push(format!("P{}", priority));
    }
    if let Some(due) = entity.due_day() {
        parts.push(format!("Due {}", due));
    }
    let tags: Vec<&str> = entity.tag_names().take(TAGS_SHOWN).collect();
    if !tags.is_empty() {
        parts.push(tags.join(", "));
    }
    parts.join("  ")
}

/// Wrap case-insensitive occurrences of `query` in `[` `]`.
pub fn highlight(text: &str, query: &str) -> String {
    if query.is_empty() || text.is_empty() {
        return text.to_string();
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, "[$0]").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// First `limit` characters, with `...` appended when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// `Just now`, `{m}m ago`, `{h}h ago`, or `{d}d ago`.
pub fn format_relative_time(now_millis: i64, timestamp: i64) -> String {
    const MINUTE: i64 = 60 * 1000;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    let diff = now_millis - timestamp;
    if diff < MINUTE {
        "Just now".to_string()
    } else if diff < HOUR {
        format!("{}m ago", diff / MINUTE)
    } else if diff < DAY {
        format!("{}h ago", diff / HOUR)
    } else {
        format!("{}d ago", diff / DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collection, SearchResult, TagRef};

    #[test]
    fn test_highlight_is_case_insensitive_and_escaped() {
        assert_eq!(highlight("Project Alpha", "alpha"), "Project [Alpha]");
        assert_eq!(highlight("a.b axb", "a.b"), "[a.b] axb");
        assert_eq!(highlight("text", ""), "text");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_relative_time() {
        let now = 10 * 24 * 60 * 60 * 1000;
        assert_eq!(format_relative_time(now, now - 5_000), "Just now");
        assert_eq!(format_relative_time(now, now - 5 * 60_000), "5m ago");
        assert_eq!(format_relative_time(now, now - 3 * 3_600_000), "3h ago");
        assert_eq!(format_relative_time(now, now - 2 * 86_400_000), "2d ago");
    }

    #[test]
    fn test_metadata() {
        let mut e = RawEntity::titled(1, "x");
        e.status = Some("active".to_string());
        e.priority = Some(2);
        e.due_date = Some("2024-06-01".to_string());
        e.tags = vec![
            TagRef::Plain("a".to_string()),
            TagRef::Plain("b".to_string()),
            TagRef::Plain("c".to_string()),
            TagRef::Plain("d".to_string()),
        ];
        assert_eq!(item_metadata(&e), "[active]  P2  Due 2024-06-01  a, b, c");

        e.priority = Some(0);
        e.status = None;
        e.due_date = None;
        e.tags.clear();
        assert_eq!(item_metadata(&e), "");
    }

    #[test]
    fn test_render_results_marks_selection() {
        let groups = vec![ResultGroup {
            kind: Collection::Projects,
            items: vec![
                SearchResult {
                    entity: RawEntity::titled(1, "Project Alpha"),
                    kind: Collection::Projects,
                    relevance_score: 50,
                },
                SearchResult {
                    entity: RawEntity::titled(2, "Project Beta"),
                    kind: Collection::Projects,
                    relevance_score: 50,
                },
            ],
        }];
        let view = ViewState::Results {
            query: "beta".to_string(),
            groups,
        };
        let out = render(&RenderInput {
            view: &view,
            scope: Scope::All,
            history: &[],
            recent: &[],
            selected: Some(1),
            now_millis: 0,
        });
        assert_eq!(
            out,
            "Projects (2)\n  Project Alpha\n> Project [Beta]\n"
        );
    }

    #[test]
    fn test_render_empty_recent_state() {
        let out = render(&RenderInput {
            view: &ViewState::Recent,
            scope: Scope::All,
            history: &[],
            recent: &[],
            selected: None,
            now_millis: 0,
        });
        assert!(out.starts_with("Start typing to search"));
    }

    #[test]
    fn test_render_recent_sections() {
        let history = vec![HistoryEntry {
            query: "alpha".to_string(),
            kind: Collection::Projects,
            title: "Project Alpha".to_string(),
            timestamp: 0,
        }];
        let recent = vec![RecentItem {
            entity: RawEntity::titled(1, "Project Alpha"),
            kind: Collection::Projects,
            timestamp: 0,
        }];
        let out = render(&RenderInput {
            view: &ViewState::Recent,
            scope: Scope::All,
            history: &history,
            recent: &recent,
            selected: None,
            now_millis: 120_000,
        });
        assert!(out.contains("Recent Searches\n  alpha  projects • Project Alpha  2m ago\n"));
        assert!(out.contains("Recently Viewed\n  Project Alpha (projects)\n"));
    }

    #[test]
    fn test_render_recent_untitled_item() {
        let mut entity = RawEntity::titled(7, "");
        entity.title = None;
        let recent = vec![RecentItem {
            entity,
            kind: Collection::Notes,
            timestamp: 0,
        }];
        let out = render(&RenderInput {
            view: &ViewState::Recent,
            scope: Scope::All,
            history: &[],
            recent: &recent,
            selected: Some(0),
            now_millis: 0,
        });
        assert!(out.contains("Recently Viewed\n> Untitled (notes)\n"));
    }

    #[test]
    fn test_no_results_suggests_all_scope() {
        let view = ViewState::NoResults {
            query: "x".to_string(),
        };
        let input = RenderInput {
            view: &view,
            scope: Scope::Tasks,
            history: &[],
            recent: &[],
            selected: None,
            now_millis: 0,
        };
        assert!(render(&input).contains("searching all categories"));
    }
}
