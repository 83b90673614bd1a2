//! Keyboard selection over the rendered result list.
//!
//! A pure state machine: [`transition`] maps `(state, rendered count, key)`
//! to the next state and an action for the controller. The UI layer only
//! translates raw key events into [`NavKey`]s.
//!
//! ```text
//!   no-selection ──render(N>0, auto)──▶ index 0
//!   index i ──Down──▶ index min(i+1, N-1)
//!   index i ──Up────▶ index max(i-1, 0)
//!   index i ──Enter─▶ Activate(i)
//!   any     ──Esc───▶ no-selection + Cancel
//! ```

/// Current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    NoSelection,
    Selected(usize),
}

impl NavState {
    pub fn index(&self) -> Option<usize> {
        match self {
            NavState::NoSelection => None,
            NavState::Selected(i) => Some(*i),
        }
    }
}

/// Modal-local key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    /// `new_tab` is set when the platform accelerator modifier is held.
    Enter { new_tab: bool },
    Escape,
}

/// What the controller should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    None,
    Moved(usize),
    Activate { index: usize, new_tab: bool },
    Cancel,
}

pub fn transition(state: NavState, len: usize, key: NavKey) -> (NavState, NavAction) {
    match key {
        NavKey::Escape => (NavState::NoSelection, NavAction::Cancel),
        _ if len == 0 => (state, NavAction::None),
        NavKey::ArrowDown => {
            let next = match state {
                NavState::NoSelection => 0,
                NavState::Selected(i) => (i + 1).min(len - 1),
            };
            (NavState::Selected(next), NavAction::Moved(next))
        }
        NavKey::ArrowUp => {
            let next = match state {
                NavState::NoSelection => 0,
                NavState::Selected(i) => i.saturating_sub(1).min(len - 1),
            };
            (NavState::Selected(next), NavAction::Moved(next))
        }
        NavKey::Enter { new_tab } => match state {
            NavState::Selected(index) if index < len => {
                (state, NavAction::Activate { index, new_tab })
            }
            _ => (state, NavAction::None),
        },
    }
}

/// [`transition`] bound to the current rendered list length.
#[derive(Debug, Clone, Default)]
pub struct KeyboardNavigator {
    state: NavState,
    len: usize,
}

impl KeyboardNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new list of `len` items was rendered. With `auto_select`, the
    /// first item is selected when there is one.
    pub fn on_render(&mut self, len: usize, auto_select: bool) {
        self.len = len;
        self.state = if auto_select && len > 0 {
            NavState::Selected(0)
        } else {
            NavState::NoSelection
        };
    }

    pub fn reset(&mut self) {
        self.on_render(0, false);
    }

    pub fn handle(&mut self, key: NavKey) -> NavAction {
        let (state, action) = transition(self.state, self.len, key);
        self.state = state;
        action
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.index()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
