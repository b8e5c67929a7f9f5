//! Suggestion list state machine.
//!
//! `Closed` / `Open` with a highlighted row. The list is visible only while it
//! holds at least one suggestion, and the highlight always points at an
//! existing row (or nowhere).

use serde::Serialize;
use tracing::debug;

use lookup_types::Member;

/// Keyboard keys the list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// Visibility of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    Closed,
    Open,
}

/// Outcome of pressing Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterAction {
    /// A row was highlighted and is now selected.
    Select(Member),
    /// Nothing highlighted; the submitted text must be resolved exactly.
    Resolve,
}

/// Current suggestions plus visibility and highlight.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    suggestions: Vec<Member>,
    visible: bool,
    highlighted: Option<usize>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ListState {
        if self.visible {
            ListState::Open
        } else {
            ListState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn suggestions(&self) -> &[Member] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_member(&self) -> Option<&Member> {
        self.highlighted.and_then(|i| self.suggestions.get(i))
    }

    /// Replace the suggestions with a committed fetch result.
    pub fn commit(&mut self, suggestions: Vec<Member>) {
        self.suggestions = suggestions;
        self.visible = !self.suggestions.is_empty();
        self.highlighted = None;
        debug!(
            count = self.suggestions.len(),
            open = self.visible,
            "Suggestions committed"
        );
    }

    /// Drop all suggestions and close.
    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.visible = false;
        self.highlighted = None;
    }

    /// Hide without forgetting the suggestions.
    pub fn close(&mut self) {
        self.visible = false;
        self.highlighted = None;
    }

    pub fn arrow_down(&mut self) {
        if !self.visible {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    pub fn arrow_up(&mut self) {
        if !self.visible {
            return;
        }
        self.highlighted = match self.highlighted {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    pub fn escape(&mut self) {
        self.close();
    }

    /// Enter selects the highlighted row, or asks for exact resolution.
    pub fn enter(&mut self) -> EnterAction {
        match self.highlighted_member().cloned() {
            Some(member) => {
                self.close();
                EnterAction::Select(member)
            }
            None => EnterAction::Resolve,
        }
    }

    /// Pointer activation of a visible row; same as Enter on that row.
    pub fn activate(&mut self, index: usize) -> Option<Member> {
        if !self.visible {
            return None;
        }
        let member = self.suggestions.get(index).cloned()?;
        self.close();
        Some(member)
    }

    /// Apply a key; returns the Enter outcome for `Key::Enter`.
    pub fn handle_key(&mut self, key: Key) -> Option<EnterAction> {
        match key {
            Key::ArrowDown => self.arrow_down(),
            Key::ArrowUp => self.arrow_up(),
            Key::Escape => self.escape(),
            Key::Enter => return Some(self.enter()),
        }
        None
    }

    /// Highlight as a signed index, -1 meaning none.
    pub fn highlighted_index(&self) -> isize {
        self.highlighted.map(|i| i as isize).unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Member> {
        vec![
            Member::new(1, "Alpha", "Ann", "a.pdf"),
            Member::new(2, "Bravo", "Ben", "b.pdf"),
            Member::new(3, "Charlie", "Cat", "c.pdf"),
        ]
    }

    fn open_list() -> SuggestionList {
        let mut list = SuggestionList::new();
        list.commit(abc());
        list
    }

    #[test]
    fn test_commit_non_empty_opens() {
        let list = open_list();
        assert_eq!(list.state(), ListState::Open);
        assert_eq!(list.highlighted(), None);
        assert_eq!(list.highlighted_index(), -1);
    }

    #[test]
    fn test_commit_empty_closes() {
        let mut list = open_list();
        list.arrow_down();
        list.commit(Vec::new());
        assert_eq!(list.state(), ListState::Closed);
        assert!(list.suggestions().is_empty());
        assert_eq!(list.highlighted(), None);
    }

    #[test]
    fn test_arrow_down_clamps_at_last() {
        let mut list = open_list();
        for _ in 0..10 {
            list.arrow_down();
        }
        assert_eq!(list.highlighted(), Some(2));
    }

    #[test]
    fn test_arrow_up_stops_at_none() {
        let mut list = open_list();
        list.arrow_down();
        list.arrow_down();
        list.arrow_up();
        assert_eq!(list.highlighted(), Some(0));
        list.arrow_up();
        assert_eq!(list.highlighted(), None);
        list.arrow_up();
        assert_eq!(list.highlighted_index(), -1);
    }

    #[test]
    fn test_arrows_ignored_when_closed() {
        let mut list = SuggestionList::new();
        list.arrow_down();
        assert_eq!(list.highlighted(), None);

        let mut list = open_list();
        list.escape();
        list.arrow_down();
        assert_eq!(list.highlighted(), None);
    }

    #[test]
    fn test_down_twice_then_enter_selects_second() {
        let mut list = open_list();
        list.handle_key(Key::ArrowDown);
        list.handle_key(Key::ArrowDown);
        let action = list.handle_key(Key::Enter).unwrap();

        match action {
            EnterAction::Select(member) => assert_eq!(member.id, 2),
            other => panic!("Expected selection, got {other:?}"),
        }
        assert_eq!(list.state(), ListState::Closed);
        assert_eq!(list.highlighted(), None);
    }

    #[test]
    fn test_enter_without_highlight_resolves() {
        let mut list = open_list();
        assert_eq!(list.enter(), EnterAction::Resolve);
        assert_eq!(SuggestionList::new().enter(), EnterAction::Resolve);
    }

    #[test]
    fn test_escape_hides_but_keeps_suggestions() {
        let mut list = open_list();
        list.arrow_down();
        list.handle_key(Key::Escape);
        assert_eq!(list.state(), ListState::Closed);
        assert_eq!(list.highlighted(), None);
        assert_eq!(list.suggestions().len(), 3);
    }

    #[test]
    fn test_activate_row() {
        let mut list = open_list();
        let member = list.activate(2).unwrap();
        assert_eq!(member.id, 3);
        assert_eq!(list.state(), ListState::Closed);
    }

    #[test]
    fn test_activate_out_of_range_or_hidden() {
        let mut list = open_list();
        assert!(list.activate(7).is_none());
        assert_eq!(list.state(), ListState::Open);

        list.escape();
        assert!(list.activate(0).is_none());
    }

    #[test]
    fn test_highlight_reset_on_shrink() {
        let mut list = open_list();
        list.arrow_down();
        list.arrow_down();
        list.arrow_down();
        list.commit(abc().into_iter().take(1).collect());
        assert_eq!(list.highlighted(), None);
        list.arrow_down();
        list.arrow_down();
        assert_eq!(list.highlighted(), Some(0));
    }

    #[test]
    fn test_visible_implies_non_empty() {
        let mut list = SuggestionList::new();
        let ops: [&dyn Fn(&mut SuggestionList); 6] = [
            &|l: &mut SuggestionList| l.commit(abc()),
            &|l: &mut SuggestionList| l.arrow_down(),
            &|l: &mut SuggestionList| l.commit(Vec::new()),
            &|l: &mut SuggestionList| l.clear(),
            &|l: &mut SuggestionList| l.escape(),
            &|l: &mut SuggestionList| {
                l.enter();
            },
        ];
        for op in ops.iter().cycle().take(30) {
            op(&mut list);
            assert!(!list.is_open() || !list.suggestions().is_empty());
            if let Some(i) = list.highlighted() {
                assert!(i < list.suggestions().len());
            }
        }
    }
}
