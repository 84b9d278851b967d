use super::{HomeTab, QueryTab, Tab, TabKey};

pub const HOME_TAB_LABEL: &str = "Home";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EditorLayout {
    #[default]
    DockBottom,
    DockRight,
}

impl EditorLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DockBottom => "dock_bottom",
            Self::DockRight => "dock_right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dock_bottom" => Some(Self::DockBottom),
            "dock_right" => Some(Self::DockRight),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::DockBottom => Self::DockRight,
            Self::DockRight => Self::DockBottom,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionError {
    TabNotFound(TabKey),
    IndexOutOfRange { index: usize, len: usize },
    NotAQueryTab(TabKey),
    LastTab,
    CountersExhausted,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::TabNotFound(key) => write!(f, "tab not found: {key}"),
            SessionError::IndexOutOfRange { index, len } => {
                write!(f, "tab index {index} out of range for {len} tabs")
            }
            SessionError::NotAQueryTab(key) => write!(f, "tab is not a query tab: {key}"),
            SessionError::LastTab => write!(f, "cannot close the last open tab"),
            SessionError::CountersExhausted => write!(f, "no tab keys or numbers left"),
        }
    }
}

impl std::error::Error for SessionError {}

pub fn default_query_label(tab_number: u64) -> String {
    format!("Untitled {tab_number}")
}

pub fn default_query_text(tab_number: u64) -> String {
    format!("input mock | set @index = {tab_number}")
}

/// Open tabs plus selection and layout. `tabs` is never empty.
#[derive(Clone, Debug)]
pub struct Session {
    tabs: Vec<Tab>,
    selected_index: usize,
    last_tab_number: u64,
    next_tab_key: u64,
    layout: EditorLayout,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            tabs: vec![Tab::Home(HomeTab {
                key: TabKey(1),
                label: HOME_TAB_LABEL.to_owned(),
            })],
            selected_index: 0,
            last_tab_number: 1,
            next_tab_key: 2,
            layout: EditorLayout::default(),
        }
    }

    /// Rebuilds a session from parts, repairing anything that would break the invariants.
    pub(crate) fn from_parts(
        tabs: Vec<Tab>,
        selected_index: usize,
        last_tab_number: u64,
        next_tab_key: u64,
        layout: EditorLayout,
    ) -> Self {
        if tabs.is_empty() {
            let mut session = Self::new();
            session.layout = layout;
            session.last_tab_number = session.last_tab_number.max(last_tab_number);
            session.next_tab_key = session.next_tab_key.max(next_tab_key);
            return session;
        }

        let max_key = tabs.iter().map(|tab| tab.key().0).max().unwrap_or(0);
        let selected_index = selected_index.min(tabs.len() - 1);
        Self {
            tabs,
            selected_index,
            last_tab_number,
            next_tab_key: next_tab_key.max(max_key.saturating_add(1)),
            layout,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_tab(&self) -> &Tab {
        &self.tabs[self.selected_index]
    }

    pub fn last_tab_number(&self) -> u64 {
        self.last_tab_number
    }

    pub(crate) fn next_tab_key(&self) -> u64 {
        self.next_tab_key
    }

    pub fn layout(&self) -> EditorLayout {
        self.layout
    }

    pub fn tab(&self, key: TabKey) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.key() == key)
    }

    pub fn query_tab(&self, key: TabKey) -> Option<&QueryTab> {
        self.tab(key).and_then(Tab::as_query)
    }

    pub fn index_of(&self, key: TabKey) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.key() == key)
    }

    pub fn home_tab_index(&self) -> Option<usize> {
        self.tabs.iter().position(|tab| matches!(tab, Tab::Home(_)))
    }

    pub(crate) fn query_tab_mut(&mut self, key: TabKey) -> Option<&mut QueryTab> {
        self.tabs
            .iter_mut()
            .find(|tab| tab.key() == key)
            .and_then(Tab::as_query_mut)
    }

    fn allocate_tab_key(&mut self) -> Result<TabKey, SessionError> {
        let next = self
            .next_tab_key
            .checked_add(1)
            .ok_or(SessionError::CountersExhausted)?;
        let key = TabKey(self.next_tab_key);
        self.next_tab_key = next;
        Ok(key)
    }

    pub fn open_query_tab(&mut self) -> Result<TabKey, SessionError> {
        let tab_number = self
            .last_tab_number
            .checked_add(1)
            .ok_or(SessionError::CountersExhausted)?;
        let key = self.allocate_tab_key()?;
        self.tabs.push(Tab::Query(QueryTab::new(
            key,
            default_query_label(tab_number),
            default_query_text(tab_number),
        )));
        self.last_tab_number = tab_number;
        Ok(key)
    }

    pub fn open_home_tab(&mut self) -> Result<TabKey, SessionError> {
        let key = self.allocate_tab_key()?;
        self.tabs.push(Tab::Home(HomeTab {
            key,
            label: HOME_TAB_LABEL.to_owned(),
        }));
        self.selected_index = self.tabs.len() - 1;
        Ok(key)
    }

    pub fn close_tab(&mut self, key: TabKey) -> Result<(), SessionError> {
        let index = self.index_of(key).ok_or(SessionError::TabNotFound(key))?;
        if self.tabs.len() == 1 {
            return Err(SessionError::LastTab);
        }
        self.tabs.remove(index);
        if self.selected_index >= self.tabs.len() {
            self.selected_index = self.tabs.len() - 1;
        }
        Ok(())
    }

    pub fn select_tab(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.tabs.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        self.selected_index = index;
        Ok(())
    }

    pub fn update_label(&mut self, key: TabKey, label: String) -> Result<(), SessionError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|tab| tab.key() == key)
            .ok_or(SessionError::TabNotFound(key))?;
        tab.set_label(label);
        Ok(())
    }

    pub fn update_query_text(&mut self, key: TabKey, text: String) -> Result<(), SessionError> {
        match self.tabs.iter_mut().find(|tab| tab.key() == key) {
            None => Err(SessionError::TabNotFound(key)),
            Some(Tab::Home(_)) => Err(SessionError::NotAQueryTab(key)),
            Some(Tab::Query(tab)) => {
                tab.set_query(text);
                Ok(())
            }
        }
    }

    pub fn set_running(&mut self, key: TabKey, is_running: bool) -> Result<(), SessionError> {
        match self.tabs.iter_mut().find(|tab| tab.key() == key) {
            None => Err(SessionError::TabNotFound(key)),
            Some(Tab::Home(_)) => Err(SessionError::NotAQueryTab(key)),
            Some(Tab::Query(tab)) => {
                tab.is_running = is_running;
                Ok(())
            }
        }
    }

    pub fn mark_tab_seen(&mut self, key: TabKey) -> Result<(), SessionError> {
        match self.tabs.iter_mut().find(|tab| tab.key() == key) {
            None => Err(SessionError::TabNotFound(key)),
            Some(Tab::Home(_)) => Err(SessionError::NotAQueryTab(key)),
            Some(Tab::Query(tab)) => {
                tab.is_fresh = false;
                Ok(())
            }
        }
    }

    pub fn toggle_layout(&mut self) {
        self.layout = self.layout.toggled();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TabKind;

    fn session_with_two_query_tabs() -> (Session, TabKey, TabKey) {
        let mut session = Session::new();
        let a = session.open_query_tab().unwrap();
        let b = session.open_query_tab().unwrap();
        (session, a, b)
    }

    fn assert_selection_invariant(session: &Session) {
        assert!(!session.tabs().is_empty());
        assert!(session.selected_index() < session.tabs().len());
    }

    #[test]
    fn opening_query_tabs_appends_without_selecting() {
        let mut session = Session::new();
        assert_eq!(session.selected_tab().kind(), TabKind::Home);

        for _ in 0..3 {
            session.open_query_tab().unwrap();
        }

        assert_eq!(session.tabs().len(), 4);
        assert_eq!(session.selected_index(), 0);
        assert_eq!(session.last_tab_number(), 4);
        let labels: Vec<&str> = session.tabs()[1..].iter().map(Tab::label).collect();
        assert_eq!(labels, vec!["Untitled 2", "Untitled 3", "Untitled 4"]);

        let tab = session.tabs()[3].as_query().unwrap();
        assert_eq!(tab.query(), "input mock | set @index = 4");
        assert!(tab.is_fresh());
        assert!(!tab.is_running());
    }

    #[test]
    fn closing_selected_last_tab_clamps_selection() {
        let (mut session, a, b) = session_with_two_query_tabs();
        session.select_tab(2).unwrap();

        session.close_tab(b).unwrap();

        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.tabs()[1].key(), a);
        assert_eq!(session.selected_index(), 1);
        assert_selection_invariant(&session);
    }

    #[test]
    fn closing_unknown_tab_is_rejected_without_change() {
        let (mut session, _, _) = session_with_two_query_tabs();
        let missing = TabKey::from_u64(999);
        assert_eq!(session.close_tab(missing), Err(SessionError::TabNotFound(missing)));
        assert_eq!(session.tabs().len(), 3);
    }

    #[test]
    fn last_tab_cannot_be_closed() {
        let mut session = Session::new();
        let home = session.tabs()[0].key();
        assert_eq!(session.close_tab(home), Err(SessionError::LastTab));
        assert_eq!(session.tabs().len(), 1);
        assert_selection_invariant(&session);
    }

    #[test]
    fn select_out_of_range_keeps_selection() {
        let (mut session, _, _) = session_with_two_query_tabs();
        session.select_tab(1).unwrap();
        assert_eq!(
            session.select_tab(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(session.selected_index(), 1);
    }

    #[test]
    fn last_tab_number_survives_closures() {
        let (mut session, a, b) = session_with_two_query_tabs();
        session.close_tab(a).unwrap();
        session.close_tab(b).unwrap();
        let c = session.open_query_tab().unwrap();
        assert_eq!(session.tab(c).unwrap().label(), "Untitled 4");
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn query_text_updates_reject_home_tabs() {
        let (mut session, a, _) = session_with_two_query_tabs();
        let home = session.tabs()[0].key();

        assert_eq!(
            session.update_query_text(home, "input x".to_owned()),
            Err(SessionError::NotAQueryTab(home))
        );
        session.update_query_text(a, "input x".to_owned()).unwrap();
        assert_eq!(session.query_tab(a).unwrap().query(), "input x");

        session.update_label(home, "Start".to_owned()).unwrap();
        assert_eq!(session.tabs()[0].label(), "Start");
    }

    #[test]
    fn set_running_only_applies_to_query_tabs() {
        let (mut session, a, _) = session_with_two_query_tabs();
        let home = session.tabs()[0].key();
        assert!(session.set_running(home, true).is_err());
        session.set_running(a, true).unwrap();
        assert!(session.query_tab(a).unwrap().is_running());
    }

    #[test]
    fn mark_tab_seen_clears_fresh_flag() {
        let (mut session, a, _) = session_with_two_query_tabs();
        session.mark_tab_seen(a).unwrap();
        assert!(!session.query_tab(a).unwrap().is_fresh());
    }

    #[test]
    fn open_home_tab_selects_it() {
        let (mut session, _, _) = session_with_two_query_tabs();
        let key = session.open_home_tab().unwrap();
        assert_eq!(session.selected_index(), 3);
        assert_eq!(session.selected_tab().key(), key);
    }

    #[test]
    fn from_parts_repairs_invalid_state() {
        let empty = Session::from_parts(Vec::new(), 5, 7, 3, EditorLayout::DockRight);
        assert_eq!(empty.tabs().len(), 1);
        assert_eq!(empty.last_tab_number(), 7);
        assert_eq!(empty.layout(), EditorLayout::DockRight);

        let mut original = Session::new();
        original.open_query_tab().unwrap();
        let repaired = Session::from_parts(
            original.tabs().to_vec(),
            10,
            original.last_tab_number(),
            0,
            EditorLayout::DockBottom,
        );
        assert_eq!(repaired.selected_index(), 1);
        assert!(repaired.next_tab_key() > repaired.tabs()[1].key().as_u64());
    }

    #[test]
    fn exhausted_counters_reject_new_tabs() {
        let home = Tab::Home(HomeTab {
            key: TabKey(7),
            label: HOME_TAB_LABEL.to_owned(),
        });
        let mut session =
            Session::from_parts(vec![home.clone()], 0, 1, u64::MAX, EditorLayout::DockBottom);
        assert_eq!(session.open_query_tab(), Err(SessionError::CountersExhausted));
        assert_eq!(session.open_home_tab(), Err(SessionError::CountersExhausted));
        assert_eq!(session.tabs().len(), 1);

        let mut session =
            Session::from_parts(vec![home], 0, u64::MAX, 8, EditorLayout::DockBottom);
        assert_eq!(session.open_query_tab(), Err(SessionError::CountersExhausted));
        assert_eq!(session.next_tab_key(), 8);
        assert_selection_invariant(&session);
    }

    #[test]
    fn layout_toggles_and_parses() {
        let mut session = Session::new();
        session.toggle_layout();
        assert_eq!(session.layout(), EditorLayout::DockRight);
        assert_eq!(EditorLayout::parse(" dock_right "), Some(EditorLayout::DockRight));
        assert_eq!(EditorLayout::parse("floating"), None);
    }
}
