#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Activity {
    Home,
    Queries,
    History,
    Reference,
    Settings,
}

/// Top-level navigation and sidebar presentation flags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShellState {
    pub(crate) activity: Activity,
    pub(crate) is_sidebar_open: bool,
    pub(crate) can_open_sidebar: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            activity: Activity::Queries,
            is_sidebar_open: false,
            can_open_sidebar: true,
        }
    }
}

impl ShellState {
    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.is_sidebar_open
    }

    pub fn can_open_sidebar(&self) -> bool {
        self.can_open_sidebar
    }

    pub(crate) fn toggle_sidebar(&mut self) {
        if self.can_open_sidebar {
            self.is_sidebar_open = !self.is_sidebar_open;
        }
    }

    /// Ignored while the sidebar is disabled.
    pub(crate) fn set_sidebar_open(&mut self, open: bool) {
        if self.can_open_sidebar {
            self.is_sidebar_open = open;
        }
    }

    pub(crate) fn set_can_open_sidebar(&mut self, can_open: bool) {
        self.can_open_sidebar = can_open;
    }
}
