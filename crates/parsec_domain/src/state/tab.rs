use super::{QueryRun, TabKey};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Home,
    Query,
}

#[derive(Clone, Debug)]
pub struct HomeTab {
    pub(crate) key: TabKey,
    pub(crate) label: String,
}

#[derive(Clone, Debug)]
pub struct QueryTab {
    pub(crate) key: TabKey,
    pub(crate) label: String,
    pub(crate) query: String,
    pub(crate) is_running: bool,
    pub(crate) is_fresh: bool,
    pub(crate) run: QueryRun,
}

#[derive(Clone, Debug)]
pub enum Tab {
    Home(HomeTab),
    Query(QueryTab),
}

impl HomeTab {
    pub fn key(&self) -> TabKey {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl QueryTab {
    pub(crate) fn new(key: TabKey, label: String, query: String) -> Self {
        Self {
            key,
            label,
            query,
            is_running: false,
            is_fresh: true,
            run: QueryRun::default(),
        }
    }

    pub fn key(&self) -> TabKey {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// True only until the tab is first shown to the user.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh
    }

    pub fn run(&self) -> &QueryRun {
        &self.run
    }

    pub(crate) fn set_query(&mut self, query: String) {
        self.query = query;
        self.run.invalidate_validation();
        self.sync_running();
    }

    pub(crate) fn run_mut(&mut self) -> &mut QueryRun {
        &mut self.run
    }

    pub(crate) fn sync_running(&mut self) {
        self.is_running = self.run.is_loading();
    }
}

impl Tab {
    pub fn key(&self) -> TabKey {
        match self {
            Tab::Home(tab) => tab.key,
            Tab::Query(tab) => tab.key,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tab::Home(tab) => &tab.label,
            Tab::Query(tab) => &tab.label,
        }
    }

    pub fn kind(&self) -> TabKind {
        match self {
            Tab::Home(_) => TabKind::Home,
            Tab::Query(_) => TabKind::Query,
        }
    }

    pub fn as_query(&self) -> Option<&QueryTab> {
        match self {
            Tab::Home(_) => None,
            Tab::Query(tab) => Some(tab),
        }
    }

    pub(crate) fn as_query_mut(&mut self) -> Option<&mut QueryTab> {
        match self {
            Tab::Home(_) => None,
            Tab::Query(tab) => Some(tab),
        }
    }

    pub(crate) fn set_key(&mut self, key: TabKey) {
        match self {
            Tab::Home(tab) => tab.key = key,
            Tab::Query(tab) => tab.key = key,
        }
    }

    pub(crate) fn set_label(&mut self, label: String) {
        match self {
            Tab::Home(tab) => tab.label = label,
            Tab::Query(tab) => tab.label = label,
        }
    }
}
