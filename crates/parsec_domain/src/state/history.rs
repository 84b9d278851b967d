use super::HistoryId;
use crate::{DataSet, ExecutionSummary};
use std::collections::{HashMap, VecDeque};

pub const HISTORY_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Running,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub(crate) id: HistoryId,
    pub(crate) query: String,
    pub(crate) status: HistoryStatus,
    pub(crate) summary: Option<ExecutionSummary>,
}

impl HistoryEntry {
    pub fn id(&self) -> HistoryId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> HistoryStatus {
        self.status
    }

    pub fn summary(&self) -> Option<&ExecutionSummary> {
        self.summary.as_ref()
    }
}

/// Submitted queries, newest first, bounded to [`HISTORY_CAPACITY`] entries.
///
/// Bulk result rows live in a separate map keyed by entry id and are evicted together with
/// their entry.
#[derive(Clone, Debug)]
pub struct HistoryCache {
    entries: VecDeque<HistoryEntry>,
    payloads: HashMap<HistoryId, Vec<DataSet>>,
    next_id: u64,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryCache {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            payloads: HashMap::new(),
            next_id: 1,
        }
    }

    pub(crate) fn from_parts(entries: Vec<HistoryEntry>, next_id: u64) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries.into();
        entries.truncate(HISTORY_CAPACITY);
        let max_id = entries.iter().map(|e| e.id.0).max().unwrap_or(0);
        Self {
            entries,
            payloads: HashMap::new(),
            next_id: next_id.max(max_id.saturating_add(1)),
        }
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: HistoryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn payload(&self, id: HistoryId) -> Option<&[DataSet]> {
        self.payloads.get(&id).map(Vec::as_slice)
    }

    pub fn payload_count(&self) -> usize {
        self.payloads.len()
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Returns `None` without recording anything once the id counter is spent.
    pub fn record(&mut self, query: impl Into<String>) -> Option<HistoryId> {
        let id = HistoryId(self.next_id);
        self.next_id = self.next_id.checked_add(1)?;
        self.entries.push_front(HistoryEntry {
            id,
            query: query.into(),
            status: HistoryStatus::Running,
            summary: None,
        });

        while self.entries.len() > HISTORY_CAPACITY {
            if let Some(evicted) = self.entries.pop_back() {
                self.payloads.remove(&evicted.id);
            }
        }
        Some(id)
    }

    /// Returns false when the entry is gone, e.g. evicted while its call was in flight.
    pub fn complete(
        &mut self,
        id: HistoryId,
        status: HistoryStatus,
        summary: ExecutionSummary,
        payload: Vec<DataSet>,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.status = status;
        entry.summary = Some(summary);
        self.payloads.insert(id, payload);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.payloads.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_payloads_subset(cache: &HistoryCache) {
        for id in cache.payloads.keys() {
            assert!(cache.entry(*id).is_some(), "orphan payload {id}");
        }
    }

    #[test]
    fn record_inserts_running_entry_at_head() {
        let mut cache = HistoryCache::new();
        let first = cache.record("input a").unwrap();
        let second = cache.record("input b").unwrap();

        let ids: Vec<HistoryId> = cache.entries().map(HistoryEntry::id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(cache.entry(first).unwrap().status(), HistoryStatus::Running);
        assert!(cache.entry(first).unwrap().summary().is_none());
    }

    #[test]
    fn complete_stores_summary_and_payload() {
        let mut cache = HistoryCache::new();
        let id = cache.record("input mock").unwrap();
        let payload = vec![DataSet {
            name: "0".to_owned(),
            count: 3,
            ..DataSet::default()
        }];

        assert!(cache.complete(
            id,
            HistoryStatus::Success,
            ExecutionSummary::default(),
            payload.clone()
        ));

        let entry = cache.entry(id).unwrap();
        assert_eq!(entry.status(), HistoryStatus::Success);
        assert!(entry.summary().is_some());
        assert_eq!(cache.payload(id), Some(payload.as_slice()));

        for _ in 0..HISTORY_CAPACITY {
            cache.record("input mock").unwrap();
        }
        assert!(cache.entry(id).is_none());
        assert!(cache.payload(id).is_none());
        assert_payloads_subset(&cache);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut cache = HistoryCache::new();
        let ids: Vec<HistoryId> = (0..=HISTORY_CAPACITY)
            .map(|_| cache.record("input mock").unwrap())
            .collect();

        assert_eq!(cache.len(), HISTORY_CAPACITY);
        assert!(cache.entry(ids[0]).is_none());
        assert!(cache.payload(ids[0]).is_none());
        assert!(cache.entry(ids[HISTORY_CAPACITY]).is_some());
    }

    #[test]
    fn bound_holds_with_interleaved_completions() {
        let mut cache = HistoryCache::new();
        for i in 0..250 {
            let id = cache.record(format!("input {i}")).unwrap();
            if i % 3 == 0 {
                cache.complete(
                    id,
                    HistoryStatus::Success,
                    ExecutionSummary::default(),
                    Vec::new(),
                );
            }
            assert!(cache.len() <= HISTORY_CAPACITY);
            assert_payloads_subset(&cache);
        }
    }

    #[test]
    fn completing_evicted_entry_is_a_noop() {
        let mut cache = HistoryCache::new();
        let stale = cache.record("input old").unwrap();
        for _ in 0..HISTORY_CAPACITY {
            cache.record("input new").unwrap();
        }

        assert!(!cache.complete(
            stale,
            HistoryStatus::Error,
            ExecutionSummary::default(),
            vec![DataSet::default()]
        ));
        assert!(cache.payload(stale).is_none());
        assert_eq!(cache.payload_count(), 0);
    }

    #[test]
    fn clear_is_idempotent_and_keeps_ids_unique() {
        let mut cache = HistoryCache::new();
        let id = cache.record("input mock").unwrap();
        cache.complete(
            id,
            HistoryStatus::Success,
            ExecutionSummary::default(),
            Vec::new(),
        );

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.payload_count(), 0);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.payload_count(), 0);

        let next = cache.record("input mock").unwrap();
        assert_ne!(next, id);
    }

    #[test]
    fn from_parts_truncates_and_advances_counter() {
        let entries: Vec<HistoryEntry> = (1..=120)
            .rev()
            .map(|n| HistoryEntry {
                id: HistoryId(n),
                query: format!("input {n}"),
                status: HistoryStatus::Success,
                summary: None,
            })
            .collect();

        let mut cache = HistoryCache::from_parts(entries, 1);
        assert_eq!(cache.len(), HISTORY_CAPACITY);
        assert_eq!(cache.entries().next().unwrap().id(), HistoryId(120));
        assert_eq!(cache.record("input next"), Some(HistoryId(121)));
    }

    #[test]
    fn spent_counter_stops_recording() {
        let entry = HistoryEntry {
            id: HistoryId(3),
            query: "input a".to_owned(),
            status: HistoryStatus::Success,
            summary: None,
        };
        let mut cache = HistoryCache::from_parts(vec![entry], u64::MAX);

        assert_eq!(cache.record("input b"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.next_id(), u64::MAX);
    }
}
