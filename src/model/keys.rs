//! Structural keys and the DOM-id lookup built during a walk.

use std::collections::HashMap;

/// Key of the `index`-th child under `prefix`; roots have an empty prefix.
pub fn child_key(prefix: &str, index: usize) -> String {
    if prefix.is_empty() {
        index.to_string()
    } else {
        format!("{prefix}_{index}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    distance: usize,
}

/// DOM id to node key, keeping the closest emitted node per id.
#[derive(Debug, Clone, Default)]
pub struct DomIdMap {
    entries: HashMap<String, Entry>,
}

impl DomIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dom_id -> key` unless a closer node is already recorded.
    pub fn record(&mut self, dom_id: &str, key: &str, distance: usize) {
        match self.entries.get_mut(dom_id) {
            Some(entry) if entry.distance <= distance => {}
            Some(entry) => {
                entry.key = key.to_string();
                entry.distance = distance;
            }
            None => {
                self.entries.insert(
                    dom_id.to_string(),
                    Entry {
                        key: key.to_string(),
                        distance,
                    },
                );
            }
        }
    }

    pub fn key(&self, dom_id: &str) -> Option<&str> {
        self.entries.get(dom_id).map(|e| e.key.as_str())
    }

    /// Forget every id pointing at `key`, returning them closest first.
    pub fn take_key(&mut self, key: &str) -> Vec<String> {
        let mut taken: Vec<(String, usize)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.key == key)
            .map(|(id, entry)| (id.clone(), entry.distance))
            .collect();
        for (id, _) in &taken {
            self.entries.remove(id);
        }
        taken.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        taken.into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// DOM ids seen on the way down that still wait for an emitted node.
///
/// The most recently pushed id is the closest one (distance 0).
#[derive(Debug, Clone, Default)]
pub struct PendingIds {
    ids: Vec<String>,
}

impl PendingIds {
    pub fn push(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Queue ids behind everything already pending.
    pub fn requeue(&mut self, ids: Vec<String>) {
        let mut ids = ids;
        ids.reverse();
        ids.append(&mut self.ids);
        self.ids = ids;
    }

    /// Ids paired with their distance, closest first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ids
            .iter()
            .rev()
            .enumerate()
            .map(|(distance, id)| (id.as_str(), distance))
    }

    /// Record every pending id against `key` and clear the queue.
    pub fn flush_into(&mut self, map: &mut DomIdMap, key: &str) {
        for (id, distance) in self.iter() {
            map.record(id, key, distance);
        }
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
