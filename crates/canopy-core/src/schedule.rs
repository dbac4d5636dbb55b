use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Entry<K, E> {
    key: K,
    due: f64,
    seq: u64,
    event: E,
}

/// Events scheduled against the simulation clock instead of host timers.
///
/// At most one pending entry exists per key: scheduling under an occupied key
/// replaces the previous entry, which is how periodic or delayed behavior gets
/// cancelled when the state that requested it changes. Due events are drained
/// in `(due time, insertion order)` order so runs are reproducible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scheduler<K, E> {
    entries: Vec<Entry<K, E>>,
    next_seq: u64,
}

impl<K, E> Default for Scheduler<K, E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: PartialEq + Copy, E> Scheduler<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at absolute time `due`, replacing any entry under `key`.
    pub fn schedule(&mut self, key: K, due: f64, event: E) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            key,
            due,
            seq,
            event,
        });
    }

    /// Remove the entry under `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    pub fn due_at(&self, key: K) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.due)
    }

    /// Remove and return every event whose due time is `<= now`.
    pub fn drain_due(&mut self, now: f64) -> Vec<E> {
        let mut due: Vec<Entry<K, E>> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.event).collect()
    }
}
