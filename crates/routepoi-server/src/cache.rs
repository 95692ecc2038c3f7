//! Idle-entry pruning for DashMap-backed registries.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait IdleEntry {
    fn last_used(&self) -> Instant;
}

/// Drop entries idle longer than `max_idle`, then the least recently used ones
/// until at most `max_entries` remain. Returns how many were removed.
pub fn prune_idle<K, V>(map: &DashMap<K, V>, max_entries: usize, max_idle: Duration) -> usize
where
    K: Clone + Eq + Hash,
    V: IdleEntry,
{
    let before = map.len();
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().last_used()))
        .collect();

    entries.retain(|(key, last_used)| {
        if now.duration_since(*last_used) > max_idle {
            map.remove(key);
            false
        } else {
            true
        }
    });

    if map.len() > max_entries {
        entries.sort_by_key(|(_, last_used)| *last_used);
        for (key, _) in entries {
            if map.len() <= max_entries {
                break;
            }
            map.remove(&key);
        }
    }
    before.saturating_sub(map.len())
}
