//! Per-session marker state keyed by POI identity.
//!
//! A record's state only changes along the permitted edges:
//!
//! ```text
//! suggested <-> selected
//! suggested  -> discarded
//! selected   -> discarded
//! ```
//!
//! `existing` and `discarded` are terminal. Ingesting a key that is already
//! present is skipped whatever its state.

use crate::error::{PoiError, Result};
use crate::models::{CanonicalPoi, PoiEdit};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    Suggested,
    Selected,
    Existing,
    Discarded,
}

impl MarkerState {
    fn allows(self, to: MarkerState) -> bool {
        use MarkerState::*;
        matches!(
            (self, to),
            (Suggested, Selected) | (Selected, Suggested) | (Suggested, Discarded) | (Selected, Discarded)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied,
    /// Already in the requested state.
    Unchanged,
    /// The record is `existing`.
    Locked,
    NotAllowed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub poi: CanonicalPoi,
    pub state: MarkerState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerCounts {
    pub suggested: usize,
    pub selected: usize,
    pub existing: usize,
    pub discarded: usize,
}

/// Insertion-ordered marker store owned by one session.
#[derive(Debug, Clone, Default)]
pub struct MarkerStateStore {
    records: IndexMap<String, MarkerRecord>,
}

impl MarkerStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_new(&mut self, poi: CanonicalPoi, state: MarkerState) -> bool {
        let key = poi.identity_key();
        if self.records.contains_key(&key) {
            return false;
        }
        self.records.insert(key, MarkerRecord { poi, state });
        true
    }

    /// Add provider results as `suggested`. Returns how many were inserted.
    pub fn ingest<I>(&mut self, pois: I) -> usize
    where
        I: IntoIterator<Item = CanonicalPoi>,
    {
        pois.into_iter()
            .map(|poi| self.insert_new(poi, MarkerState::Suggested))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Seed POIs already stored on the remote route as `existing`.
    pub fn ingest_existing<I>(&mut self, pois: I) -> usize
    where
        I: IntoIterator<Item = CanonicalPoi>,
    {
        pois.into_iter()
            .map(|poi| self.insert_new(poi, MarkerState::Existing))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Add a user-typed POI as `suggested`.
    pub fn add_custom(&mut self, poi: CanonicalPoi) -> bool {
        self.insert_new(poi, MarkerState::Suggested)
    }

    pub fn transition(&mut self, key: &str, to: MarkerState) -> TransitionOutcome {
        let Some(record) = self.records.get_mut(key) else {
            return TransitionOutcome::Unknown;
        };
        if record.state == MarkerState::Existing {
            return TransitionOutcome::Locked;
        }
        if record.state == to {
            return TransitionOutcome::Unchanged;
        }
        if !record.state.allows(to) {
            return TransitionOutcome::NotAllowed;
        }
        record.state = to;
        TransitionOutcome::Applied
    }

    /// Apply a user edit to a `suggested` or `selected` record and return its key,
    /// which changes when the name does. The record keeps its position.
    pub fn edit(&mut self, key: &str, edit: PoiEdit) -> Result<String> {
        let Some((index, _, record)) = self.records.get_full(key) else {
            return Err(PoiError::invalid(format!("unknown marker '{}'", key)));
        };
        if matches!(record.state, MarkerState::Existing | MarkerState::Discarded) {
            return Err(PoiError::invalid(format!(
                "marker '{}' can no longer be edited",
                key
            )));
        }

        let state = record.state;
        let mut poi = record.poi.clone();
        if let Some(name) = edit.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(PoiError::invalid("marker name cannot be empty"));
            }
            poi.name = name.to_string();
        }
        if let Some(poi_type) = edit.poi_type {
            poi.poi_type = poi_type;
        }
        if let Some(description) = edit.description {
            poi.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(url) = edit.url {
            poi.url = Some(url).filter(|u| !u.trim().is_empty());
        }

        let new_key = poi.identity_key();
        if new_key != key && self.records.contains_key(&new_key) {
            return Err(PoiError::invalid(format!(
                "another marker already uses the key '{}'",
                new_key
            )));
        }

        if new_key == key {
            if let Some(record) = self.records.get_index_mut(index).map(|(_, r)| r) {
                record.poi = poi;
            }
        } else {
            self.records.shift_remove_index(index);
            self.records
                .shift_insert(index, new_key.clone(), MarkerRecord { poi, state });
        }
        Ok(new_key)
    }

    /// Remove every `suggested` record. Returns how many were removed.
    pub fn clear_suggested(&mut self) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.state != MarkerState::Suggested);
        before - self.records.len()
    }

    /// Apply a successful commit. Records for `committed` become `existing`
    /// whatever state they reached meanwhile, and POIs from the `written` remote
    /// list that the store has not seen are seeded as `existing`. Nothing else
    /// changes. Returns how many records were promoted or added.
    pub fn mark_committed<I>(&mut self, committed: &[CanonicalPoi], written: I) -> usize
    where
        I: IntoIterator<Item = CanonicalPoi>,
    {
        let mut changed = 0;
        for poi in committed {
            if let Some(record) = self.records.get_mut(&poi.identity_key()) {
                if record.state != MarkerState::Existing {
                    record.state = MarkerState::Existing;
                    changed += 1;
                }
            }
        }
        changed + self.ingest_existing(written)
    }

    pub fn get(&self, key: &str) -> Option<&MarkerRecord> {
        self.records.get(key)
    }

    pub fn state(&self, key: &str) -> Option<MarkerState> {
        self.records.get(key).map(|record| record.state)
    }

    /// All records in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &MarkerRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Accepted POIs in the order they were first seen.
    pub fn selected(&self) -> Vec<CanonicalPoi> {
        self.records
            .values()
            .filter(|record| record.state == MarkerState::Selected)
            .map(|record| record.poi.clone())
            .collect()
    }

    pub fn counts(&self) -> MarkerCounts {
        self.records
            .values()
            .fold(MarkerCounts::default(), |mut counts, record| {
                match record.state {
                    MarkerState::Suggested => counts.suggested += 1,
                    MarkerState::Selected => counts.selected += 1,
                    MarkerState::Existing => counts.existing += 1,
                    MarkerState::Discarded => counts.discarded += 1,
                }
                counts
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_map::CanonicalType;

    fn poi(name: &str, lat: f64) -> CanonicalPoi {
        CanonicalPoi::new(name, lat, 8.5, "osm")
    }

    fn seeded() -> MarkerStateStore {
        let mut store = MarkerStateStore::new();
        store.ingest_existing(vec![poi("Hut", 47.0)]);
        store.ingest(vec![poi("Cafe", 47.1), poi("Fuel", 47.2)]);
        store
    }

    #[test]
    fn test_existing_is_locked() {
        let mut store = seeded();
        let key = poi("Hut", 47.0).identity_key();
        for target in [
            MarkerState::Suggested,
            MarkerState::Selected,
            MarkerState::Discarded,
        ] {
            assert_eq!(store.transition(&key, target), TransitionOutcome::Locked);
        }
        assert_eq!(store.state(&key), Some(MarkerState::Existing));
    }

    #[test]
    fn test_select_then_unselect_restores_state() {
        let mut store = seeded();
        let key = poi("Cafe", 47.1).identity_key();
        let before = store.get(&key).cloned();

        assert_eq!(store.transition(&key, MarkerState::Selected), TransitionOutcome::Applied);
        assert_eq!(store.selected().len(), 1);
        assert_eq!(store.transition(&key, MarkerState::Suggested), TransitionOutcome::Applied);

        assert_eq!(store.get(&key).cloned(), before);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_reingest_is_skipped() {
        let mut store = seeded();
        let key = poi("Cafe", 47.1).identity_key();
        store.transition(&key, MarkerState::Selected);
        assert_eq!(store.ingest(vec![poi("Cafe", 47.1), poi("Hut", 47.0)]), 0);
        assert_eq!(store.state(&key), Some(MarkerState::Selected));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_discarded_is_terminal_and_blocks_reingest() {
        let mut store = seeded();
        let key = poi("Fuel", 47.2).identity_key();
        assert_eq!(store.transition(&key, MarkerState::Discarded), TransitionOutcome::Applied);
        assert_eq!(store.transition(&key, MarkerState::Selected), TransitionOutcome::NotAllowed);
        assert!(!store.add_custom(poi("Fuel", 47.2)));
        assert_eq!(store.counts().discarded, 1);
    }

    #[test]
    fn test_cannot_become_existing() {
        let mut store = seeded();
        let key = poi("Cafe", 47.1).identity_key();
        assert_eq!(store.transition(&key, MarkerState::Existing), TransitionOutcome::NotAllowed);
        assert_eq!(store.transition("nope", MarkerState::Selected), TransitionOutcome::Unknown);
    }

    #[test]
    fn test_clear_suggested() {
        let mut store = seeded();
        let cafe = poi("Cafe", 47.1).identity_key();
        store.transition(&cafe, MarkerState::Selected);

        assert_eq!(store.clear_suggested(), 1);
        let counts = store.counts();
        assert_eq!(counts.suggested, 0);
        assert_eq!(counts.selected, 1);
        assert_eq!(counts.existing, 1);
    }

    #[test]
    fn test_edit_rekeys_in_place() {
        let mut store = seeded();
        let key = poi("Cafe", 47.1).identity_key();
        let edit = PoiEdit {
            name: Some("Corner Cafe".into()),
            poi_type: Some(CanonicalType::Coffee),
            description: Some("Good espresso".into()),
            url: None,
        };
        let new_key = store.edit(&key, edit).unwrap();

        assert_ne!(new_key, key);
        assert!(store.get(&key).is_none());
        let keys: Vec<&str> = store.all().map(|(k, _)| k).collect();
        assert_eq!(keys[1], new_key);
        let record = store.get(&new_key).unwrap();
        assert_eq!(record.poi.poi_type, CanonicalType::Coffee);
        assert_eq!(record.poi.lat, 47.1);
        assert_eq!(record.state, MarkerState::Suggested);
    }

    #[test]
    fn test_edit_rejects_collision_and_locked() {
        let mut store = seeded();
        store.add_custom(poi("Cafe", 47.2));
        let fuel = poi("Fuel", 47.2).identity_key();
        let collide = PoiEdit {
            name: Some("Cafe".into()),
            ..Default::default()
        };
        assert!(store.edit(&fuel, collide).is_err());

        let hut = poi("Hut", 47.0).identity_key();
        assert!(store.edit(&hut, PoiEdit::default()).is_err());
    }

    #[test]
    fn test_mark_committed_leaves_other_records() {
        let mut store = seeded();
        let cafe = poi("Cafe", 47.1);
        store.transition(&cafe.identity_key(), MarkerState::Selected);
        // Arrived while the commit was in flight.
        store.ingest(vec![poi("Bench", 47.3)]);
        let written = vec![poi("Hut", 47.0), poi("Remote", 47.4), cafe.clone()];

        assert_eq!(store.mark_committed(&[cafe.clone()], written), 2);

        assert_eq!(store.state(&cafe.identity_key()), Some(MarkerState::Existing));
        assert_eq!(store.state(&poi("Remote", 47.4).identity_key()), Some(MarkerState::Existing));
        assert_eq!(store.state(&poi("Fuel", 47.2).identity_key()), Some(MarkerState::Suggested));
        assert_eq!(store.state(&poi("Bench", 47.3).identity_key()), Some(MarkerState::Suggested));
        let counts = store.counts();
        assert_eq!((counts.existing, counts.suggested, counts.selected), (3, 2, 0));
    }
}
