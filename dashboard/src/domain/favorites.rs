//! Persisted favourites, keyed by item identity.
//!
//! Favourites survive process restarts through the [`KeyValueStore`] port
//! under one fixed namespace key. The persisted blob is an ordered JSON
//! sequence: insertion order is display order. A missing or corrupt blob is
//! recovered to an empty set, never treated as fatal.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::ItemIdentity;
use super::geo::Coordinate;
use super::ports::{KeyValueStore, KeyValueStoreError};

/// Namespace key the favourites blob is persisted under.
pub const FAVORITES_STORAGE_KEY: &str = "ptp:favorites";

/// A user-picked item with display labels frozen at favourite time.
///
/// The distance and ETA labels record what the user saw when saving; they are
/// deliberately not refreshed when the origin changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Identity shared with the live catalog item.
    pub identity: ItemIdentity,
    /// Category label shown on the favourite pill.
    pub category_label: String,
    /// Item title.
    pub title: String,
    /// Item position.
    pub coordinate: Coordinate,
    /// Distance label at favourite time.
    pub distance_label: String,
    /// Walking-ETA label at favourite time.
    pub eta_label: String,
}

impl FavoriteRecord {
    /// Freeze a transport stop's current display fields into a record.
    #[must_use]
    pub fn from_transport_stop(stop: &super::catalog::TransportStop) -> Self {
        Self {
            identity: stop.identity.clone(),
            category_label: stop.mode.label().to_owned(),
            title: stop.title.clone(),
            coordinate: stop.coordinate,
            distance_label: super::geo::format_distance(stop.distance_meters),
            eta_label: super::geo::format_walk_eta(stop.distance_meters),
        }
    }

    /// Freeze a place item's current display fields into a record.
    #[must_use]
    pub fn from_place_item(item: &super::catalog::PlaceItem) -> Self {
        Self {
            identity: item.identity.clone(),
            category_label: item.category.label().to_owned(),
            title: item.name.clone(),
            coordinate: item.coordinate,
            distance_label: super::geo::format_distance(item.distance_meters),
            eta_label: super::geo::format_walk_eta(item.distance_meters),
        }
    }
}

/// What a [`FavoritesStore::toggle`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The record was appended.
    Added,
    /// An existing record with the same identity was removed.
    Removed,
}

/// Ordered, identity-deduplicated set of favourites with write-through
/// persistence.
pub struct FavoritesStore<S> {
    store: S,
    records: Vec<FavoriteRecord>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load favourites from the backing store.
    ///
    /// A missing blob yields an empty set; an unreadable blob is logged and
    /// recovered to an empty set.
    pub fn load(store: S) -> Self {
        let records = match store.get(FAVORITES_STORAGE_KEY) {
            None => Vec::new(),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(records) => records,
                Err(error) => {
                    warn!(%error, "favourites blob unreadable; resetting to empty");
                    Vec::new()
                }
            },
        };
        Self { store, records }
    }

    /// Favourites in insertion order.
    #[must_use]
    pub fn records(&self) -> &[FavoriteRecord] {
        &self.records
    }

    /// Whether an identity is currently favourited.
    #[must_use]
    pub fn contains(&self, identity: &ItemIdentity) -> bool {
        self.records.iter().any(|record| record.identity == *identity)
    }

    /// Look up a favourite by identity.
    #[must_use]
    pub fn find(&self, identity: &ItemIdentity) -> Option<&FavoriteRecord> {
        self.records.iter().find(|record| record.identity == *identity)
    }

    /// Add the record, or remove the existing record with the same identity.
    ///
    /// Toggling twice with the same identity restores the original set.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when the updated sequence cannot be
    /// persisted; the in-memory set is updated regardless, matching what the
    /// user sees.
    pub fn toggle(&mut self, record: FavoriteRecord) -> Result<ToggleOutcome, KeyValueStoreError> {
        let outcome = if let Some(position) = self
            .records
            .iter()
            .position(|existing| existing.identity == record.identity)
        {
            self.records.remove(position);
            ToggleOutcome::Removed
        } else {
            self.records.push(record);
            ToggleOutcome::Added
        };
        self.persist()?;
        Ok(outcome)
    }

    /// Remove every favourite and persist the empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError`] when the empty sequence cannot be
    /// persisted.
    pub fn clear(&mut self) -> Result<(), KeyValueStoreError> {
        self.records.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), KeyValueStoreError> {
        let blob = serde_json::to_string(&self.records)
            .map_err(|error| KeyValueStoreError::write(error.to_string()))?;
        self.store.set(FAVORITES_STORAGE_KEY, &blob)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for toggle semantics and blob recovery.

    use std::collections::HashMap;

    use rstest::{fixture, rstest};

    use super::*;

    #[derive(Default)]
    struct MapStore {
        entries: HashMap<String, String>,
    }

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
            self.entries.insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }

    fn record(title: &str, latitude: f64) -> FavoriteRecord {
        let coordinate = Coordinate::new(latitude, -73.0);
        FavoriteRecord {
            identity: ItemIdentity::derive("bus", coordinate),
            category_label: "Bus".to_owned(),
            title: title.to_owned(),
            coordinate,
            distance_label: "111 m".to_owned(),
            eta_label: "~1 min walk".to_owned(),
        }
    }

    #[fixture]
    fn store() -> FavoritesStore<MapStore> {
        FavoritesStore::load(MapStore::default())
    }

    #[rstest]
    fn toggle_is_its_own_inverse(mut store: FavoritesStore<MapStore>) {
        let favourite = record("Main St", 40.001);

        let added = store.toggle(favourite.clone()).expect("persist");
        assert_eq!(added, ToggleOutcome::Added);
        assert!(store.contains(&favourite.identity));

        let removed = store.toggle(favourite.clone()).expect("persist");
        assert_eq!(removed, ToggleOutcome::Removed);
        assert!(store.records().is_empty());
    }

    #[rstest]
    fn insertion_order_is_preserved(mut store: FavoritesStore<MapStore>) {
        store.toggle(record("First", 40.001)).expect("persist");
        store.toggle(record("Second", 40.002)).expect("persist");
        store.toggle(record("Third", 40.003)).expect("persist");

        let titles: Vec<&str> = store.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
    }

    #[rstest]
    fn favourites_survive_a_reload() {
        let mut backing = MapStore::default();
        {
            let mut store = FavoritesStore::load(MapStore {
                entries: backing.entries.clone(),
            });
            store.toggle(record("Main St", 40.001)).expect("persist");
            backing.entries = store.store.entries;
        }

        let reloaded = FavoritesStore::load(backing);
        assert_eq!(reloaded.records().len(), 1);
        assert_eq!(reloaded.records()[0].title, "Main St");
        assert_eq!(reloaded.records()[0].distance_label, "111 m");
    }

    #[rstest]
    fn corrupt_blob_recovers_to_empty() {
        let mut backing = MapStore::default();
        backing
            .set(FAVORITES_STORAGE_KEY, "{not json")
            .expect("seed blob");

        let store = FavoritesStore::load(backing);
        assert!(store.records().is_empty());
    }

    #[rstest]
    fn clear_empties_and_persists(mut store: FavoritesStore<MapStore>) {
        store.toggle(record("Main St", 40.001)).expect("persist");
        store.clear().expect("persist");

        assert!(store.records().is_empty());
        let blob = store.store.get(FAVORITES_STORAGE_KEY).expect("blob written");
        assert_eq!(blob, "[]");
    }
}
