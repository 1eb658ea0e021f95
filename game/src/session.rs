use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use runtime::debounce::Debouncer;
use runtime::store::StateStore;

use crate::team::Roster;

/// Persisted blob layout, fixed by the document contract:
/// `{ "teams": [{"name","points"}], "inerts": {cell_element_id: true} }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub name: String,
    pub points: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub teams: Vec<TeamSnapshot>,
    #[serde(default)]
    pub inerts: BTreeMap<String, bool>,
}

impl SessionSnapshot {
    pub fn capture(roster: &Roster, inert_element_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            teams: roster
                .teams()
                .iter()
                .filter(|t| t.visible)
                .map(|t| TeamSnapshot {
                    name: t.name.clone(),
                    points: t.points_text.clone(),
                })
                .collect(),
            inerts: inert_element_ids.into_iter().map(|id| (id, true)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.inerts.is_empty()
    }
}

/// Save/load/clear for the one session blob, keyed by the document's
/// fixed identifier. The backing store is borrowed per call so the
/// runtime context can share one backend across all persisted keys.
/// Saves coalesce through a ~100ms debounce window so a burst of roster
/// edits writes once.
#[derive(Debug)]
pub struct SessionStore {
    key: String,
    debounce: Debouncer,
    pending: Option<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            debounce: Debouncer::new(Debouncer::DEFAULT_WINDOW),
            pending: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Invoked exactly once at startup, before the first menu render.
    /// Unavailable or corrupt storage reads as "no prior session".
    pub fn load(&self, store: &dyn StateStore) -> Option<SessionSnapshot> {
        let raw = store.get(&self.key)?;
        serde_json::from_str(&raw).ok()
    }

    /// Queues a save; the write happens once the debounce window has been
    /// quiet. Later requests replace the pending snapshot.
    pub fn request_save(&mut self, snapshot: SessionSnapshot, now: Instant) {
        self.pending = Some(snapshot);
        self.debounce.notify(now);
    }

    /// Performs the pending write if the window has elapsed. Returns
    /// whether a write happened.
    pub fn flush_due(&mut self, store: &mut dyn StateStore, now: Instant) -> bool {
        if !self.debounce.fire_due(now) {
            return false;
        }
        match self.pending.take() {
            Some(snapshot) => {
                self.write(store, &snapshot);
                true
            }
            None => false,
        }
    }

    /// Immediate write, bypassing the debounce (teardown path).
    pub fn save_now(&mut self, store: &mut dyn StateStore, snapshot: &SessionSnapshot) {
        self.debounce.cancel();
        self.pending = None;
        self.write(store, snapshot);
    }

    pub fn clear(&mut self, store: &mut dyn StateStore) {
        self.debounce.cancel();
        self.pending = None;
        store.remove(&self.key);
    }

    fn write(&mut self, store: &mut dyn StateStore, snapshot: &SessionSnapshot) {
        // Serialization of this shape cannot fail; storage failures are
        // swallowed by the store itself.
        if let Ok(raw) = serde_json::to_string(snapshot) {
            store.put(&self.key, &raw);
        }
    }
}
