use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::input::clamp_count;
use crate::model::college::{CollegeData, CollegeState};
use crate::model::profile::UserProfile;
use crate::model::school::{SchoolState, Week};
use crate::model::state::AppState;
use crate::repository::keys::StorageKey;
use crate::repository::traits::KeyValueStore;

/// Maps [`AppState`] to and from a [`KeyValueStore`].
///
/// Reads never fail: each key falls back to its default on its own. Writes
/// are best effort and only logged on failure, since the in-memory state
/// stays authoritative for the session.
pub struct PersistenceGateway<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads every key and assembles the startup state.
    pub fn load(&self) -> AppState {
        let profile = self.load_json::<UserProfile>(StorageKey::UserProfile);

        let weeks = self
            .load_json::<Vec<Week>>(StorageKey::SchoolWeeks)
            .unwrap_or_else(|| vec![Week::new(1)]);
        let current_week = self.load_scalar(StorageKey::SchoolCurrentWeek).unwrap_or(1);
        let previous_attended = self
            .load_scalar(StorageKey::SchoolPreviousAttended)
            .unwrap_or(0);
        let previous_total = self.load_scalar(StorageKey::SchoolPreviousTotal).unwrap_or(0);

        let college_data = self
            .load_json::<CollegeData>(StorageKey::CollegeData)
            .unwrap_or_default();
        let eca_count = self.load_scalar(StorageKey::EcaCount).unwrap_or(0);

        AppState {
            profile,
            school: SchoolState::from_parts(weeks, current_week, previous_attended, previous_total),
            college: CollegeState::from_parts(college_data, eca_count),
        }
    }

    /// Writes the entity behind `key` as it currently stands in `state`.
    pub fn save(&self, key: StorageKey, state: &AppState) {
        let text = match key {
            StorageKey::UserProfile => match &state.profile {
                Some(profile) => to_json(key, profile),
                None => return,
            },
            StorageKey::SchoolWeeks => to_json(key, state.school.weeks()),
            StorageKey::SchoolCurrentWeek => Some(state.school.current_week_number().to_string()),
            StorageKey::SchoolPreviousAttended => {
                Some(state.school.previous_attended().to_string())
            }
            StorageKey::SchoolPreviousTotal => Some(state.school.previous_total().to_string()),
            StorageKey::CollegeData => to_json(key, state.college.data()),
            StorageKey::EcaCount => Some(state.college.eca_count().to_string()),
        };

        let Some(text) = text else { return };
        match self.store.save(key.as_str(), &text) {
            Ok(()) => tracing::debug!(%key, bytes = text.len(), "saved"),
            Err(e) => tracing::error!(%key, error = %e, "save failed, keeping in-memory state"),
        }
    }

    pub fn save_all(&self, keys: &[StorageKey], state: &AppState) {
        for &key in keys {
            self.save(key, state);
        }
    }

    /// Removes every key. Failures are logged and the remaining keys are still cleared.
    pub fn clear_all(&self) -> usize {
        let mut failures = 0;
        for key in StorageKey::ALL {
            if let Err(e) = self.store.clear(key.as_str()) {
                failures += 1;
                tracing::error!(%key, error = %e, "clear failed");
            }
        }
        failures
    }

    fn load_text(&self, key: StorageKey) -> Option<String> {
        match self.store.load(key.as_str()) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%key, error = %e, "read failed, using default");
                None
            }
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let text = self.load_text(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "stored value unreadable, using default");
                None
            }
        }
    }

    fn load_scalar(&self, key: StorageKey) -> Option<u32> {
        let text = self.load_text(key)?;
        match text.trim().parse::<i64>() {
            Ok(n) => Some(clamp_count(n)),
            Err(e) => {
                tracing::warn!(%key, error = %e, "stored number unreadable, using default");
                None
            }
        }
    }
}

fn to_json<T: Serialize + ?Sized>(key: StorageKey, value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(%key, error = %e, "could not serialize");
            None
        }
    }
}
