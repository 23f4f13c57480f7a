// The user's own 1/X/2 picks, persisted independently of fetched data.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{MatchId, Outcome};
use crate::store::{KeyValueStore, StorageError};

/// Storage key holding the JSON-encoded pick mapping.
pub const CHOICES_KEY: &str = "userChoices";

/// Match id -> the outcome the user picked by hand.
pub type UserChoices = HashMap<MatchId, Outcome>;

/// Best-effort persistence of [`UserChoices`] under a single key.
#[derive(Clone)]
pub struct ChoiceStore {
    store: Arc<dyn KeyValueStore>,
}

impl ChoiceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted mapping. Absent or malformed data yields an empty
    /// mapping; the cause is logged.
    pub fn get(&self) -> UserChoices {
        match self.try_get() {
            Ok(choices) => choices,
            Err(e) => {
                warn!("Ignoring stored user choices: {}", e);
                UserChoices::new()
            }
        }
    }

    /// Record `outcome` for `match_id`, merging into the persisted mapping
    /// and writing the full mapping back. Returns the mapping as written.
    ///
    /// A malformed stored value is replaced. A backend failure while reading
    /// aborts the write, so existing picks are never overwritten by a
    /// partial mapping.
    pub fn set(&self, match_id: &MatchId, outcome: Outcome) -> Result<UserChoices, StorageError> {
        let mut choices = match self.try_get() {
            Ok(choices) => choices,
            Err(e @ StorageError::Malformed { .. }) => {
                warn!("Replacing unreadable user choices: {}", e);
                UserChoices::new()
            }
            Err(e) => return Err(e),
        };
        choices.insert(match_id.clone(), outcome);
        self.write(&choices)?;
        debug!("Stored pick {} for match {}", outcome, match_id);
        Ok(choices)
    }

    fn try_get(&self) -> Result<UserChoices, StorageError> {
        let Some(raw) = self.store.get(CHOICES_KEY)? else {
            return Ok(UserChoices::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            key: CHOICES_KEY.to_string(),
            source,
        })
    }

    fn write(&self, choices: &UserChoices) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(choices).map_err(|source| StorageError::Encode {
            key: CHOICES_KEY.to_string(),
            source,
        })?;
        self.store.set(CHOICES_KEY, &encoded)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
