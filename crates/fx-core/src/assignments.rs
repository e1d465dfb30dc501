use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Timestamp, Variation};

/// Assignments as fetched and persisted: names are still optional strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssignments {
    pub variations: BTreeMap<String, Option<String>>,
    /// Seconds the snapshot stays valid after `fetched_at`.
    pub ttl: i64,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: Timestamp,
}

impl RawAssignments {
    pub fn new(variations: BTreeMap<String, Option<String>>, ttl: i64, fetched_at: Timestamp) -> Self {
        Self { variations, ttl, fetched_at }
    }

    /// Stamp a snapshot with the current wall clock.
    pub fn fetched_now(variations: BTreeMap<String, Option<String>>, ttl: i64) -> Self {
        Self::new(variations, ttl, Timestamp::now())
    }
}

/// Resolved view over a [`RawAssignments`] snapshot.
///
/// `expires_at` is fixed when the value is built; only [`Assignments::is_stale`]
/// looks at the clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignments {
    variations: BTreeMap<String, Variation>,
    ttl: i64,
    fetched_at: Timestamp,
    expires_at: Timestamp,
}

impl Assignments {
    pub fn new(variations: BTreeMap<String, Variation>, ttl: i64, fetched_at: Timestamp) -> Self {
        let expires_at = fetched_at.plus_seconds(ttl);
        Self { variations, ttl, fetched_at, expires_at }
    }

    pub fn from_model(model: &RawAssignments) -> Self {
        let variations = model
            .variations
            .iter()
            .map(|(experiment, name)| (experiment.clone(), Variation::from_name(name.as_deref())))
            .collect();
        Self::new(variations, model.ttl, model.fetched_at)
    }

    pub fn variations(&self) -> &BTreeMap<String, Variation> {
        &self.variations
    }

    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Timestamp::now())
    }

    /// Fresh only while `now` is strictly before `expires_at`.
    pub fn is_stale_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Unknown experiments resolve to `Control`, same as an explicit `Control`.
    pub fn variation_for_experiment(&self, experiment: &str) -> Variation {
        self.variations.get(experiment).cloned().unwrap_or(Variation::Control)
    }
}

impl From<&RawAssignments> for Assignments {
    fn from(model: &RawAssignments) -> Self {
        Self::from_model(model)
    }
}

// Owned conversion moves the names instead of cloning them.
impl From<RawAssignments> for Assignments {
    fn from(model: RawAssignments) -> Self {
        let variations = model
            .variations
            .into_iter()
            .map(|(experiment, name)| (experiment, Variation::from(name)))
            .collect();
        Self::new(variations, model.ttl, model.fetched_at)
    }
}
