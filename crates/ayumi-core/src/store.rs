use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Episode, EpisodeFilter, EpisodeInput, Stats};
use crate::storage::StorageBackend;

/// The durable slot holding the serialized collection. Existing journals
/// were written under this name; changing it would orphan them.
pub const STORAGE_KEY: &str = "childcare-episodes";

/// Sole owner of the episode collection and sole writer to durable storage.
///
/// The collection is ordered newest-first. It is loaded once at
/// construction; every mutation works against the in-memory copy and writes
/// the full serialized collection back through the storage backend before
/// returning.
///
/// Persist failures are surfaced as errors but never roll back the
/// in-memory change: the caller keeps a working journal and can warn the
/// user that the change may not survive a restart.
pub struct EpisodeStore<S: StorageBackend> {
    storage: S,
    episodes: Vec<Episode>,
}

impl<S: StorageBackend> EpisodeStore<S> {
    /// Open the store, loading the persisted collection.
    ///
    /// Missing or unparsable persisted data falls back to an empty
    /// collection; load failures are logged, never fatal.
    pub fn open(storage: S) -> Self {
        let episodes = match storage.get(STORAGE_KEY) {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(episodes) => episodes,
                Err(e) => {
                    warn!("persisted journal is unreadable, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("failed to load journal, starting empty: {e}");
                Vec::new()
            }
        };

        Self { storage, episodes }
    }

    /// Record a new episode at the head of the collection.
    ///
    /// The store assigns a UUIDv7 id, which stays unique and time-ordered
    /// under rapid successive calls. On a persist failure the episode is still in
    /// the collection (observable through [`query`](Self::query)) and the
    /// error reports that durability was not achieved.
    pub fn add(&mut self, input: EpisodeInput) -> Result<Episode> {
        let episode = input.into_episode(Uuid::now_v7().to_string());
        self.episodes.insert(0, episode.clone());
        self.persist()?;
        Ok(episode)
    }

    /// Return a filtered copy of the collection, newest-first order
    /// preserved. Pure: never touches internal state.
    pub fn query(&self, filter: &EpisodeFilter) -> Vec<Episode> {
        self.episodes
            .iter()
            .filter(|ep| filter.matches(ep))
            .cloned()
            .collect()
    }

    /// The latest `limit` episodes (the home view's "recent" list).
    pub fn recent(&self, limit: usize) -> Vec<Episode> {
        self.episodes.iter().take(limit).cloned().collect()
    }

    /// Remove the episode with the given id; a no-op when absent.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.episodes.len();
        self.episodes.retain(|ep| ep.id != id);
        if self.episodes.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Empty the collection.
    pub fn clear_all(&mut self) -> Result<()> {
        self.episodes.clear();
        self.persist()
    }

    /// Pretty-printed JSON serialization of the full collection, suitable
    /// for writing to a file. Round-trips through [`import`](Self::import).
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.episodes)?)
    }

    /// Replace the collection wholesale from a JSON snapshot.
    ///
    /// Returns `Ok(false)`, leaving the collection untouched, when the
    /// input does not parse or is not an array. Individual records are not
    /// shape-validated: missing fields become empty strings and non-object
    /// elements degrade to empty records. That permissiveness is a
    /// documented limitation, not a bug: a snapshot that was importable
    /// once stays importable.
    pub fn import(&mut self, serialized: &str) -> Result<bool> {
        let values: Vec<serde_json::Value> = match serde_json::from_str(serialized) {
            Ok(values) => values,
            Err(e) => {
                warn!("import rejected: {e}");
                return Ok(false);
            }
        };

        self.episodes = values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap_or_default())
            .collect();
        self.persist()?;
        Ok(true)
    }

    /// Aggregate counts relative to the local wall clock.
    pub fn stats(&self) -> Stats {
        self.stats_at(chrono::Local::now().naive_local())
    }

    /// Aggregate counts relative to an explicit reference instant.
    ///
    /// `this_week` counts episodes whose parsed date falls in the inclusive
    /// window `[now − 7×24h, now]`; episodes with unparsable dates are
    /// excluded from it but still counted in `total`.
    pub fn stats_at(&self, now: NaiveDateTime) -> Stats {
        let week_ago = now - Duration::days(7);
        let this_week = self
            .episodes
            .iter()
            .filter_map(Episode::parsed_date)
            .filter(|date| *date >= week_ago && *date <= now)
            .count();

        Stats {
            total: self.episodes.len(),
            this_week,
        }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Write the full collection through to the durable slot.
    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.episodes)?;
        self.storage.set(STORAGE_KEY, &blob)?;
        debug!(episodes = self.episodes.len(), "journal persisted");
        Ok(())
    }
}
