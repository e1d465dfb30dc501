use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fx_core::{decode_payload, encode_record, Assignments, Timestamp, Variation};
use fx_storage::Storage;
use fx_storage_sqlite::SqliteStorage;
use tracing::{debug, info, warn};

use crate::{AssignmentsSource, Config, FetchRequest, FileSource};

/// Keeps the cached assignments snapshot and refreshes it from a source.
pub struct ExperimentStore {
    storage: Box<dyn Storage>,
    source: Box<dyn AssignmentsSource>,
    request: FetchRequest,
}

impl ExperimentStore {
    pub fn new(storage: Box<dyn Storage>, source: Box<dyn AssignmentsSource>, request: FetchRequest) -> Self {
        Self { storage, source, request }
    }

    /// Open the on-disk store described by `.fx/fx.toml` under `root`,
    /// writing a default config first if there is none.
    pub fn open(root: &Path) -> Result<Self> {
        let cfg = Self::load_or_init_config(root)?;
        let storage = SqliteStorage::open(&cfg.db_path(root))?;
        let source = FileSource::new(cfg.payload_path(root));
        Ok(Self::new(Box::new(storage), Box::new(source), Self::request_from(&cfg)))
    }

    /// Same as [`ExperimentStore::open`] but reads the payload from `payload`.
    pub fn open_with_payload(root: &Path, payload: PathBuf) -> Result<Self> {
        let cfg = Self::load_or_init_config(root)?;
        let storage = SqliteStorage::open(&cfg.db_path(root))?;
        Ok(Self::new(Box::new(storage), Box::new(FileSource::new(payload)), Self::request_from(&cfg)))
    }

    pub fn init(root: &Path) -> Result<()> {
        let cfg = Self::load_or_init_config(root)?;
        let _ = SqliteStorage::open(&cfg.db_path(root))?;
        Ok(())
    }

    fn load_or_init_config(root: &Path) -> Result<Config> {
        let cfg_path = Config::config_path(root);
        if cfg_path.exists() {
            Config::load_from(&cfg_path)
        } else {
            let cfg = Config::default();
            cfg.save_to(&cfg_path)?;
            Ok(cfg)
        }
    }

    fn request_from(cfg: &Config) -> FetchRequest {
        FetchRequest {
            platform: cfg.client.platform,
            experiment_names: cfg.client.experiment_names.clone(),
            anonymous_id: cfg.client.anonymous_id.clone(),
        }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Fetch, stamp with `now`, persist and return the new snapshot.
    /// On failure the cached snapshot is left as it was.
    pub fn fetch_assignments(&self, now: Timestamp) -> Result<Assignments> {
        let body = match self.source.fetch(&self.request) {
            Ok(body) => body,
            Err(err) => {
                warn!(platform = %self.request.platform, error = %err, "assignments fetch failed");
                return Err(err.context("fetch assignments"));
            }
        };
        let raw = decode_payload(&body, now).context("decode assignments payload")?;
        self.storage.save_assignments(&raw).context("persist assignments")?;
        info!(
            platform = %self.request.platform,
            experiments = raw.variations.len(),
            ttl = raw.ttl,
            "fetched assignments"
        );
        Ok(Assignments::from(raw))
    }

    pub fn get_cached_assignments(&self) -> Result<Option<Assignments>> {
        let raw = self.storage.load_assignments()?;
        Ok(raw.map(Assignments::from))
    }

    pub fn clear_cached_assignments(&self) -> Result<()> {
        self.storage.clear_assignments()
    }

    /// Cached raw record as JSON, including `fetchedAt`, so that feeding it
    /// back through [`ExperimentStore::fetch_assignments`] restores it exactly.
    pub fn export_cached_assignments(&self) -> Result<Option<String>> {
        match self.storage.load_assignments()? {
            Some(raw) => Ok(Some(encode_record(&raw).context("encode assignments")?)),
            None => Ok(None),
        }
    }

    /// Cached snapshot if it is still fresh at `now`, otherwise a new fetch.
    pub fn refresh_if_stale(&self, now: Timestamp) -> Result<Assignments> {
        match self.get_cached_assignments()? {
            Some(cached) if !cached.is_stale_at(now) => {
                debug!(expires_at = cached.expires_at().as_millis(), "using cached assignments");
                Ok(cached)
            }
            Some(_) => {
                info!("cached assignments are stale, refreshing");
                self.fetch_assignments(now)
            }
            None => {
                info!("no cached assignments, fetching");
                self.fetch_assignments(now)
            }
        }
    }

    pub fn variation_for(&self, experiment: &str, now: Timestamp) -> Result<Variation> {
        Ok(self.refresh_if_stale(now)?.variation_for_experiment(experiment))
    }
}
