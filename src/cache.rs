use crate::material::RateTable;
use crate::persistence::{CatalogResult, load_rates};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Somewhere a rate table can be fetched from.
pub trait RateSource: Send + Sync {
    fn load_rates(&self) -> CatalogResult<RateTable>;
    fn describe(&self) -> String;
}

/// Rate table stored on disk as JSON or CSV (chosen by extension).
#[derive(Debug, Clone)]
pub struct FileRateSource {
    path: PathBuf,
}

impl FileRateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RateSource for FileRateSource {
    fn load_rates(&self) -> CatalogResult<RateTable> {
        load_rates(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone)]
enum CacheState {
    NotLoaded,
    Loaded(Arc<RateTable>),
}

/// Holds the rate table for the lifetime of a session.
///
/// The source is read at most once; later calls reuse the loaded snapshot
/// until it is explicitly replaced. A failed load leaves the cache empty so
/// the next call retries.
pub struct RateTableCache {
    source: Box<dyn RateSource>,
    state: Mutex<CacheState>,
}

impl RateTableCache {
    pub fn new(source: impl RateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            state: Mutex::new(CacheState::NotLoaded),
        }
    }

    /// Cache that starts out loaded with `table`.
    pub fn preloaded(source: impl RateSource + 'static, table: RateTable) -> Self {
        Self {
            source: Box::new(source),
            state: Mutex::new(CacheState::Loaded(Arc::new(table))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.lock(), CacheState::Loaded(_))
    }

    pub fn get_or_load(&self) -> CatalogResult<Arc<RateTable>> {
        let mut state = self.state.lock();
        if let CacheState::Loaded(table) = &*state {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(self.source.load_rates()?);
        info!(source = %self.source.describe(), count = table.len(), "rate table cached");
        *state = CacheState::Loaded(Arc::clone(&table));
        Ok(table)
    }

    /// Swaps in a table loaded elsewhere (e.g. an operator-chosen file).
    pub fn replace(&self, table: RateTable) -> Arc<RateTable> {
        let table = Arc::new(table);
        *self.state.lock() = CacheState::Loaded(Arc::clone(&table));
        table
    }
}
