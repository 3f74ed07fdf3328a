use product_pricing::{
    CatalogError, CatalogResult, FileRateSource, RateSource, RateTable, RateTableCache,
    RawMaterialRate, save_rates_to_json,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

struct CountingSource {
    loads: Arc<AtomicUsize>,
    fail_first: bool,
}

impl RateSource for CountingSource {
    fn load_rates(&self) -> CatalogResult<RateTable> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && attempt == 0 {
            return Err(CatalogError::InvalidData("rate service unavailable".into()));
        }
        Ok(RateTable::new(vec![RawMaterialRate::new("copper", 760.0)]))
    }

    fn describe(&self) -> String {
        "counting source".into()
    }
}

#[test]
fn source_is_read_once_per_session() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = RateTableCache::new(CountingSource {
        loads: Arc::clone(&loads),
        fail_first: false,
    });
    assert!(!cache.is_loaded());

    let first = cache.get_or_load().unwrap();
    let second = cache.get_or_load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.rate_or_zero("copper"), 760.0);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(cache.is_loaded());
}

#[test]
fn failed_load_is_retried() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = RateTableCache::new(CountingSource {
        loads: Arc::clone(&loads),
        fail_first: true,
    });

    assert!(cache.get_or_load().is_err());
    assert!(!cache.is_loaded());
    assert_eq!(cache.get_or_load().unwrap().len(), 1);
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn replace_swaps_the_snapshot_without_reading_the_source() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = RateTableCache::new(CountingSource {
        loads: Arc::clone(&loads),
        fail_first: false,
    });

    cache.replace(RateTable::new(vec![RawMaterialRate::new("copper", 800.0)]));
    assert_eq!(cache.get_or_load().unwrap().rate_or_zero("copper"), 800.0);
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn preloaded_cache_never_reads_the_source() {
    let loads = Arc::new(AtomicUsize::new(0));
    let cache = RateTableCache::preloaded(
        CountingSource {
            loads: Arc::clone(&loads),
            fail_first: false,
        },
        RateTable::default(),
    );
    assert!(cache.get_or_load().unwrap().is_empty());
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn file_source_reads_rate_documents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RawMaterialRates.json");
    let table = RateTable::new(vec![
        RawMaterialRate::new("copper", 760.0),
        RawMaterialRate::new("pvc", "110"),
    ]);
    save_rates_to_json(&table, &path).unwrap();

    let source = FileRateSource::new(&path);
    assert_eq!(source.path(), path.as_path());
    assert!(source.describe().ends_with("RawMaterialRates.json"));

    let cache = RateTableCache::new(source);
    let loaded = cache.get_or_load().unwrap();
    assert_eq!(loaded.rate_or_zero("pvc"), 110.0);

    let missing = RateTableCache::new(FileRateSource::new(dir.path().join("absent.json")));
    assert!(matches!(missing.get_or_load(), Err(CatalogError::Io(_))));
}
