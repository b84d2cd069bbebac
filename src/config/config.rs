use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Default size of a heap page in bytes. The live value is read through
/// [`page_size`] so tests can shrink pages without touching disk formats
/// used elsewhere in the same process run.
pub const HEAPDB_PAGE_SIZE_BYTES: usize = 4096;

/// Upper bound on the number of pages the buffer pool caches.
pub const DEFAULT_POOL_CAPACITY: usize = 50;

/// Serialized width of a text field's content in bytes. Text fields carry a
/// 4-byte length prefix in front of this, so the on-disk width of a text
/// column is `STRING_LEN + 4`.
pub const STRING_LEN: usize = 128;

/// Number of times a lock acquisition is retried before the requesting
/// transaction is told to abort.
pub const LOCK_RETRIES: usize = 10;

/// Sleep between lock acquisition retries.
pub const LOCK_RETRY_WAIT: Duration = Duration::from_millis(10);

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(HEAPDB_PAGE_SIZE_BYTES);

/// The page size every heap page and heap file in this process uses.
pub fn page_size() -> usize {
    PAGE_SIZE.load(Ordering::Relaxed)
}

/// Overrides the process-wide page size. Only for tests; pages and files
/// created under a different page size become unreadable.
pub fn set_page_size_for_test(bytes: usize) {
    PAGE_SIZE.store(bytes, Ordering::Relaxed);
}

/// Restores the default page size after a test override.
pub fn reset_page_size() {
    PAGE_SIZE.store(HEAPDB_PAGE_SIZE_BYTES, Ordering::Relaxed);
}

/// Buffer pool capacity, overridable through the `HEAPDB_POOL_CAPACITY`
/// environment variable (read via the `config` crate's environment source).
pub fn pool_capacity_from_env() -> usize {
    ::config::Config::builder()
        .add_source(::config::Environment::with_prefix("HEAPDB"))
        .build()
        .ok()
        .and_then(|settings| settings.get_int("pool_capacity").ok())
        .map(|capacity| capacity as usize)
        .unwrap_or(DEFAULT_POOL_CAPACITY)
}
