use crate::common::Result;
use crate::config::config::DEFAULT_POOL_CAPACITY;
use crate::storage::buffer::BufferPool;
use crate::storage::catalog::Catalog;
use crate::storage::log::LogManager;
use std::path::Path;
use std::sync::Arc;

/// The process-wide collaborators (catalog, update log, buffer pool)
/// wired together behind one handle. Callers pass the handle or the
/// individual Arcs explicitly; there is no global instance.
pub struct Database {
    catalog: Arc<Catalog>,
    log: Arc<LogManager>,
    buffer_pool: Arc<BufferPool>,
}

impl Database {
    /// Opens a database whose update log lives at `log_path`, with the
    /// default buffer pool capacity.
    pub fn new(log_path: &Path) -> Result<Database> {
        Self::with_capacity(log_path, DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(log_path: &Path, capacity: usize) -> Result<Database> {
        let catalog = Arc::new(Catalog::new());
        let log = Arc::new(LogManager::new(log_path)?);
        let buffer_pool = Arc::new(BufferPool::new(capacity, &catalog, &log));
        Ok(Database {
            catalog,
            log,
            buffer_pool,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    pub fn log(&self) -> &Arc<LogManager> {
        &self.log
    }
}
