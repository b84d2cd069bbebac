use crate::common::{Error, Result};
use crate::storage::buffer::LockManager;
use crate::storage::catalog::Catalog;
use crate::storage::log::LogManager;
use crate::storage::page::{HeapPageId, PageHandle};
use crate::storage::tuple::Tuple;
use crate::transaction::{Permission, TransactionId};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Bounded in-memory page cache with page-level locking.
///
/// Every page access runs through [`BufferPool::get_page`], which acquires
/// the page lock for the requesting transaction before the page is read or
/// returned. The pool is NO-STEAL (dirty pages are never evicted) and
/// FORCE (a committing transaction's dirty pages are flushed), which is
/// what lets abort recover by simply rereading pages from disk.
pub struct BufferPool {
    capacity: usize,
    pages: RwLock<HashMap<HeapPageId, PageHandle>>,
    lock_manager: LockManager,
    catalog: Arc<Catalog>,
    log: Arc<LogManager>,
    // Serializes eviction and the flush family against each other.
    flush_lock: Mutex<()>,
}

impl BufferPool {
    pub fn new(capacity: usize, catalog: &Arc<Catalog>, log: &Arc<LogManager>) -> BufferPool {
        BufferPool {
            capacity,
            pages: RwLock::new(HashMap::new()),
            lock_manager: LockManager::new(),
            catalog: Arc::clone(catalog),
            log: Arc::clone(log),
            flush_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cached_pages(&self) -> usize {
        self.pages.read().unwrap().len()
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: HeapPageId) -> bool {
        self.lock_manager.holds_lock(tid, pid)
    }

    /// Fetches a page under the requested permission, blocking (bounded) on
    /// the page lock and reading through to disk on a cache miss. Fails
    /// with [`Error::Aborted`] when the lock cannot be had within the retry
    /// budget, and with [`Error::CacheFull`] when a miss finds every cached
    /// page dirty.
    pub fn get_page(
        &self,
        tid: TransactionId,
        pid: HeapPageId,
        perm: Permission,
    ) -> Result<PageHandle> {
        self.lock_manager.acquire(tid, pid, perm)?;

        if let Some(handle) = self.pages.read().unwrap().get(&pid) {
            return Ok(Arc::clone(handle));
        }

        // Miss: eviction and insertion run under the flush lock so nobody
        // flushes or discards the page out from under us.
        let _flush = self.flush_lock.lock().unwrap();
        let mut pages = self.pages.write().unwrap();
        if let Some(handle) = pages.get(&pid) {
            return Ok(Arc::clone(handle));
        }
        if pages.len() >= self.capacity {
            Self::evict_page(&mut pages)?;
        }

        let file = self.catalog.file(pid.table_id())?;
        let page = file.read_page(pid)?;
        let handle = Arc::new(RwLock::new(page));
        pages.insert(pid, Arc::clone(&handle));
        debug!("page {pid} read into the buffer pool for {tid}");
        Ok(handle)
    }

    /// Evicts the first clean page found. Flushing a clean page is a no-op,
    /// so eviction never writes; a cache full of dirty pages cannot evict
    /// at all (NO-STEAL).
    fn evict_page(pages: &mut HashMap<HeapPageId, PageHandle>) -> Result<()> {
        let victim = pages
            .iter()
            .find(|(_, handle)| handle.read().unwrap().dirtied_by().is_none())
            .map(|(pid, _)| *pid);
        match victim {
            Some(pid) => {
                pages.remove(&pid);
                debug!("evicted clean page {pid}");
                Ok(())
            }
            None => Result::from(Error::CacheFull),
        }
    }

    /// Inserts the tuple into the named table on behalf of `tid`. The
    /// table's heap file reacquires every page it probes with `ReadWrite`
    /// through this pool; each page it returns is marked dirty and put
    /// (back) into the cache, covering pages grown past the old end of the
    /// file.
    pub fn insert_tuple(&self, tid: TransactionId, table_id: u32, tuple: Tuple) -> Result<()> {
        let file = self.catalog.file(table_id)?;
        let dirtied = file.insert_tuple(self, tid, tuple)?;
        self.admit_dirty(tid, dirtied);
        Ok(())
    }

    /// Deletes the tuple from the page its record id names.
    pub fn delete_tuple(&self, tid: TransactionId, tuple: &Tuple) -> Result<()> {
        let rid = tuple
            .record_id()
            .ok_or_else(|| Error::NotFound(format!("tuple {tuple} has no record id")))?;
        let file = self.catalog.file(rid.page_id().table_id())?;
        let dirtied = file.delete_tuple(self, tid, tuple)?;
        self.admit_dirty(tid, vec![dirtied]);
        Ok(())
    }

    fn admit_dirty(&self, tid: TransactionId, dirtied: Vec<PageHandle>) {
        let mut pages = self.pages.write().unwrap();
        for handle in dirtied {
            let pid = {
                let mut page = handle.write().unwrap();
                page.mark_dirty(true, tid);
                page.id()
            };
            pages.insert(pid, handle);
        }
    }

    /// Finishes a transaction.
    ///
    /// Commit forces every exclusively held page to disk (logging first)
    /// and re-baselines its before-image. Abort reloads every page the
    /// transaction held from disk, including shared holds, which may be
    /// downgraded leftovers of an exclusive lock. Either way all of the
    /// transaction's locks are released.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        if commit {
            self.flush_pages(tid)?;
        } else {
            self.reload_pages(tid)?;
        }
        self.lock_manager.release_all(tid);
        debug!("{tid} complete, commit={commit}");
        Ok(())
    }

    fn reload_pages(&self, tid: TransactionId) -> Result<()> {
        let _flush = self.flush_lock.lock().unwrap();
        let pages = self.pages.read().unwrap();
        for pid in self.lock_manager.held_pages(tid) {
            if let Some(handle) = pages.get(&pid) {
                let file = self.catalog.file(pid.table_id())?;
                let fresh = file.read_page(pid)?;
                *handle.write().unwrap() = fresh;
            }
        }
        Ok(())
    }

    /// Flushes every page in the transaction's exclusive set, then
    /// snapshots each flushed image as the page's new before-image.
    pub fn flush_pages(&self, tid: TransactionId) -> Result<()> {
        let _flush = self.flush_lock.lock().unwrap();
        // Ascending page order, so pages grown past the old end of a file
        // extend it one page at a time.
        let mut pids = self.lock_manager.exclusive_pages(tid);
        pids.sort();
        for pid in pids {
            self.flush_page_locked(pid)?;
            if let Some(handle) = self.pages.read().unwrap().get(&pid) {
                handle.write().unwrap().set_before_image();
            }
        }
        Ok(())
    }

    /// Flushes one page if it is cached and dirty; clean and absent pages
    /// are no-ops.
    pub fn flush_page(&self, pid: HeapPageId) -> Result<()> {
        let _flush = self.flush_lock.lock().unwrap();
        self.flush_page_locked(pid)
    }

    /// Flushes every cached dirty page.
    pub fn flush_all_pages(&self) -> Result<()> {
        let _flush = self.flush_lock.lock().unwrap();
        let mut pids: Vec<HeapPageId> = self.pages.read().unwrap().keys().copied().collect();
        pids.sort();
        for pid in pids {
            self.flush_page_locked(pid)?;
        }
        Ok(())
    }

    /// Drops a page from the cache without flushing it.
    pub fn discard_page(&self, pid: HeapPageId) {
        let _flush = self.flush_lock.lock().unwrap();
        self.pages.write().unwrap().remove(&pid);
    }

    // The log hook runs here: the update record is appended and forced
    // while the page is still dirty, strictly before the data write.
    fn flush_page_locked(&self, pid: HeapPageId) -> Result<()> {
        let handle = match self.pages.read().unwrap().get(&pid) {
            Some(handle) => Arc::clone(handle),
            None => return Ok(()),
        };
        let mut page = handle.write().unwrap();
        let tid = match page.dirtied_by() {
            Some(tid) => tid,
            None => return Ok(()),
        };

        let after_image = page.serialize();
        self.log
            .log_write(tid, pid, page.before_image_data(), &after_image)?;
        self.log.force()?;

        let file = self.catalog.file(pid.table_id())?;
        file.write_page(&page)?;
        page.mark_dirty(false, tid);
        debug!("flushed page {pid} dirtied by {tid}");
        Ok(())
    }
}
