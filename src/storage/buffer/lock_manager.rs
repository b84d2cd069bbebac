use crate::common::{Error, Result};
use crate::config::config::{LOCK_RETRIES, LOCK_RETRY_WAIT};
use crate::storage::page::HeapPageId;
use crate::transaction::{Permission, TransactionId};
use log::warn;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::thread::sleep;

/// Per-page read/write lock state: any number of readers, or one writer.
#[derive(Debug, Default)]
struct LockEntry {
    readers: HashSet<TransactionId>,
    writer: Option<TransactionId>,
}

impl LockEntry {
    fn is_free(&self) -> bool {
        self.readers.is_empty() && self.writer.is_none()
    }
}

#[derive(Debug, Default)]
struct LockTables {
    page_locks: HashMap<HeapPageId, LockEntry>,
    shared: HashMap<TransactionId, HashSet<HeapPageId>>,
    exclusive: HashMap<TransactionId, HashSet<HeapPageId>>,
}

/// Page-granularity strict two-phase lock manager.
///
/// Shared requests downgrade a held exclusive lock; exclusive requests
/// upgrade a held shared lock once every other reader has left. Waiters
/// retry on a fixed budget and give up with [`Error::Aborted`] instead of
/// building a wait-for graph: the timeout can abort transactions that are
/// merely slow, but it cannot deadlock.
#[derive(Debug, Default)]
pub struct LockManager {
    tables: Mutex<LockTables>,
}

impl LockManager {
    pub fn new() -> LockManager {
        LockManager::default()
    }

    /// Blocks (bounded) until the lock is granted. A transaction already
    /// holding the requested or a stronger mode acquires immediately.
    pub fn acquire(
        &self,
        tid: TransactionId,
        pid: HeapPageId,
        perm: Permission,
    ) -> Result<()> {
        for attempt in 0..LOCK_RETRIES {
            if attempt > 0 {
                sleep(LOCK_RETRY_WAIT);
            }
            let mut tables = self.tables.lock().unwrap();
            if try_acquire(&mut tables, tid, pid, perm) {
                return Ok(());
            }
        }
        warn!("{tid} gave up waiting for {perm:?} on page {pid}");
        Result::from(Error::Aborted)
    }

    /// Drops whatever hold `tid` has on the page.
    pub fn release(&self, tid: TransactionId, pid: HeapPageId) {
        let mut tables = self.tables.lock().unwrap();
        release_one(&mut tables, tid, pid);
    }

    /// Drops every lock the transaction holds.
    pub fn release_all(&self, tid: TransactionId) {
        let mut tables = self.tables.lock().unwrap();
        for pid in held_pages(&tables, tid) {
            release_one(&mut tables, tid, pid);
        }
        tables.shared.remove(&tid);
        tables.exclusive.remove(&tid);
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: HeapPageId) -> bool {
        let tables = self.tables.lock().unwrap();
        tables
            .shared
            .get(&tid)
            .is_some_and(|pages| pages.contains(&pid))
            || tables
                .exclusive
                .get(&tid)
                .is_some_and(|pages| pages.contains(&pid))
    }

    /// Pages the transaction holds shared locks on.
    pub fn shared_pages(&self, tid: TransactionId) -> Vec<HeapPageId> {
        let tables = self.tables.lock().unwrap();
        tables
            .shared
            .get(&tid)
            .map(|pages| pages.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Pages the transaction holds exclusive locks on.
    pub fn exclusive_pages(&self, tid: TransactionId) -> Vec<HeapPageId> {
        let tables = self.tables.lock().unwrap();
        tables
            .exclusive
            .get(&tid)
            .map(|pages| pages.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every page the transaction holds any lock on.
    pub fn held_pages(&self, tid: TransactionId) -> Vec<HeapPageId> {
        let tables = self.tables.lock().unwrap();
        held_pages(&tables, tid)
    }
}

fn held_pages(tables: &LockTables, tid: TransactionId) -> Vec<HeapPageId> {
    let mut pages: HashSet<HeapPageId> = HashSet::new();
    if let Some(shared) = tables.shared.get(&tid) {
        pages.extend(shared);
    }
    if let Some(exclusive) = tables.exclusive.get(&tid) {
        pages.extend(exclusive);
    }
    pages.into_iter().collect()
}

/// One grant attempt under the table mutex. Returns false when a
/// conflicting holder forces the caller to wait.
fn try_acquire(
    tables: &mut LockTables,
    tid: TransactionId,
    pid: HeapPageId,
    perm: Permission,
) -> bool {
    let entry = tables.page_locks.entry(pid).or_default();
    match perm {
        Permission::ReadOnly => {
            if entry.writer == Some(tid) {
                // Downgrade: the writer becomes one of the readers.
                entry.writer = None;
                entry.readers.insert(tid);
                tables.exclusive.entry(tid).or_default().remove(&pid);
                tables.shared.entry(tid).or_default().insert(pid);
                return true;
            }
            if entry.writer.is_some() {
                return false;
            }
            entry.readers.insert(tid);
            tables.shared.entry(tid).or_default().insert(pid);
            true
        }
        Permission::ReadWrite => {
            if entry.writer == Some(tid) {
                return true;
            }
            if entry.writer.is_some() {
                return false;
            }
            if entry.readers.iter().any(|reader| *reader != tid) {
                return false;
            }
            // Upgrade drops the caller's reader slot, if any.
            entry.readers.remove(&tid);
            tables.shared.entry(tid).or_default().remove(&pid);
            entry.writer = Some(tid);
            tables.exclusive.entry(tid).or_default().insert(pid);
            true
        }
    }
}

fn release_one(tables: &mut LockTables, tid: TransactionId, pid: HeapPageId) {
    if let Some(entry) = tables.page_locks.get_mut(&pid) {
        entry.readers.remove(&tid);
        if entry.writer == Some(tid) {
            entry.writer = None;
        }
        if entry.is_free() {
            tables.page_locks.remove(&pid);
        }
    }
    if let Some(pages) = tables.shared.get_mut(&tid) {
        pages.remove(&pid);
    }
    if let Some(pages) = tables.exclusive.get_mut(&tid) {
        pages.remove(&pid);
    }
}
