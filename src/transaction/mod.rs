use crate::common::Result;
use crate::database::Database;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique transaction identity, drawn from a monotonic counter.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new() -> TransactionId {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// The access mode a page is requested with. `ReadWrite` maps to an
/// exclusive page lock, `ReadOnly` to a shared one.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

/// A running transaction. Completion goes through the buffer pool, which
/// flushes or discards the transaction's page images and drops its locks.
#[derive(Debug, Clone, Copy)]
pub struct Transaction {
    id: TransactionId,
}

impl Transaction {
    pub fn new() -> Transaction {
        Transaction {
            id: TransactionId::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Commits: the transaction's dirty pages are forced to disk.
    pub fn commit(&self, db: &Database) -> Result<()> {
        db.buffer_pool().transaction_complete(self.id, true)
    }

    /// Aborts: the transaction's cached page images are discarded.
    pub fn abort(&self, db: &Database) -> Result<()> {
        db.buffer_pool().transaction_complete(self.id, false)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
