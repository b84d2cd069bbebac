use crate::common::{Error, Result};
use crate::storage::page::HeapPageId;
use crate::transaction::TransactionId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One logged page update: the page image before and after a transaction's
/// modifications. Framing is a little-endian length prefix followed by the
/// bincode encoding of the record.
#[derive(Debug, Serialize, Deserialize)]
struct UpdateRecord {
    tid: u64,
    table_id: u32,
    page_no: u64,
    before: Vec<u8>,
    after: Vec<u8>,
}

/// Append-only update log. The buffer pool calls [`LogManager::log_write`]
/// followed by [`LogManager::force`] for every dirty page it is about to
/// write, so the log always reaches disk before the data does. Replay and
/// checkpointing are out of scope; this is the write-ahead hook only.
#[derive(Debug)]
pub struct LogManager {
    writer: Mutex<BufWriter<File>>,
    records: AtomicUsize,
    path: PathBuf,
}

impl LogManager {
    pub fn new(path: &Path) -> Result<LogManager> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;
        Ok(LogManager {
            writer: Mutex::new(BufWriter::new(file)),
            records: AtomicUsize::new(0),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an update record for a page the given transaction dirtied.
    /// The caller must still hold the page dirty and must not write the
    /// page until [`LogManager::force`] has returned.
    pub fn log_write(
        &self,
        tid: TransactionId,
        pid: HeapPageId,
        before_image: &[u8],
        after_image: &[u8],
    ) -> Result<()> {
        let record = UpdateRecord {
            tid: tid.id(),
            table_id: pid.table_id(),
            page_no: pid.page_no() as u64,
            before: before_image.to_vec(),
            after: after_image.to_vec(),
        };
        let encoded = bincode::serialize(&record).map_err(|err| Error::Io(err.to_string()))?;

        let mut writer = self.writer.lock().unwrap();
        writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
        writer.write_all(&encoded)?;

        self.records.fetch_add(1, Ordering::SeqCst);
        debug!("logged update of page {pid} by {tid}");
        Ok(())
    }

    /// Makes every appended record durable.
    pub fn force(&self) -> Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Number of update records appended so far.
    pub fn records_written(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }
}
