use crate::common::constants::SHORT_READ_MSG;
use crate::common::{Error, Result};
use crate::config::config::page_size;
use crate::storage::buffer::BufferPool;
use crate::storage::page::{HeapPage, HeapPageId, PageHandle};
use crate::storage::tuple::Tuple;
use crate::transaction::{Permission, TransactionId};
use crate::types::Schema;
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One table's backing file, viewed as a 0-indexed array of fixed-size
/// pages. All tuple-level operations go through the buffer pool so they
/// run under page locks; only `read_page`/`write_page` touch the file.
#[derive(Debug)]
pub struct HeapFile {
    file: Mutex<File>,
    path: PathBuf,
    table_id: u32,
    schema: Arc<Schema>,
}

impl HeapFile {
    /// Opens (creating if needed) the heap file at `path`. The table id is
    /// a stable hash of the absolute path, so reopening the same file
    /// yields the same id.
    pub fn open(path: &Path, schema: Arc<Schema>) -> Result<HeapFile> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let path = path.canonicalize()?;
        let table_id = stable_table_id(&path);

        Ok(HeapFile {
            file: Mutex::new(file),
            path,
            table_id,
            schema,
        })
    }

    pub fn id(&self) -> u32 {
        self.table_id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages currently in the file, rounding a trailing partial page up.
    pub fn num_pages(&self) -> Result<usize> {
        let len = self.file.lock().unwrap().metadata()?.len() as usize;
        Ok((len + page_size() - 1) / page_size())
    }

    /// Reads one page image from disk. Reading the page just past the end
    /// of the file yields an empty page; that is how the file grows through
    /// the buffer pool during inserts. Anything further out is an error.
    pub fn read_page(&self, pid: HeapPageId) -> Result<HeapPage> {
        let num_pages = self.num_pages()?;
        if pid.page_no() > num_pages {
            return Result::from(Error::BadPageNumber(format!(
                "page {} of {} in table {}",
                pid.page_no(),
                num_pages,
                self.table_id
            )));
        }
        if pid.page_no() == num_pages {
            debug!("materializing empty page {pid} past the end of {:?}", self.path);
            return HeapPage::empty(pid, Arc::clone(&self.schema));
        }

        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start((pid.page_no() * page_size()) as u64))?;
        let mut data = vec![0; page_size()];
        file.read_exact(&mut data)
            .map_err(|err| Error::Io(format!("{SHORT_READ_MSG} {pid}: {err}")))?;
        HeapPage::new(pid, &data, Arc::clone(&self.schema))
    }

    /// Writes one whole page at its offset, extending the file when the
    /// page is the first one past the current end.
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        let pid = page.id();
        if pid.page_no() > self.num_pages()? {
            return Result::from(Error::BadPageNumber(format!(
                "cannot write page {} beyond the end of table {}",
                pid.page_no(),
                self.table_id
            )));
        }

        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start((pid.page_no() * page_size()) as u64))?;
        file.write_all(&page.serialize())?;
        file.flush()?;
        Ok(())
    }

    /// Finds a page with a free slot, trying every existing page under an
    /// exclusive lock and growing the file by one page when all are full.
    /// Returns the pages dirtied by the insert.
    pub fn insert_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: Tuple,
    ) -> Result<Vec<PageHandle>> {
        let num_pages = self.num_pages()?;
        for page_no in 0..num_pages {
            let pid = HeapPageId::new(self.table_id, page_no);
            let handle = pool.get_page(tid, pid, Permission::ReadWrite)?;
            let result = handle.write().unwrap().insert_tuple(tuple.clone());
            match result {
                Ok(_) => return Ok(vec![handle]),
                Err(Error::PageFull) => continue,
                Err(err) => return Err(err),
            }
        }

        // Every existing page is full; claim the page past the end.
        let pid = HeapPageId::new(self.table_id, num_pages);
        debug!("growing table {} to page {}", self.table_id, num_pages);
        let handle = pool.get_page(tid, pid, Permission::ReadWrite)?;
        handle.write().unwrap().insert_tuple(tuple)?;
        Ok(vec![handle])
    }

    /// Deletes the tuple from the page its record id names, under an
    /// exclusive lock. Returns the dirtied page.
    pub fn delete_tuple(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        tuple: &Tuple,
    ) -> Result<PageHandle> {
        let rid = tuple
            .record_id()
            .ok_or_else(|| Error::NotFound(format!("tuple {tuple} has no record id")))?;
        let handle = pool.get_page(tid, rid.page_id(), Permission::ReadWrite)?;
        handle.write().unwrap().delete_tuple(tuple)?;
        Ok(handle)
    }
}

/// Pull-based tuple iterator over a heap file. Page contents are drained
/// page-at-a-time through the buffer pool, so each page is requested with
/// `ReadOnly` exactly once per pass.
pub struct HeapFileIterator {
    file: Arc<HeapFile>,
    pool: Arc<BufferPool>,
    tid: TransactionId,
    next_page_no: usize,
    current: VecDeque<Tuple>,
    failed: bool,
}

impl HeapFileIterator {
    /// A lazy scan of every tuple in the file under shared page locks. The
    /// next page is only fetched once the current one is exhausted.
    pub fn new(
        file: &Arc<HeapFile>,
        pool: &Arc<BufferPool>,
        tid: TransactionId,
    ) -> HeapFileIterator {
        HeapFileIterator {
            file: Arc::clone(file),
            pool: Arc::clone(pool),
            tid,
            next_page_no: 0,
            current: VecDeque::new(),
            failed: false,
        }
    }
}

impl Iterator for HeapFileIterator {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while self.current.is_empty() {
            let num_pages = match self.file.num_pages() {
                Ok(n) => n,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            if self.next_page_no >= num_pages {
                return None;
            }
            let pid = HeapPageId::new(self.file.id(), self.next_page_no);
            self.next_page_no += 1;
            match self.pool.get_page(self.tid, pid, Permission::ReadOnly) {
                Ok(handle) => {
                    let page = handle.read().unwrap();
                    self.current.extend(page.iter().cloned());
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
        self.current.pop_front().map(Ok)
    }
}

/// Hashes the canonical path with the standard deterministic hasher; the
/// result identifies the table across runs of the same process image.
fn stable_table_id(path: &Path) -> u32 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let hash = hasher.finish();
    (hash ^ (hash >> 32)) as u32
}
