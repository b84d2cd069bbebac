use crate::common::constants::{NO_MORE_TUPLES_MSG, OPERATOR_NOT_OPEN_MSG};
use crate::common::{Error, Result};
use crate::database::Database;
use crate::execution::operator::{BoxedOp, OpIterator};
use crate::storage::buffer::BufferPool;
use crate::storage::disk::{HeapFile, HeapFileIterator};
use crate::storage::tuple::Tuple;
use crate::transaction::TransactionId;
use crate::types::Schema;
use std::sync::Arc;

/// Leaf scan: streams every tuple of one table through the buffer pool
/// under the scanning transaction, with shared page locks.
pub struct SeqScan {
    pool: Arc<BufferPool>,
    file: Arc<HeapFile>,
    tid: TransactionId,
    schema: Arc<Schema>,
    iter: Option<HeapFileIterator>,
    next_tuple: Option<Tuple>,
}

impl SeqScan {
    pub fn new(db: &Database, tid: TransactionId, table_id: u32) -> Result<SeqScan> {
        let file = db.catalog().file(table_id)?;
        Ok(SeqScan {
            pool: Arc::clone(db.buffer_pool()),
            schema: Arc::clone(file.schema()),
            file,
            tid,
            iter: None,
            next_tuple: None,
        })
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> Result<()> {
        self.iter = Some(HeapFileIterator::new(&self.file, &self.pool, self.tid));
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.next_tuple.is_none() {
            let iter = self
                .iter
                .as_mut()
                .ok_or_else(|| Error::InvalidInput(OPERATOR_NOT_OPEN_MSG.to_string()))?;
            self.next_tuple = iter.next().transpose()?;
        }
        Ok(self.next_tuple.is_some())
    }

    fn next(&mut self) -> Result<Tuple> {
        if !self.has_next()? {
            return Result::from(Error::NotFound(NO_MORE_TUPLES_MSG.to_string()));
        }
        self.next_tuple
            .take()
            .ok_or_else(|| Error::NotFound(NO_MORE_TUPLES_MSG.to_string()))
    }

    fn rewind(&mut self) -> Result<()> {
        if self.iter.is_none() {
            return Result::from(Error::InvalidInput(OPERATOR_NOT_OPEN_MSG.to_string()));
        }
        self.next_tuple = None;
        self.iter = Some(HeapFileIterator::new(&self.file, &self.pool, self.tid));
        Ok(())
    }

    fn close(&mut self) {
        self.iter = None;
        self.next_tuple = None;
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn children(&self) -> Vec<&BoxedOp> {
        Vec::new()
    }

    fn children_mut(&mut self) -> Vec<&mut BoxedOp> {
        Vec::new()
    }
}
