use crate::common::constants::NO_MORE_TUPLES_MSG;
use crate::common::{Error, Result};
use crate::database::Database;
use crate::execution::insert::count_schema;
use crate::execution::operator::{BoxedOp, OpIterator};
use crate::storage::buffer::BufferPool;
use crate::storage::tuple::Tuple;
use crate::transaction::TransactionId;
use crate::types::{Field, Schema};
use std::sync::Arc;

/// One-shot writer: drains the child, deleting each tuple from the page
/// its record id names, and emits a single `[count]` tuple.
pub struct Delete {
    pool: Arc<BufferPool>,
    tid: TransactionId,
    child: BoxedOp,
    schema: Schema,
    done: bool,
}

impl Delete {
    pub fn new(db: &Database, tid: TransactionId, child: BoxedOp) -> Delete {
        Delete {
            pool: Arc::clone(db.buffer_pool()),
            tid,
            child,
            schema: count_schema(),
            done: false,
        }
    }
}

impl OpIterator for Delete {
    fn open(&mut self) -> Result<()> {
        self.child.open()
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(!self.done)
    }

    fn next(&mut self) -> Result<Tuple> {
        if self.done {
            return Result::from(Error::NotFound(NO_MORE_TUPLES_MSG.to_string()));
        }
        let mut count = 0;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            self.pool.delete_tuple(self.tid, &tuple)?;
            count += 1;
        }
        self.done = true;
        Ok(Tuple::new(vec![Field::Integer(count)]))
    }

    fn rewind(&mut self) -> Result<()> {
        self.done = false;
        self.child.rewind()
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn children(&self) -> Vec<&BoxedOp> {
        vec![&self.child]
    }

    fn children_mut(&mut self) -> Vec<&mut BoxedOp> {
        vec![&mut self.child]
    }
}
