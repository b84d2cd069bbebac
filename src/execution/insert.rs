use crate::common::constants::NO_MORE_TUPLES_MSG;
use crate::common::{Error, Result};
use crate::database::Database;
use crate::execution::operator::{BoxedOp, OpIterator};
use crate::storage::buffer::BufferPool;
use crate::storage::tuple::Tuple;
use crate::transaction::TransactionId;
use crate::types::{Column, DataType, Field, Schema};
use std::sync::Arc;

/// One-shot writer: the first `next` drains the child into the table
/// through the buffer pool and emits a single `[count]` tuple; after that
/// the stream is over.
pub struct Insert {
    pool: Arc<BufferPool>,
    tid: TransactionId,
    table_id: u32,
    child: BoxedOp,
    schema: Schema,
    done: bool,
}

impl Insert {
    /// Fails up front when the child's schema does not match the table's.
    pub fn new(
        db: &Database,
        tid: TransactionId,
        child: BoxedOp,
        table_id: u32,
    ) -> Result<Insert> {
        let table_schema = db.catalog().schema(table_id)?;
        if child.schema() != &*table_schema {
            return Result::from(Error::SchemaMismatch(format!(
                "cannot insert {} tuples into a {} table",
                child.schema(),
                table_schema
            )));
        }
        Ok(Insert {
            pool: Arc::clone(db.buffer_pool()),
            tid,
            table_id,
            child,
            schema: count_schema(),
            done: false,
        })
    }
}

/// Both writers emit the same single-column count schema.
pub(crate) fn count_schema() -> Schema {
    Schema::new(vec![Column::new("count", DataType::Int)])
        .expect("the count schema has one column")
}

impl OpIterator for Insert {
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
            self.pool.insert_tuple(self.tid, self.table_id, tuple)?;
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
