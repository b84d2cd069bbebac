use crate::common::constants::NO_MORE_TUPLES_MSG;
use crate::common::{Error, Result};
use crate::execution::operator::{BoxedOp, OpIterator};
use crate::execution::predicate::Predicate;
use crate::storage::tuple::Tuple;
use crate::types::Schema;

/// Emits the child's tuples that satisfy the predicate.
pub struct Filter {
    predicate: Predicate,
    child: BoxedOp,
    next_tuple: Option<Tuple>,
}

impl Filter {
    pub fn new(predicate: Predicate, child: BoxedOp) -> Filter {
        Filter {
            predicate,
            child,
            next_tuple: None,
        }
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>> {
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            if self.predicate.eval(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> Result<()> {
        self.child.open()
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.next_tuple.is_none() {
            self.next_tuple = self.fetch_next()?;
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
        self.next_tuple = None;
        self.child.rewind()
    }

    fn close(&mut self) {
        self.next_tuple = None;
        self.child.close();
    }

    fn schema(&self) -> &Schema {
        self.child.schema()
    }

    fn children(&self) -> Vec<&BoxedOp> {
        vec![&self.child]
    }

    fn children_mut(&mut self) -> Vec<&mut BoxedOp> {
        vec![&mut self.child]
    }
}
