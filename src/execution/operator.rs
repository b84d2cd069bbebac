use crate::common::Result;
use crate::storage::tuple::Tuple;
use crate::types::Schema;
use dyn_clone::DynClone;

/// A boxed operator in a query tree.
pub type BoxedOp = Box<dyn OpIterator>;

/// A cloneable stream of tuples. Cloning is what lets an operator rewind a
/// fully materialized result without recomputing it. Blanket-implemented
/// for every matching iterator.
pub trait TupleIterator: Iterator<Item = Result<Tuple>> + DynClone {}
impl<I: Iterator<Item = Result<Tuple>> + DynClone> TupleIterator for I {}
dyn_clone::clone_trait_object!(TupleIterator);

/// A boxed cloneable tuple stream.
pub type Tuples = Box<dyn TupleIterator>;

/// The pull-based operator protocol. Trees are built leaves-up and opened
/// root-down: `open` must be called before `has_next`/`next`, `rewind`
/// restarts an open operator from the top, and after `close` only `open`
/// is meaningful again.
///
/// `has_next` is idempotent: operators fetch ahead one tuple and park it
/// until `next` hands it off.
pub trait OpIterator {
    fn open(&mut self) -> Result<()>;

    fn has_next(&mut self) -> Result<bool>;

    /// The next tuple. Calling past the end of the stream is an error;
    /// check `has_next` first.
    fn next(&mut self) -> Result<Tuple>;

    fn rewind(&mut self) -> Result<()>;

    fn close(&mut self);

    /// Schema of the tuples this operator emits.
    fn schema(&self) -> &Schema;

    /// Child operators, leaf-less for scans. The mutable accessor hands
    /// out the boxes themselves so a planner can splice subtrees.
    fn children(&self) -> Vec<&BoxedOp>;

    fn children_mut(&mut self) -> Vec<&mut BoxedOp>;
}
