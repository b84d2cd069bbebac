mod aggregate;
mod delete;
mod filter;
mod insert;
mod operator;
mod predicate;
mod seq_scan;


pub use aggregate::{Aggregate, AggregateOp};
pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use operator::{BoxedOp, OpIterator, TupleIterator, Tuples};
pub use predicate::Predicate;
pub use seq_scan::SeqScan;
