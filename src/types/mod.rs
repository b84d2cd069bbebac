pub mod field;
pub mod schema;

pub use field::{CompareOp, DataType, Field};
pub use schema::{Column, Schema};
