use crate::common::Result;
use crate::storage::tuple::Tuple;
use crate::types::{CompareOp, Field};
use std::fmt;

/// Compares one tuple column against a literal operand.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    column: usize,
    op: CompareOp,
    operand: Field,
}

impl Predicate {
    pub fn new(column: usize, op: CompareOp, operand: Field) -> Predicate {
        Predicate {
            column,
            op,
            operand,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn operand(&self) -> &Field {
        &self.operand
    }

    /// True when the tuple's column satisfies `column op operand`.
    pub fn eval(&self, tuple: &Tuple) -> Result<bool> {
        tuple.field(self.column)?.compare(self.op, &self.operand)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col{} {} {}", self.column, self.op, self.operand)
    }
}
