use crate::common::constants::{NO_MORE_TUPLES_MSG, OPERATOR_NOT_OPEN_MSG};
use crate::common::{Error, Result};
use crate::execution::operator::{BoxedOp, OpIterator, Tuples};
use crate::storage::tuple::Tuple;
use crate::types::{Column, DataType, Field, Schema};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

/// The aggregate functions the engine computes. `Avg` is integer division
/// of the running sum by the running count.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateOp::Min => write!(f, "MIN"),
            AggregateOp::Max => write!(f, "MAX"),
            AggregateOp::Sum => write!(f, "SUM"),
            AggregateOp::Avg => write!(f, "AVG"),
            AggregateOp::Count => write!(f, "COUNT"),
        }
    }
}

/// Computes one aggregate over one column, optionally bucketed by a single
/// group-by column. `open` drains the child completely; iteration then
/// replays the materialized result, so `rewind` never recomputes.
pub struct Aggregate {
    child: BoxedOp,
    agg_col: usize,
    group_col: Option<usize>,
    op: AggregateOp,
    schema: Schema,
    results: Option<Tuples>,
    cursor: Option<Tuples>,
    next_tuple: Option<Tuple>,
}

impl Aggregate {
    /// Text columns only support `Count`; anything else is refused here,
    /// before any work happens.
    pub fn new(
        child: BoxedOp,
        agg_col: usize,
        group_col: Option<usize>,
        op: AggregateOp,
    ) -> Result<Aggregate> {
        let child_schema = child.schema();
        if agg_col >= child_schema.col_count() {
            return Result::from(Error::NotFound(format!(
                "no aggregate column {agg_col} in {child_schema}"
            )));
        }
        if child_schema.field_type(agg_col) == DataType::Text && op != AggregateOp::Count {
            return Result::from(Error::Unsupported(format!(
                "{op} over the text column {}",
                child_schema.column_name(agg_col)
            )));
        }

        let schema = match group_col {
            Some(group) => {
                if group >= child_schema.col_count() {
                    return Result::from(Error::NotFound(format!(
                        "no group-by column {group} in {child_schema}"
                    )));
                }
                Schema::new(vec![
                    Column::new("group_val", child_schema.field_type(group)),
                    Column::new("aggregate_val", DataType::Int),
                ])?
            }
            None => Schema::new(vec![Column::new("aggregate_val", DataType::Int)])?,
        };

        Ok(Aggregate {
            child,
            agg_col,
            group_col,
            op,
            schema,
            results: None,
            cursor: None,
            next_tuple: None,
        })
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> Result<()> {
        self.child.open()?;

        let group_type = self.group_col.map(|g| self.child.schema().field_type(g));
        let mut aggregator = Aggregator::new(self.op, group_type);
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            let group = self.group_col.map(|g| tuple.field(g)).transpose()?;
            aggregator.merge(group, tuple.field(self.agg_col)?)?;
        }

        let results: Tuples = Box::new(aggregator.into_tuples()?.into_iter().map(Ok));
        self.cursor = Some(dyn_clone::clone_box(&*results));
        self.results = Some(results);
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if self.next_tuple.is_none() {
            let cursor = self
                .cursor
                .as_mut()
                .ok_or_else(|| Error::InvalidInput(OPERATOR_NOT_OPEN_MSG.to_string()))?;
            self.next_tuple = cursor.next().transpose()?;
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
        let results = self
            .results
            .as_ref()
            .ok_or_else(|| Error::InvalidInput(OPERATOR_NOT_OPEN_MSG.to_string()))?;
        self.cursor = Some(dyn_clone::clone_box(&**results));
        self.next_tuple = None;
        Ok(())
    }

    fn close(&mut self) {
        self.results = None;
        self.cursor = None;
        self.next_tuple = None;
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

/// Bucketed accumulators. Buckets are keyed by the stringified group
/// field, which is convenient for hashing but lossy: two distinct fields
/// sharing a string rendering land in the same bucket. Emission reparses
/// the key back into the group column's type.
struct Aggregator {
    op: AggregateOp,
    group_type: Option<DataType>,
    buckets: BTreeMap<String, Accumulator>,
}

impl Aggregator {
    fn new(op: AggregateOp, group_type: Option<DataType>) -> Aggregator {
        Aggregator {
            op,
            group_type,
            buckets: BTreeMap::new(),
        }
    }

    fn merge(&mut self, group: Option<&Field>, value: &Field) -> Result<()> {
        let key = group.map(Field::to_string).unwrap_or_default();
        self.buckets
            .entry(key)
            .or_insert_with(|| Accumulator::new(self.op))
            .add(value)
    }

    /// One `[group, value]` tuple per bucket in key order, or bare
    /// `[value]` tuples when there is no grouping. No input, no output.
    fn into_tuples(self) -> Result<Vec<Tuple>> {
        let group_type = self.group_type;
        self.buckets
            .into_iter()
            .map(|(key, accumulator)| {
                let value = accumulator.value();
                match group_type {
                    Some(data_type) => Ok(Tuple::new(vec![
                        reparse_group_key(&key, data_type)?,
                        value,
                    ])),
                    None => Ok(Tuple::new(vec![value])),
                }
            })
            .try_collect()
    }
}

fn reparse_group_key(key: &str, data_type: DataType) -> Result<Field> {
    match data_type {
        DataType::Int => key
            .parse::<i32>()
            .map(Field::Integer)
            .map_err(|err| Error::InvalidInput(format!("group key {key}: {err}"))),
        DataType::Text => Ok(Field::text(key)),
    }
}

/// Running state of one bucket. An enum keeps the accumulators storable in
/// a plain map without boxed trait objects.
#[derive(Clone, Debug)]
enum Accumulator {
    Min(Option<i32>),
    Max(Option<i32>),
    Sum(i32),
    Avg { sum: i32, count: i32 },
    Count(i32),
}

impl Accumulator {
    fn new(op: AggregateOp) -> Accumulator {
        match op {
            AggregateOp::Min => Accumulator::Min(None),
            AggregateOp::Max => Accumulator::Max(None),
            AggregateOp::Sum => Accumulator::Sum(0),
            AggregateOp::Avg => Accumulator::Avg { sum: 0, count: 0 },
            AggregateOp::Count => Accumulator::Count(0),
        }
    }

    fn add(&mut self, value: &Field) -> Result<()> {
        // Counting never looks at the value, which is what makes COUNT the
        // one aggregate defined over text columns.
        if let Accumulator::Count(count) = self {
            *count += 1;
            return Ok(());
        }
        let v = match value {
            Field::Integer(v) => *v,
            Field::Text(_) => {
                return Result::from(Error::Unsupported(
                    "only COUNT is defined over text columns".to_string(),
                ))
            }
        };
        match self {
            Accumulator::Min(min) => match min {
                Some(current) if *current <= v => {}
                _ => *min = Some(v),
            },
            Accumulator::Max(max) => match max {
                Some(current) if *current >= v => {}
                _ => *max = Some(v),
            },
            Accumulator::Sum(sum) => *sum += v,
            Accumulator::Avg { sum, count } => {
                *sum += v;
                *count += 1;
            }
            Accumulator::Count(_) => {}
        }
        Ok(())
    }

    /// The finished aggregate. A bucket exists only after at least one
    /// `add`, so min/max/avg always have a value to report.
    fn value(&self) -> Field {
        match self {
            Accumulator::Min(min) => Field::Integer(min.unwrap_or(0)),
            Accumulator::Max(max) => Field::Integer(max.unwrap_or(0)),
            Accumulator::Sum(sum) => Field::Integer(*sum),
            Accumulator::Avg { sum, count } => {
                Field::Integer(if *count == 0 { 0 } else { sum / count })
            }
            Accumulator::Count(count) => Field::Integer(*count),
        }
    }
}
