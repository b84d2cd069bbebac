use crate::common::{Error, Result};
use crate::types::field::DataType;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column definition: a name and a type.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: DataType,
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Column {
        Column {
            name: name.to_string(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn length_bytes(&self) -> usize {
        self.data_type.length_bytes()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.data_type)
    }
}

impl From<DataType> for Column {
    fn from(dt: DataType) -> Column {
        Column::new("", dt)
    }
}

/// An ordered tuple schema. Two schemas are equal iff their columns match
/// position-wise on both type and name.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Builds a schema from at least one column.
    pub fn new(columns: Vec<Column>) -> Result<Schema> {
        if columns.is_empty() {
            return Result::from(Error::InvalidInput(
                "a schema needs at least one column".to_string(),
            ));
        }
        Ok(Schema { columns })
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn field_type(&self, index: usize) -> DataType {
        self.columns[index].data_type()
    }

    pub fn column_name(&self, index: usize) -> &str {
        self.columns[index].name()
    }

    /// The slot of the column with the given name, or `NotFound`.
    pub fn field_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column.name() == name)
            .ok_or_else(|| Error::NotFound(format!("no column named {name}")))
    }

    /// Serialized width of one tuple under this schema.
    pub fn size(&self) -> usize {
        self.columns.iter().map(Column::length_bytes).sum()
    }

    /// Concatenates two schemas, left columns first.
    pub fn merge(left: &Schema, right: &Schema) -> Schema {
        let columns = left
            .columns
            .iter()
            .chain(right.columns.iter())
            .cloned()
            .collect();
        Schema { columns }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.columns.iter().join(", "))
    }
}

/// Anonymous columns, mostly for tests and intermediate operator schemas.
impl From<Vec<DataType>> for Schema {
    fn from(types: Vec<DataType>) -> Schema {
        Schema::new(types.into_iter().map(Column::from).collect())
            .expect("cannot build a schema from zero types")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::utility;

    #[test]
    pub fn test_column_declaration() {
        let c1 = Column::new("id", DataType::Int);
        let c2 = Column::new("name", DataType::Text);

        assert_eq!(c1.to_string(), "id:int");
        assert_eq!(c2.to_string(), "name:string");
        assert_eq!(c1.length_bytes(), 4);
        assert_eq!(c2.length_bytes(), crate::config::config::STRING_LEN + 4);
    }

    #[test]
    pub fn test_empty_schema_is_rejected() {
        assert!(Schema::new(Vec::new()).is_err());
    }

    #[test]
    pub fn test_size() {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("name", DataType::Text),
            Column::new("age", DataType::Int),
        ])
        .unwrap();
        assert_eq!(schema.size(), 4 + (crate::config::config::STRING_LEN + 4) + 4);
    }

    #[test]
    pub fn test_field_index() {
        let schema = utility::create_table_schema(3, "col");
        assert_eq!(schema.field_index("col0").unwrap(), 0);
        assert_eq!(schema.field_index("col2").unwrap(), 2);
        assert!(schema.field_index("missing").is_err());
    }

    #[test]
    pub fn test_merge() {
        let left = utility::create_table_schema(1, "l");
        let right = utility::create_table_schema(2, "r");
        let merged = Schema::merge(&left, &right);

        assert_eq!(merged.col_count(), 3);
        assert_eq!(merged.column_name(0), "l0");
        assert_eq!(merged.column_name(1), "r0");
        assert_eq!(merged.column_name(2), "r1");
        assert_eq!(merged.size(), left.size() + right.size());
    }

    #[test]
    pub fn test_equality_is_position_wise() {
        let a = utility::create_table_schema(2, "c");
        let b = utility::create_table_schema(2, "c");
        let c = utility::create_table_schema(2, "other");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let anon1 = Schema::from(vec![DataType::Int, DataType::Text]);
        let anon2 = Schema::from(vec![DataType::Int, DataType::Text]);
        let anon3 = Schema::from(vec![DataType::Text, DataType::Int]);
        assert_eq!(anon1, anon2);
        assert_ne!(anon1, anon3);
    }

    #[test]
    pub fn test_display() {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("name", DataType::Text),
        ])
        .unwrap();
        assert_eq!(schema.to_string(), "(id:int, name:string)");
    }
}
