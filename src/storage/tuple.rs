use crate::common::{Error, Result};
use crate::storage::page::RecordId;
use crate::types::{Field, Schema};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of field values, optionally pinned to the page slot it lives in.
/// Equality and hashing consider the fields only; two tuples with the same
/// values are the same tuple as far as value-based deletion is concerned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tuple {
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Tuple {
        Tuple {
            fields,
            record_id: None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Result<&Field> {
        self.fields
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("tuple has no field {index}")))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Replaces a field value. The replacement must keep the field's type.
    pub fn set_field(&mut self, index: usize, value: Field) -> Result<()> {
        let slot = self
            .fields
            .get_mut(index)
            .ok_or_else(|| Error::NotFound(format!("tuple has no field {index}")))?;
        if slot.get_type() != value.get_type() {
            return Result::from(Error::SchemaMismatch(format!(
                "cannot store a {} value in a {} field",
                value.get_type(),
                slot.get_type()
            )));
        }
        *slot = value;
        Ok(())
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref()
    }

    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.record_id = rid;
    }

    /// True when the tuple's arity and field types line up with the schema.
    pub fn matches_schema(&self, schema: &Schema) -> bool {
        self.fields.len() == schema.col_count()
            && self
                .fields
                .iter()
                .zip(schema.columns())
                .all(|(field, column)| field.get_type() == column.data_type())
    }

    /// Concatenates the fixed-width field encodings in schema order.
    pub fn serialize(&self, schema: &Schema) -> Result<Vec<u8>> {
        if !self.matches_schema(schema) {
            return Result::from(Error::SchemaMismatch(format!(
                "tuple {self} does not fit schema {schema}"
            )));
        }
        let mut data = Vec::with_capacity(schema.size());
        for field in &self.fields {
            data.extend_from_slice(&field.serialize());
        }
        Ok(data)
    }

    /// Decodes one tuple's worth of bytes under the given schema.
    pub fn deserialize(data: &[u8], schema: &Schema) -> Result<Tuple> {
        if data.len() < schema.size() {
            return Result::from(Error::InvalidInput(format!(
                "{} bytes cannot hold a tuple of schema {}",
                data.len(),
                schema
            )));
        }
        let mut fields = Vec::with_capacity(schema.col_count());
        let mut cursor = 0;
        for column in schema.columns() {
            let width = column.length_bytes();
            fields.push(Field::deserialize(&data[cursor..cursor + width], column.data_type())?);
            cursor += width;
        }
        Ok(Tuple::new(fields))
    }
}

impl From<Vec<Field>> for Tuple {
    fn from(fields: Vec<Field>) -> Tuple {
        Tuple::new(fields)
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Tuple {}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType};

    fn id_name_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("name", DataType::Text),
        ])
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let schema = id_name_schema();
        let tuple = Tuple::new(vec![Field::Integer(7), Field::text("seven")]);

        let data = tuple.serialize(&schema).unwrap();
        assert_eq!(data.len(), schema.size());

        let back = Tuple::deserialize(&data, &schema).unwrap();
        assert_eq!(tuple, back);
    }

    #[test]
    fn test_serialize_checks_schema() {
        let schema = id_name_schema();
        let wrong_arity = Tuple::new(vec![Field::Integer(1)]);
        let wrong_type = Tuple::new(vec![Field::text("1"), Field::text("one")]);

        assert!(matches!(
            wrong_arity.serialize(&schema),
            Err(Error::SchemaMismatch(_))
        ));
        assert!(matches!(
            wrong_type.serialize(&schema),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_set_field_preserves_type() {
        let mut tuple = Tuple::new(vec![Field::Integer(1), Field::text("one")]);

        tuple.set_field(0, Field::Integer(2)).unwrap();
        assert_eq!(tuple.field(0).unwrap(), &Field::Integer(2));

        assert!(matches!(
            tuple.set_field(0, Field::text("two")),
            Err(Error::SchemaMismatch(_))
        ));
        assert!(tuple.set_field(5, Field::Integer(0)).is_err());
    }

    #[test]
    fn test_equality_ignores_record_id() {
        let mut a = Tuple::new(vec![Field::Integer(3)]);
        let b = Tuple::new(vec![Field::Integer(3)]);

        a.set_record_id(Some(RecordId::new(
            crate::storage::page::HeapPageId::new(1, 0),
            4,
        )));
        assert_eq!(a, b);
    }
}
