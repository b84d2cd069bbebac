mod loader;

pub use loader::load_schema;

use crate::common::constants::{NO_TABLE_FOR_ID_MSG, NO_TABLE_FOR_NAME_MSG};
use crate::common::{Error, Result};
use crate::storage::disk::HeapFile;
use crate::types::Schema;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct CatalogEntry {
    file: Arc<HeapFile>,
    name: String,
    primary_key: String,
}

/// Registry of the tables the database knows about. Table names need not be
/// unique; a name lookup resolves to the most recently added table of that
/// name, while table ids stay live for every registered file.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<u32, CatalogEntry>>,
    names: RwLock<HashMap<String, u32>>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    /// Registers a table under its file's id. Re-adding a name points the
    /// name at the new table.
    pub fn add_table(&self, file: Arc<HeapFile>, name: &str, primary_key: &str) {
        let table_id = file.id();
        self.names
            .write()
            .unwrap()
            .insert(name.to_string(), table_id);
        self.tables.write().unwrap().insert(
            table_id,
            CatalogEntry {
                file,
                name: name.to_string(),
                primary_key: primary_key.to_string(),
            },
        );
    }

    pub fn file(&self, table_id: u32) -> Result<Arc<HeapFile>> {
        self.entry(table_id).map(|entry| entry.file)
    }

    pub fn schema(&self, table_id: u32) -> Result<Arc<Schema>> {
        self.entry(table_id)
            .map(|entry| Arc::clone(entry.file.schema()))
    }

    pub fn table_name(&self, table_id: u32) -> Result<String> {
        self.entry(table_id).map(|entry| entry.name)
    }

    pub fn primary_key(&self, table_id: u32) -> Result<String> {
        self.entry(table_id).map(|entry| entry.primary_key)
    }

    /// Resolves a table name to an id; the last table added under the name
    /// wins.
    pub fn table_id(&self, name: &str) -> Result<u32> {
        self.names
            .read()
            .unwrap()
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("{NO_TABLE_FOR_NAME_MSG}: {name}")))
    }

    /// Ids of every registered table, in no particular order.
    pub fn table_ids(&self) -> Vec<u32> {
        self.tables.read().unwrap().keys().copied().collect()
    }

    pub fn clear(&self) {
        self.tables.write().unwrap().clear();
        self.names.write().unwrap().clear();
    }

    fn entry(&self, table_id: u32) -> Result<CatalogEntry> {
        self.tables
            .read()
            .unwrap()
            .get(&table_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{NO_TABLE_FOR_ID_MSG}: {table_id}")))
    }
}
