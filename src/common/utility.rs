use crate::common::Result;
use crate::database::Database;
use crate::storage::disk::HeapFile;
use crate::storage::page::{HeapPage, HeapPageId};
use crate::storage::tuple::Tuple;
use crate::types::{Column, DataType, Field, Schema};
use once_cell::sync::Lazy;
use rand::{random, Rng};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

static TEST_LOGGING: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

/// Installs the test logger once per process. Safe to call from any test.
pub fn init_test_logging() {
    Lazy::force(&TEST_LOGGING);
}

/// A schema of `n` integer columns named `prefix0..prefixN`.
pub fn create_table_schema(n: usize, prefix: &str) -> Schema {
    let columns = (0..n)
        .map(|i| Column::new(&format!("{prefix}{i}"), DataType::Int))
        .collect();
    Schema::new(columns).expect("cannot build a schema with zero columns")
}

/// A tuple of values drawn from a seeded generator, so tests can reproduce
/// their data by fixing the seed.
pub fn create_random_tuple(schema: &Schema, seed_in: Option<u64>) -> Tuple {
    let seed = seed_in.unwrap_or_else(random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let fields = schema
        .columns()
        .iter()
        .map(|column| match column.data_type() {
            DataType::Int => Field::Integer(rng.gen_range(0..10_000)),
            DataType::Text => {
                let len = rng.gen_range(0..24);
                let content: String = (0..len)
                    .map(|_| rng.gen_range(b'a'..=b'z') as char)
                    .collect();
                Field::text(&content)
            }
        })
        .collect();
    Tuple::new(fields)
}

/// `n` distinct seeded tuples.
pub fn create_n_tuples(schema: &Schema, n: usize, seed: u64) -> Vec<Tuple> {
    (0..n)
        .map(|i| create_random_tuple(schema, Some(seed + i as u64)))
        .collect()
}

/// A database whose log and table files live in a fresh temp directory.
/// The directory handle keeps the files alive for the test's duration.
pub fn test_database(capacity: usize) -> (Database, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("unable to create temp dir");
    let db = Database::with_capacity(&dir.path().join("update.log"), capacity)
        .expect("unable to open test database");
    (db, dir)
}

/// Creates a heap file at `<dir>/<name>.dat` pre-filled with the given
/// tuples (written page by page, bypassing the buffer pool) and registers
/// it in the database's catalog. Returns the table id.
pub fn create_heap_table(
    db: &Database,
    dir: &Path,
    name: &str,
    schema: Schema,
    tuples: &[Tuple],
) -> Result<u32> {
    let schema = Arc::new(schema);
    let file = Arc::new(HeapFile::open(
        &dir.join(format!("{name}.dat")),
        Arc::clone(&schema),
    )?);
    let table_id = file.id();

    let mut page_no = 0;
    let mut page = HeapPage::empty(HeapPageId::new(table_id, page_no), Arc::clone(&schema))?;
    for tuple in tuples {
        if page.empty_slot_count() == 0 {
            file.write_page(&page)?;
            page_no += 1;
            page = HeapPage::empty(HeapPageId::new(table_id, page_no), Arc::clone(&schema))?;
        }
        page.insert_tuple(tuple.clone())?;
    }
    if page.used_slot_count() > 0 || page_no == 0 {
        file.write_page(&page)?;
    }

    db.catalog().add_table(file, name, "");
    Ok(table_id)
}
