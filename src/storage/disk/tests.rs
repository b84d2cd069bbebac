use crate::common::{utility, Error};
use crate::config::config::page_size;
use crate::storage::disk::{HeapFile, HeapFileIterator};
use crate::storage::page::{HeapPage, HeapPageId};
use crate::transaction::Transaction;
use crate::types::{DataType, Field, Schema};
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

/// Int plus three text columns: wide tuples, so pages fill after a handful
/// of inserts and growth paths get exercised without huge row counts.
fn wide_schema() -> Schema {
    Schema::from(vec![
        DataType::Int,
        DataType::Text,
        DataType::Text,
        DataType::Text,
    ])
}

#[test]
fn test_table_id_is_stable_across_opens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.dat");
    let schema = Arc::new(utility::create_table_schema(2, "c"));

    let first = HeapFile::open(&path, Arc::clone(&schema)).unwrap();
    let second = HeapFile::open(&path, Arc::clone(&schema)).unwrap();
    assert_eq!(first.id(), second.id());

    let other = HeapFile::open(&dir.path().join("u.dat"), schema).unwrap();
    assert_ne!(first.id(), other.id());
}

#[test]
fn test_write_then_read_page() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(utility::create_table_schema(2, "c"));
    let file = HeapFile::open(&dir.path().join("t.dat"), Arc::clone(&schema)).unwrap();
    assert_eq!(file.num_pages().unwrap(), 0);

    let pid = HeapPageId::new(file.id(), 0);
    let mut page = HeapPage::empty(pid, schema).unwrap();
    page.insert_tuple(utility::create_random_tuple(file.schema(), Some(7)))
        .unwrap();

    file.write_page(&page).unwrap();
    assert_eq!(file.num_pages().unwrap(), 1);

    let reread = file.read_page(pid).unwrap();
    assert_eq!(reread.serialize(), page.serialize());
    assert_eq!(reread.used_slot_count(), 1);
}

#[test]
fn test_read_just_past_end_yields_empty_page() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(utility::create_table_schema(2, "c"));
    let file = HeapFile::open(&dir.path().join("t.dat"), schema).unwrap();

    // Page 0 of a zero-page file is the just-past-end page.
    let page = file.read_page(HeapPageId::new(file.id(), 0)).unwrap();
    assert_eq!(page.used_slot_count(), 0);

    // Page 1 is out of range.
    assert!(matches!(
        file.read_page(HeapPageId::new(file.id(), 1)),
        Err(Error::BadPageNumber(_))
    ));
}

#[test]
fn test_write_past_end_is_rejected() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(utility::create_table_schema(2, "c"));
    let file = HeapFile::open(&dir.path().join("t.dat"), Arc::clone(&schema)).unwrap();

    let page = HeapPage::empty(HeapPageId::new(file.id(), 3), schema).unwrap();
    assert!(matches!(
        file.write_page(&page),
        Err(Error::BadPageNumber(_))
    ));
}

#[test]
fn test_short_read_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.dat");
    let schema = Arc::new(utility::create_table_schema(2, "c"));

    // A truncated page: enough bytes to count as one page, too few to read.
    {
        let mut raw = std::fs::File::create(&path).unwrap();
        raw.write_all(&vec![0u8; page_size() / 2]).unwrap();
    }
    let file = HeapFile::open(&path, schema).unwrap();
    assert_eq!(file.num_pages().unwrap(), 1);
    assert!(matches!(
        file.read_page(HeapPageId::new(file.id(), 0)),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_insert_fills_then_grows() {
    let (db, dir) = utility::test_database(50);
    let schema = wide_schema();
    let table_id = utility::create_heap_table(&db, dir.path(), "t", schema.clone(), &[]).unwrap();
    let file = db.catalog().file(table_id).unwrap();
    assert_eq!(file.num_pages().unwrap(), 1);

    let slots = HeapPage::slots_per_page(&schema);
    let txn = Transaction::new();
    for i in 0..slots + 1 {
        let tuple = crate::storage::tuple::Tuple::new(vec![
            Field::Integer(i as i32),
            Field::text("a"),
            Field::text("b"),
            Field::text("c"),
        ]);
        db.buffer_pool()
            .insert_tuple(txn.id(), table_id, tuple)
            .unwrap();
    }
    txn.commit(&db).unwrap();

    assert_eq!(file.num_pages().unwrap(), 2);
    let first = file.read_page(HeapPageId::new(table_id, 0)).unwrap();
    let second = file.read_page(HeapPageId::new(table_id, 1)).unwrap();
    assert_eq!(first.used_slot_count(), slots);
    assert_eq!(second.used_slot_count(), 1);
}

#[test]
fn test_iterator_walks_every_page_in_order() {
    let (db, dir) = utility::test_database(50);
    let schema = utility::create_table_schema(2, "c");
    let slots = HeapPage::slots_per_page(&schema);

    // Three pages and a bit.
    let tuples = utility::create_n_tuples(&schema, 3 * slots + 5, 42);
    let table_id = utility::create_heap_table(&db, dir.path(), "t", schema, &tuples).unwrap();
    let file = db.catalog().file(table_id).unwrap();
    assert_eq!(file.num_pages().unwrap(), 4);

    let txn = Transaction::new();
    let scanned: Vec<_> = HeapFileIterator::new(&file, db.buffer_pool(), txn.id())
        .collect::<crate::common::Result<_>>()
        .unwrap();
    assert_eq!(scanned, tuples);
    txn.commit(&db).unwrap();
}

#[test]
fn test_iterator_of_empty_table() {
    let (db, dir) = utility::test_database(50);
    let schema = utility::create_table_schema(1, "c");
    let table_id = utility::create_heap_table(&db, dir.path(), "t", schema, &[]).unwrap();
    let file = db.catalog().file(table_id).unwrap();

    let txn = Transaction::new();
    assert_eq!(HeapFileIterator::new(&file, db.buffer_pool(), txn.id()).count(), 0);
    txn.commit(&db).unwrap();
}
