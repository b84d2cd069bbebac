use crate::common::Error;
use crate::config::config::page_size;
use crate::storage::page::{HeapPage, HeapPageId};
use crate::storage::tuple::Tuple;
use crate::types::{DataType, Field, Schema};
use std::sync::Arc;

fn two_int_schema() -> Arc<Schema> {
    Arc::new(Schema::from(vec![DataType::Int, DataType::Int]))
}

fn empty_page(schema: &Arc<Schema>) -> HeapPage {
    HeapPage::empty(HeapPageId::new(1, 0), Arc::clone(schema)).unwrap()
}

fn int_tuple(a: i32, b: i32) -> Tuple {
    Tuple::new(vec![Field::Integer(a), Field::Integer(b)])
}

#[test]
fn test_slot_geometry() {
    let schema = two_int_schema();
    // Each slot costs 8 tuple bytes plus one header bit.
    let expected_slots = (page_size() * 8) / (8 * 8 + 1);
    assert_eq!(HeapPage::slots_per_page(&schema), expected_slots);
    assert_eq!(HeapPage::header_size(&schema), (expected_slots + 7) / 8);
}

#[test]
fn test_used_plus_unused_is_total() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    assert_eq!(page.used_slot_count() + page.empty_slot_count(), page.num_slots());

    for i in 0..10 {
        page.insert_tuple(int_tuple(i, i)).unwrap();
        assert_eq!(page.used_slot_count(), (i + 1) as usize);
        assert_eq!(page.used_slot_count() + page.empty_slot_count(), page.num_slots());
    }
}

#[test]
fn test_insert_then_serialize_round_trips() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    page.insert_tuple(int_tuple(1, 2)).unwrap();
    assert_eq!(page.used_slot_count(), 1);

    let data = page.serialize();
    assert_eq!(data.len(), page_size());

    let reread = HeapPage::new(page.id(), &data, Arc::clone(&schema)).unwrap();
    assert_eq!(reread.used_slot_count(), 1);
    assert_eq!(reread.iter().next().unwrap(), &int_tuple(1, 2));
    assert_eq!(reread.serialize(), data);
}

#[test]
fn test_serialize_of_deserialized_image_is_identity() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);
    for i in 0..37 {
        page.insert_tuple(int_tuple(i, -i)).unwrap();
    }
    let image = page.serialize();

    let round_tripped = HeapPage::new(page.id(), &image, Arc::clone(&schema))
        .unwrap()
        .serialize();
    assert_eq!(round_tripped, image);

    // The all-free page is also a valid image.
    let empty = HeapPage::empty_page_data();
    let round_tripped = HeapPage::new(HeapPageId::new(1, 0), &empty, schema)
        .unwrap()
        .serialize();
    assert_eq!(round_tripped, empty);
}

#[test]
fn test_header_bit_order_is_lsb_first() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    // Slot 0 maps to bit 0 of header byte 0.
    page.insert_tuple(int_tuple(0, 0)).unwrap();
    assert_eq!(page.serialize()[0], 0b0000_0001);

    page.insert_tuple(int_tuple(1, 1)).unwrap();
    assert_eq!(page.serialize()[0], 0b0000_0011);

    // Slot 8 lands in byte 1.
    for i in 2..9 {
        page.insert_tuple(int_tuple(i, i)).unwrap();
    }
    assert_eq!(page.serialize()[0], 0xff);
    assert_eq!(page.serialize()[1], 0b0000_0001);
}

#[test]
fn test_insert_assigns_record_id() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    let rid = page.insert_tuple(int_tuple(5, 6)).unwrap();
    assert_eq!(rid.page_id(), page.id());
    assert_eq!(rid.slot(), 0);

    let stored = page.iter().next().unwrap();
    assert_eq!(stored.record_id(), Some(&rid));
}

#[test]
fn test_insert_into_full_page() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    for i in 0..page.num_slots() {
        page.insert_tuple(int_tuple(i as i32, 0)).unwrap();
    }
    assert_eq!(page.empty_slot_count(), 0);
    assert_eq!(page.insert_tuple(int_tuple(-1, -1)), Err(Error::PageFull));
}

#[test]
fn test_insert_rejects_wrong_schema() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    let narrow = Tuple::new(vec![Field::Integer(1)]);
    assert!(matches!(
        page.insert_tuple(narrow),
        Err(Error::SchemaMismatch(_))
    ));

    let text = Tuple::new(vec![Field::Integer(1), Field::text("x")]);
    assert!(matches!(
        page.insert_tuple(text),
        Err(Error::SchemaMismatch(_))
    ));
}

#[test]
fn test_delete_restores_header() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);
    let initial_image = page.serialize();

    let tuple = int_tuple(1, 2);
    page.insert_tuple(tuple.clone()).unwrap();
    page.delete_tuple(&tuple).unwrap();

    assert_eq!(page.used_slot_count(), 0);
    assert_eq!(page.serialize(), initial_image);
}

#[test]
fn test_delete_matches_by_value_lowest_slot_first() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    // Two residents with identical values; the lower slot must go first.
    page.insert_tuple(int_tuple(9, 9)).unwrap();
    page.insert_tuple(int_tuple(9, 9)).unwrap();

    let rid = page.delete_tuple(&int_tuple(9, 9)).unwrap();
    assert_eq!(rid.slot(), 0);
    assert!(!page.is_slot_used(0));
    assert!(page.is_slot_used(1));

    let rid = page.delete_tuple(&int_tuple(9, 9)).unwrap();
    assert_eq!(rid.slot(), 1);

    assert!(matches!(
        page.delete_tuple(&int_tuple(9, 9)),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_iterator_skips_free_slots_in_order() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    for i in 0..5 {
        page.insert_tuple(int_tuple(i, i)).unwrap();
    }
    page.delete_tuple(&int_tuple(1, 1)).unwrap();
    page.delete_tuple(&int_tuple(3, 3)).unwrap();

    let remaining: Vec<i32> = page
        .iter()
        .map(|t| match t.field(0).unwrap() {
            Field::Integer(i) => *i,
            _ => panic!("expected int"),
        })
        .collect();
    assert_eq!(remaining, vec![0, 2, 4]);
}

#[test]
fn test_before_image() {
    let schema = two_int_schema();
    let mut page = empty_page(&schema);

    // Construction snapshots the image the page was built from.
    page.insert_tuple(int_tuple(1, 1)).unwrap();
    let before = page.before_image().unwrap();
    assert_eq!(before.used_slot_count(), 0);

    // After an explicit snapshot the modified state becomes the baseline.
    page.set_before_image();
    page.insert_tuple(int_tuple(2, 2)).unwrap();
    let before = page.before_image().unwrap();
    assert_eq!(before.used_slot_count(), 1);
    assert_eq!(before.iter().next().unwrap(), &int_tuple(1, 1));
}

#[test]
fn test_dirty_flag_carries_the_transaction() {
    use crate::transaction::TransactionId;

    let schema = two_int_schema();
    let mut page = empty_page(&schema);
    assert_eq!(page.dirtied_by(), None);

    let tid = TransactionId::new();
    page.mark_dirty(true, tid);
    assert_eq!(page.dirtied_by(), Some(tid));

    page.mark_dirty(false, tid);
    assert_eq!(page.dirtied_by(), None);
}

#[test]
fn test_text_page_round_trip() {
    let schema = Arc::new(Schema::from(vec![DataType::Int, DataType::Text]));
    let mut page = HeapPage::empty(HeapPageId::new(2, 0), Arc::clone(&schema)).unwrap();

    page.insert_tuple(Tuple::new(vec![Field::Integer(1), Field::text("alpha")]))
        .unwrap();
    page.insert_tuple(Tuple::new(vec![Field::Integer(2), Field::text("")]))
        .unwrap();

    let image = page.serialize();
    let reread = HeapPage::new(page.id(), &image, schema).unwrap();
    assert_eq!(reread.serialize(), image);

    let tuples: Vec<&Tuple> = reread.iter().collect();
    assert_eq!(tuples[0].field(1).unwrap(), &Field::text("alpha"));
    assert_eq!(tuples[1].field(1).unwrap(), &Field::text(""));
}
