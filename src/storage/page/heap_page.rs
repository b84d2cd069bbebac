use crate::common::constants::PAGE_SIZE_MISMATCH_MSG;
use crate::common::{Error, Result};
use crate::config::config::page_size;
use crate::storage::page::{HeapPageId, RecordId};
use crate::storage::tuple::Tuple;
use crate::transaction::TransactionId;
use crate::types::Schema;
use std::sync::{Arc, RwLock};

/// Shared, lock-guarded view of a cached page.
pub type PageHandle = Arc<RwLock<HeapPage>>;

/// In-memory image of one disk page.
///
/// The on-disk layout is a header bitmap of `ceil(num_slots / 8)` bytes
/// (bit `i % 8` of byte `i / 8` marks slot `i` used), followed by
/// `num_slots` fixed-width tuple slots, followed by zero padding up to the
/// page size. Unused slots are zero-filled on disk, which is what makes
/// `serialize(deserialize(b)) == b` hold for every valid image `b`.
#[derive(Clone, Debug)]
pub struct HeapPage {
    pid: HeapPageId,
    schema: Arc<Schema>,
    header: Vec<u8>,
    tuples: Vec<Option<Tuple>>,
    num_slots: usize,
    before_image: Vec<u8>,
    dirtied_by: Option<TransactionId>,
}

impl HeapPage {
    /// Number of tuple slots a page holds under the given schema: each slot
    /// costs its tuple width plus one header bit.
    pub fn slots_per_page(schema: &Schema) -> usize {
        (page_size() * 8) / (schema.size() * 8 + 1)
    }

    /// Header bitmap size in bytes.
    pub fn header_size(schema: &Schema) -> usize {
        (Self::slots_per_page(schema) + 7) / 8
    }

    /// An all-zero page image: no slot used, nothing stored.
    pub fn empty_page_data() -> Vec<u8> {
        vec![0; page_size()]
    }

    /// Materializes a page from its disk image. The freshly built page's
    /// before-image is the image it was built from.
    pub fn new(pid: HeapPageId, data: &[u8], schema: Arc<Schema>) -> Result<HeapPage> {
        if data.len() != page_size() {
            return crate::errinput!("{PAGE_SIZE_MISMATCH_MSG}: got {} bytes", data.len());
        }

        let num_slots = Self::slots_per_page(&schema);
        let header_size = Self::header_size(&schema);
        let header = data[..header_size].to_vec();
        let tuple_size = schema.size();

        let mut tuples = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            if !bitmap_get(&header, slot) {
                tuples.push(None);
                continue;
            }
            let start = header_size + slot * tuple_size;
            let mut tuple = Tuple::deserialize(&data[start..start + tuple_size], &schema)?;
            tuple.set_record_id(Some(RecordId::new(pid, slot)));
            tuples.push(Some(tuple));
        }

        Ok(HeapPage {
            pid,
            schema,
            header,
            tuples,
            num_slots,
            before_image: data.to_vec(),
            dirtied_by: None,
        })
    }

    /// A page with every slot free.
    pub fn empty(pid: HeapPageId, schema: Arc<Schema>) -> Result<HeapPage> {
        Self::new(pid, &Self::empty_page_data(), schema)
    }

    pub fn id(&self) -> HeapPageId {
        self.pid
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        bitmap_get(&self.header, slot)
    }

    /// Flips a header bit. Touches no other page state.
    pub fn set_slot_used(&mut self, slot: usize, used: bool) {
        bitmap_set(&mut self.header, slot, used);
    }

    pub fn used_slot_count(&self) -> usize {
        (0..self.num_slots).filter(|&i| self.is_slot_used(i)).count()
    }

    pub fn empty_slot_count(&self) -> usize {
        self.num_slots - self.used_slot_count()
    }

    /// Stores the tuple in the lowest free slot and stamps its record id.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> Result<RecordId> {
        if !tuple.matches_schema(&self.schema) {
            return Result::from(Error::SchemaMismatch(format!(
                "tuple {tuple} does not fit page schema {}",
                self.schema
            )));
        }
        let slot = (0..self.num_slots)
            .find(|&i| !self.is_slot_used(i))
            .ok_or(Error::PageFull)?;

        let rid = RecordId::new(self.pid, slot);
        tuple.set_record_id(Some(rid));
        self.tuples[slot] = Some(tuple);
        self.set_slot_used(slot, true);
        Ok(rid)
    }

    /// Removes the lowest-slot tuple whose field values equal the given
    /// tuple's, clearing the slot. `NotFound` when no resident tuple matches.
    pub fn delete_tuple(&mut self, tuple: &Tuple) -> Result<RecordId> {
        let slot = (0..self.num_slots)
            .find(|&i| self.is_slot_used(i) && self.tuples[i].as_ref() == Some(tuple))
            .ok_or_else(|| Error::NotFound(format!("tuple {tuple} is not on page {}", self.pid)))?;

        let rid = RecordId::new(self.pid, slot);
        self.tuples[slot] = None;
        self.set_slot_used(slot, false);
        Ok(rid)
    }

    /// Used-slot tuples in slot order.
    pub fn iter(&self) -> HeapPageIterator<'_> {
        HeapPageIterator {
            page: self,
            slot: 0,
        }
    }

    /// Reassembles the disk image: header, slots (zeros for free slots),
    /// zero padding.
    pub fn serialize(&self) -> Vec<u8> {
        let tuple_size = self.schema.size();
        let mut data = self.header.clone();
        for slot in 0..self.num_slots {
            match &self.tuples[slot] {
                Some(tuple) if self.is_slot_used(slot) => {
                    for field in tuple.fields() {
                        data.extend_from_slice(&field.serialize());
                    }
                }
                _ => data.extend_from_slice(&vec![0; tuple_size]),
            }
        }
        data.resize(page_size(), 0);
        data
    }

    /// Snapshots the current contents as the page's before-image.
    pub fn set_before_image(&mut self) {
        self.before_image = self.serialize();
    }

    /// The raw before-image bytes, as handed to the log.
    pub fn before_image_data(&self) -> &[u8] {
        &self.before_image
    }

    /// Reconstructs a page from the stored before-image snapshot.
    pub fn before_image(&self) -> Result<HeapPage> {
        HeapPage::new(self.pid, &self.before_image, Arc::clone(&self.schema))
    }

    pub fn mark_dirty(&mut self, dirty: bool, tid: TransactionId) {
        self.dirtied_by = if dirty { Some(tid) } else { None };
    }

    /// The transaction that last dirtied this page, if it is dirty.
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirtied_by
    }
}

/// Lazy walk over the used slots of a page.
pub struct HeapPageIterator<'a> {
    page: &'a HeapPage,
    slot: usize,
}

impl<'a> Iterator for HeapPageIterator<'a> {
    type Item = &'a Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < self.page.num_slots {
            let slot = self.slot;
            self.slot += 1;
            if self.page.is_slot_used(slot) {
                return self.page.tuples[slot].as_ref();
            }
        }
        None
    }
}

fn bitmap_get(header: &[u8], slot: usize) -> bool {
    header[slot / 8] & (1 << (slot % 8)) != 0
}

fn bitmap_set(header: &mut [u8], slot: usize, value: bool) {
    let mask = 1 << (slot % 8);
    if value {
        header[slot / 8] |= mask;
    } else {
        header[slot / 8] &= !mask;
    }
}
