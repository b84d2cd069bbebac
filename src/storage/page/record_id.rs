use crate::storage::page::HeapPageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The on-disk address of a tuple: a page and a slot index within it.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    page_id: HeapPageId,
    slot: usize,
}

impl RecordId {
    pub fn new(page_id: HeapPageId, slot: usize) -> RecordId {
        RecordId { page_id, slot }
    }

    pub fn page_id(&self) -> HeapPageId {
        self.page_id
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.page_id, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> RecordId {
        RecordId::new(HeapPageId::new(1, 1), 1)
    }

    #[test]
    fn test_accessors() {
        let rid = setup();
        assert_eq!(rid.page_id(), HeapPageId::new(1, 1));
        assert_eq!(rid.slot(), 1);
    }

    #[test]
    fn test_equals() {
        let rid1 = setup();
        let rid1_copy = setup();
        let rid2 = RecordId::new(HeapPageId::new(1, 1), 2);
        let rid3 = RecordId::new(HeapPageId::new(2, 1), 1);

        assert_eq!(rid1, rid1_copy);
        assert_ne!(rid1, rid2);
        assert_ne!(rid1, rid3);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(setup().to_string(), "1:1[1]");
    }
}
