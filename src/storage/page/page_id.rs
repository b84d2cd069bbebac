use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one heap page: the owning table and the 0-based page number
/// within that table's file. Value semantics make it a stable map key for
/// the buffer pool and the lock manager.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeapPageId {
    table_id: u32,
    page_no: usize,
}

impl HeapPageId {
    pub fn new(table_id: u32, page_no: usize) -> HeapPageId {
        HeapPageId { table_id, page_no }
    }

    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    pub fn page_no(&self) -> usize {
        self.page_no
    }
}

impl fmt::Display for HeapPageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id, self.page_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_equality_and_hashing() {
        let a = HeapPageId::new(1, 2);
        let b = HeapPageId::new(1, 2);
        let c = HeapPageId::new(1, 3);
        let d = HeapPageId::new(2, 2);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        let mut map = HashMap::new();
        map.insert(a, "page");
        assert_eq!(map.get(&b), Some(&"page"));
        assert_eq!(map.get(&c), None);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(HeapPageId::new(7, 3).to_string(), "7:3");
    }
}
