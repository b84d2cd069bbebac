// HeapPage
pub const PAGE_SIZE_MISMATCH_MSG: &str = "page image length differs from the configured page size";

// HeapFile
pub const SHORT_READ_MSG: &str = "short read while fetching a page";

// Catalog
pub const NO_TABLE_FOR_ID_MSG: &str = "no table registered under the given id";
pub const NO_TABLE_FOR_NAME_MSG: &str = "no table registered under the given name";

// Operators
pub const OPERATOR_NOT_OPEN_MSG: &str = "operator must be opened before iteration";
pub const NO_MORE_TUPLES_MSG: &str = "iterator has no more tuples";
