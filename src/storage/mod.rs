pub mod buffer;
pub mod catalog;
pub mod disk;
pub mod log;
pub mod page;
pub mod tuple;

pub use buffer::{BufferPool, LockManager};
pub use catalog::Catalog;
pub use disk::{HeapFile, HeapFileIterator};
pub use log::LogManager;
pub use page::{HeapPage, HeapPageId, PageHandle, RecordId};
pub use tuple::Tuple;
