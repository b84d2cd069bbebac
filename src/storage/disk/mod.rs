mod heap_file;

#[cfg(test)]
mod tests;

pub use heap_file::{HeapFile, HeapFileIterator};
