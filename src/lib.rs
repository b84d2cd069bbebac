#![crate_type = "lib"]
#![crate_name = "heapdb"]

pub mod common;
pub mod config;
pub mod database;
pub mod execution;
pub mod storage;
pub mod transaction;
pub mod types;

pub use database::Database;
