//! Key-value persistence adapters behind the domain's store port.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
