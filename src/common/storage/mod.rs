pub mod file;
pub mod memory;

pub use file::FileBlobStorage;
pub use memory::MemoryBlobStorage;
