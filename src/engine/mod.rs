pub mod memstore;
pub mod operations;
pub mod persistence;

pub use memstore::MemRepository;
pub use persistence::JsonFileRepository;
