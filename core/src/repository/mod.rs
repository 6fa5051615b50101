pub mod file;
pub mod gateway;
pub mod keys;
pub mod memory;
pub mod traits;

// Re-export
pub use file::FileKeyValueStore;
pub use gateway::PersistenceGateway;
pub use keys::StorageKey;
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
