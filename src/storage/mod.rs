// Storage module - PERSISTENCE
// Handles persistent key-value storage of the development chain using sled

mod store;

pub use store::{ChainStore, StorageStats, StoreError};
