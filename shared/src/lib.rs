pub mod config;
pub mod models;
pub mod storage;
pub mod telemetry;

pub use config::{ApiConfig, ClientConfig, ConfigError, SearchConfig, StoreBackend, StoreConfig};
pub use models::*;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StoreFactory};
