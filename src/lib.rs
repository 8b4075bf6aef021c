// todostore - local to-do list with a pluggable persistence collaborator

pub mod config;
pub mod error;
pub mod filter;
pub mod persist;
pub mod render;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::TaskError;
pub use filter::{Stats, TaskFilter};
pub use persist::{FilePersistence, MemoryPersistence, Persistence, SqlitePersistence};
pub use store::TaskStore;
pub use task::{Task, now_ms};
