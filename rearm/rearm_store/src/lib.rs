//! # rearm store
//!
//! Key-value persistence backends implementing
//! [`rearm_core::traits::KeyValueStore`].
//!
//! - [`MemoryStore`]: process-local map, for tests and embedding
//! - [`FileStore`]: a single JSON document replaced atomically on every write

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use rearm_core::traits::KeyValueStore;
