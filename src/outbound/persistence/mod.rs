//! Persistence adapters for the repository ports.
//!
//! [`MongoStore`] backs deployments with a MongoDB document database;
//! [`MemoryStore`] backs tests and databaseless runs with the same
//! semantics over in-process maps.

mod documents;
mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
