//! Persistence gateway: the key-addressed store the engine reads and writes
//! through.
//!
//! The gateway offers plain `get`/`list`/`save` per entity with no
//! transactions. Consistency across records is the services' job; the only
//! guard the store itself provides is the optimistic version check on orders
//! and bank accounts.

pub mod error;
pub mod gateway;
pub mod memory;

pub use error::StoreError;
pub use gateway::Gateway;
pub use memory::MemoryStore;
