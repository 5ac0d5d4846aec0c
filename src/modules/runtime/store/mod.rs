//! Storage backends for contact requests
//!
//! `MongoStore` is the production backend; `MemoryStore` backs tests and
//! local runs with `DB_URL=memory://`.

mod handle;
mod memory;
mod mongo;
mod traits;

pub use handle::{open_store, StoreHandle};
pub use memory::MemoryStore;
pub use mongo::{MongoStore, COLLECTION, DEFAULT_DATABASE};
pub use traits::ContactStore;
