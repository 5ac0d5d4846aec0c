//! Domain models for contact requests

mod config;
mod contact;
mod filter;
mod path;
mod update;

pub use config::{PoolConfig, ServerConfig, DEFAULT_PORT};
pub use contact::{is_object_id, ContactRequest, Document};
pub use filter::Filter;
pub use update::{Update, UpdateRequest};
