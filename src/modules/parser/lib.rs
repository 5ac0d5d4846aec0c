//! Configuration and request body parsing for contactd
//!
//! This crate loads the server configuration from the environment (with
//! optional `.env` file support) and decodes URL-encoded form bodies using
//! the extended bracket syntax (`contact[name]=Alice`).

pub mod env;
pub mod form;

pub use env::EnvLoader;
pub use form::decode_form;
