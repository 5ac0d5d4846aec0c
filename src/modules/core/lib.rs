//! Core domain logic for contactd
//!
//! This crate contains the contact request record, the filter and update
//! documents the routes accept, server configuration, and the error type
//! shared by every other crate.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{ContactError, Result};
