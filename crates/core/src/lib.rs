//! Cafe & Wifi Core - Shared domain types.
//!
//! This crate provides the value types used across all Cafe & Wifi components:
//! - `directory` - The café directory web application
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Parsing and range checks live here so that forms,
//! repositories and the CLI all agree on what a valid value is.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, locations, seat ranges and coffee prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
