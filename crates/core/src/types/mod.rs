//! Core types for Cafe & Wifi.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod location;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use location::{Location, LocationFilter, SeatRange, UnknownChoice};
pub use price::{CoffeePrice, PriceError};
