//! # Formats Module
//!
//! Byte formats for values persisted through a [`KvBackend`](crate::KvBackend).
//!
//! This module only handles format conversion (pure transformations).
//! Backends treat values as opaque bytes.

mod value;

pub use value::*;
