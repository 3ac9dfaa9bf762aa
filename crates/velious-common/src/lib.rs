//! Common utilities for Velious.
//!
//! This crate provides the foundational pieces shared by the archive readers:
//!
//! - [`ByteReader`] - Bounds-checked, little-endian reading from byte slices
//! - [`Error`] - Short-read errors carrying the offset where they happened

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::ByteReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
