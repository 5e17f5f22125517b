//! # libhub-core
//!
//! Core types shared across all libhub crates.
//!
//! This crate provides:
//! - Version and VersionSpec types with their parsing rules
//! - Library, the registered unit that carries dependency edges
//! - Error enums for every layer below the registry
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, VersionSpec, Library, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{LibraryError, LibraryResult, SpecError, VersionError};
pub use types::{Library, LibraryId, LibrarySource, Modifier, Version, VersionSpec};
