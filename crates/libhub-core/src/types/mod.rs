//! Core data types for libhub.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Exact semantic versions
//! - Version specifications (constraints over versions)
//! - Libraries and the lookup seam used to walk their dependencies

pub mod library;
pub mod spec;
pub mod version;

// Re-export all public types
pub use library::{Library, LibraryId, LibrarySource};
pub use spec::VersionSpec;
pub use version::{Modifier, Version};
