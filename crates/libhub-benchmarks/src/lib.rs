//! libhub benchmarking suite
//!
//! Benchmarks for version parsing, specification matching, batch import
//! and the hub's lookup and dependency operations.

pub mod common;

pub use common::*;
