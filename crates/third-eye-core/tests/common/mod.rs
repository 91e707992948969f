//! Shared test utilities for dispatcher integration tests

pub mod fixtures;
