//! Shared utilities for the Tsunagi relay packages.

pub mod logger;
pub mod time;
