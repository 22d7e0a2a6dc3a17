//! Test Helper Utilities
//!
//! Shared fixtures for lydia-curator integration tests

#![allow(dead_code)]

pub mod fake_probe;
pub mod library;

pub use fake_probe::FakeProbe;
pub use library::{answer, TestLibrary};
#[cfg(unix)]
pub use library::{lock_read_only, lock_unreadable, unlock};
