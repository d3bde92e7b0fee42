//! Test support code and fixtures
//!
//! This module provides an in-process engine double and JavaScript bundles
//! used across the test suites.

#![allow(dead_code)]


pub use fake_engine::*;
pub use fixtures::*;
