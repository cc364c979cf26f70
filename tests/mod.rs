//! Test suite for task-social
//!
//! This module organizes all tests

pub mod common;
#[cfg(feature = "ssr")]
pub mod e2e;
pub mod property;
