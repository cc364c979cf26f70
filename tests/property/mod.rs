//! Property-based tests

mod interval_proptest;
#[cfg(feature = "ssr")]
mod registry_proptest;
