//! Scenario tests
//!
//! Drive the dispatcher, extension table and help command end to end against
//! the recording transport from [`crate::testing`].

mod extension_test;
mod help_test;
