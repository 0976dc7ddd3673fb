//! # tierline
//!
//! The Tierline application: CLI, HTTP API and configuration over
//! `tierline-core`. Exposed as a library so integration tests can build
//! the router directly.

pub mod api;
pub mod cli;
pub mod config;
