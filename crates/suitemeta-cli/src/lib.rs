//! suitemeta library - command handlers behind the `suitemeta` binary
//!
//! Exposed as a library so the handlers can be exercised by tests.

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
