//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing and list formatting
//! - [`tree`] - Indented rendering of resolved option trees
//!
//! # Design
//!
//! All terminal output from commands goes through this module so that
//! `--quiet` and `--debug` behave the same everywhere.

pub mod output;
pub mod tree;
