//! Linkage - catalog-driven configurator core for engineered building systems
//!
//! A fixed catalog of templates (system archetypes) and options (selectable
//! sub-components, parameters, and nested choices) describes every legal
//! configuration of a physical system. Linkage loads that catalog, resolves
//! option graphs into visibility- and value-resolved trees, records user
//! selections against them, and exports the results for downstream tools.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types, catalog, modifier cascade, resolver, selections
//! - [`export`] - CSV, sequence data, and model-generation documents
//! - [`config`] - Tool configuration files and precedence
//! - [`cli`] - Command-line interface layer (parses args, reads files)
//! - [`ui`] - User-facing output formatting
//!
//! # Correctness Invariants
//!
//! Linkage maintains the following invariants:
//!
//! 1. The catalog is immutable after load; a malformed document never
//!    yields a partial catalog
//! 2. Resolution always terminates; cycles are cut, never followed
//! 3. A final modifier is never overridden further down the tree
//! 4. A rejected selection leaves the configuration unchanged

pub mod cli;
pub mod config;
pub mod core;
pub mod export;
pub mod ui;
