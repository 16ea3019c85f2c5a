//! export
//!
//! Pure producers of external formats. Nothing here writes files; callers
//! decide where the output goes.
//!
//! # Modules
//!
//! - [`csv`] - Option catalog as CSV for human review
//! - [`sequence`] - Flattened selections for sequence-document generation
//! - [`document`] - Configuration plus resolved tree for model generation

pub mod csv;
pub mod document;
pub mod sequence;
