//! core
//!
//! Core domain types and operations for Linkage.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ModelicaPath, OptionKind, ConfigId, etc.
//! - [`catalog`] - Immutable option/template catalog and its JSON schema
//! - [`modifiers`] - Modifier sets and the final-wins cascade
//! - [`resolve`] - Expansion of catalog roots into resolved trees
//! - [`selection`] - User configurations and their persisted form
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here touches the filesystem, network, or terminal

pub mod catalog;
pub mod modifiers;
pub mod resolve;
pub mod selection;
pub mod types;
