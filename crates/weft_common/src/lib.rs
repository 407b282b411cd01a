//! Shared foundational types for the weft hardware-graph generator.
//!
//! This crate provides the error taxonomy used across all generation
//! stages and the string-keyed metadata maps carried by types and graphs.

#![warn(missing_docs)]

pub mod error;
pub mod meta;

pub use error::{Error, Result};
pub use meta::{meta_to_string, Meta};
