//! Shared utilities: errors, settings, output capture and result
//! normalization.

pub mod config;
pub mod errors;
pub mod normalize;
pub mod output;
