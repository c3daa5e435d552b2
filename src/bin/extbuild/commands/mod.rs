//! Command implementations

pub mod build_ext;
pub mod completions;
