//! Shared utility functions

pub mod image;
pub mod math;
