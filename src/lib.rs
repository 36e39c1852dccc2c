//! Pose Feedback Service Library

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod overlay;
pub mod service;
pub mod utils;

pub use config::Config;
