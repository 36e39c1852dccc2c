//! Service layer module

pub mod frame_service;
pub mod types;

pub use frame_service::FrameService;
pub use types::*;
