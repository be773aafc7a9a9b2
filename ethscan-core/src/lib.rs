//! ethscan core library
//!
//! This crate provides the error handling and the shared frame record used
//! by every other ethscan crate.

pub mod error;
pub mod frame;

// Re-export commonly used types
pub use error::{Error, Result};
pub use frame::Frame;
