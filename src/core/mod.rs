// Core error types shared by every statistics module
pub mod error;

pub use error::{Error, Result};
