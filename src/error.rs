// Re-export from core module so callers can write `rankstats::error::Result`
pub use crate::core::error::{Error, Result};
