pub mod config;
pub mod error;
pub mod stream;
pub mod kernels;
pub mod trace;
pub mod validation;

pub use error::{HarnessError, Result};
