//! Common utilities module
//!
//! This module contains the error type shared by the decoder and the CIH parser.

pub mod error;

pub use error::{MrawError, Result};
