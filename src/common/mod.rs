//! Common utilities shared across agentqa

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, ParseError, Result};
