//! OntoView Core — error type and configuration shared by the store and server.

pub mod config;
pub mod error;

pub use config::{SampleDefaults, ServerConfig};
pub use error::{Error, Result};
