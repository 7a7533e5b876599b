//! HTTP API module.
//!
//! The HTTP server and API types of the fuelmap backend.

pub mod server;
pub mod types;

pub use server::{router, start_server};
pub use types::*;
