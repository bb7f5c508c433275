//! Web API module for hoard.
//!
//! This module provides the REST API: uploads, the file list, API keys,
//! login sessions and the expiry sweep endpoint.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
pub use state::AppState;
