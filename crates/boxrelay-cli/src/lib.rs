//! # boxrelay gateway
//!
//! HTTP front end that relays uploaded files into Dropbox.
//!
//! This crate provides:
//! - **Upload**: `POST /upload` streams a multipart `file` field through an upload session
//! - **Links**: `POST /link` turns a committed object into a verified temporary link
//! - **Health**: `GET /health` for load balancers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ multipart/form-data
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  boxrelay gateway                   │
//! ├─────────────────────────────────────────────────────┤
//! │  Request Id │ Logging │ Multipart Extraction        │
//! ├─────────────────────────────────────────────────────┤
//! │                  boxrelay-client                    │
//! │       (upload sessions, temporary links)            │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ HTTPS
//! ┌─────────────────────────▼───────────────────────────┐
//! │                    Dropbox API                      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
