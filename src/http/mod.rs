//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware.rs (request ID span, metrics)
//!     → handlers.rs (decode, call orchestrator, map outcome to status)
//!     → Send to client
//! ```
//!
//! # Status mapping
//! - success → 200 / 201
//! - degraded → 503 with the degraded body (`[]`, `-1`, or a message)
//! - unknown quiz → 404, invalid input → 400, store failure → 500

pub mod handlers;
pub mod middleware;
pub mod server;

pub use middleware::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
