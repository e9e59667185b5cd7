//! HTTP API for the complaint-operations service.
//!
//! Routes are nested under `/api/`. Middleware stack (outermost first):
//! CORS → request id → audit log → handler.
//!
//! The pipeline and the review callback use blocking HTTP clients, so
//! handlers that reach them run on the blocking pool.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::ApiContext;
