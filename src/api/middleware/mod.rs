//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Request id: reuse a valid `X-Request-ID` or mint one
//! 2. Audit logger: one line per request

pub mod audit;
pub mod request_id;
