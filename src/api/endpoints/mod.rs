//! API endpoint handlers.

pub mod complaints;
pub mod health;
