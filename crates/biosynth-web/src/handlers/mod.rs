//! HTTP handlers for all web routes.

pub mod status;
pub mod synthesis;
