//! biosynth-web: HTTP and WebSocket front end for the synthesis service.
//!   - Synthesis requests and result retrieval (`/api/v1`)
//!   - Service status
//!   - Live per-stage progress over WebSocket

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;
