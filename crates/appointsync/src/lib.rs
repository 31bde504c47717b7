//! appointsync service.
//!
//! Imperative shell around `appointsync_core`: storage backends, the scheduling
//! client, the request pipeline and handlers, and the two runtime surfaces (the
//! Lambda entry point and a local HTTP server).

pub mod config;
pub mod handlers;
pub mod lambda;
pub mod observe;
pub mod pipeline;
pub mod profiles;
pub mod response;
pub mod routes;
pub mod scheduling;
pub mod server;
pub mod state;
pub mod storage;
