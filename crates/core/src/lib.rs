//! Functional core for appointsync.
//!
//! Pure data types and functions shared by the service: the schemaless item model,
//! the storage contract implemented by each backend, expression rendering, request
//! schemas and the response envelope. Nothing in this crate performs I/O.

pub mod appointments;
pub mod item;
pub mod response;
pub mod schema;
pub mod storage;
