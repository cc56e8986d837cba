//! Types library for the live sporting-event state service
//!
//! Core type definitions shared by the feed synchronizer and the HTTP
//! gateway. Everything here is plain data: no I/O, no async.
//!
//! # Modules
//! - `ids`: Event identifiers
//! - `event`: Event, competitors and per-period scores
//! - `mapping`: Identifier → display name lookup table
//! - `errors`: Decode error taxonomy

// Public modules
pub mod ids;
pub mod event;
pub mod mapping;
pub mod errors;
