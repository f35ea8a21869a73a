//! Recapito kernel library.
//!
//! Exposes the server internals for integration testing. The entry point for
//! running the service is the `recapito` binary.

pub mod config;
pub mod contact;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod theme;
pub mod token;
pub mod transient;
