//! Supporting services.

pub mod email;
