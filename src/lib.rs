//! Tool Directory - password-gated directory of external tool links
//!
//! This crate implements the data-synchronization layer behind the directory:
//! a session manager that gates the user and admin views, and a tool store that
//! mediates every create/update/delete against a remote persistence endpoint.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
