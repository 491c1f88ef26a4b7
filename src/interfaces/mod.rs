//! Inbound adapters: HTTP endpoints and CSV parameter files.

pub mod csv;
pub mod http;
