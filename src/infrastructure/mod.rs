//! Adapters implementing the host ports.

pub mod in_memory;
