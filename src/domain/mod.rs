//! Domain layer: gateway message types, the digest codec and the ports to
//! the host system.

pub mod digest;
pub mod parameters;
pub mod payment;
pub mod ports;
pub mod status;
