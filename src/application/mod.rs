//! Application layer orchestrating the gateway protocol.
//!
//! `outbound` prepares signed payment requests, `inbound` validates posted
//! results, `interpreter` applies them to payment records and `gateway`
//! wires these steps to the host ports for the two HTTP endpoints.

pub mod availability;
pub mod gateway;
pub mod inbound;
pub mod interpreter;
pub mod outbound;
