//! Client for the forwarding gateway.

pub mod client;

pub use client::{derive_key, ErrorBody, ForwardCall, ForwardReply, GatewayClient, Pong};
