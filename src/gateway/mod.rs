//! Reading-service side of the assistant gateway

pub mod client;

pub use client::{GatewayClient, GatewayError};
