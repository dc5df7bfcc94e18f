//! Outbound DNS transport (spec §4.1): UDP-first with TCP-on-truncation
//! fallback, used by the querier to probe authoritative nameservers.

pub mod client;

pub use client::{query, Protocol, TransportError};
