//! A pure Rust implementation of the MySQL X Protocol, suitable for writing
//! clients and servers that speak it directly against a socket.
//!
//! The engine is transport-agnostic and runs its own cooperative state
//! machine rather than driving an async runtime: see [`protocol::ProtocolEngine`]
//! for the staged send/receive model.

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

pub mod config;
pub mod protocol;

pub use config::EngineConfig;
pub use protocol::{ControlFlow, Direction, Message, Processor, ProtocolEngine, ProtocolError};
