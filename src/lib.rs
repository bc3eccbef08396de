//! httpwire - HTTP/1.1 from raw TCP
//!
//! Request parsing, response serialization and a one-request-per-connection
//! server, written directly against byte streams.

pub mod config;
pub mod demo;
pub mod http;
pub mod proxy;
pub mod server;
