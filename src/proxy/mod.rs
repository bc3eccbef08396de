//! Upstream passthrough used by the demo handler.

pub mod upstream;

pub use upstream::Passthrough;
