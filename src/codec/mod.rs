//! Codec implementations

pub mod pv4;

pub use pv4::Pv4Decoder;
