//! Common utilities and data structures

pub mod rational;

pub use rational::Rational;
