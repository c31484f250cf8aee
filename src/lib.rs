#![doc = include_str!("../README.md")]

pub mod auth;
pub mod check;
pub mod cli;
pub mod error;
pub mod graph;
pub mod probe;

pub use error::ProbeError;
