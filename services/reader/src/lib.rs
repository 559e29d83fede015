//! services/reader/src/lib.rs

pub mod adapters;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod reader;
pub mod session;
pub mod sync;

#[cfg(test)]
mod test_support;
