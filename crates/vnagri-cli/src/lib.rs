//! Command-line front end for the market-price analysis crates.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
