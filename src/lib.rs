pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod probe;
pub mod progress;
pub mod stats;
pub mod tiles;
