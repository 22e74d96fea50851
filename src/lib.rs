// src/lib.rs

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod jobs;
pub mod locate;
pub mod output;
pub mod table;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use fetch::{PageSource, ResponseCache, Session};
pub use jobs::Job;
pub use output::OutputMode;
pub use table::Table;
